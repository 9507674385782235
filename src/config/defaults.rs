//! Built-in lane defaults (base layer)
//!
//! Hardcoded defaults for all configuration values. The caller's fragment
//! is merged on top of `BuiltinDefaults::to_value()`.

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Entry file for the bundler (default: "./index.js")
    pub main_file: String,

    /// Build output file name (default: "build.js")
    pub dist_file: String,

    /// Build output directory (default: "./dist/")
    pub dist_dir: String,

    /// Source glob for the ES5 transpile task (default: "./src/**/*")
    pub es5_origin: String,

    /// ES5 output directory (default: "./es5/")
    pub es5_dir: String,

    /// Watcher source maps (default: true)
    pub watchify_debug: bool,

    /// Watcher full module paths (default: false)
    pub watchify_full_paths: bool,

    /// Whether the dev server starts with the serve task (default: true)
    pub browser_sync_enabled: bool,

    /// Dev server document root (default: "./")
    pub browser_sync_base_dir: String,

    /// Minify build output (default: false)
    pub uglify: bool,

    /// Prepend polyfill modules to the bundle entry (default: false)
    pub polyfills_enabled: bool,

    /// JSCS lint pass (default: true)
    pub lint_jscs: bool,

    /// ESLint lint pass (default: true)
    pub lint_eslint: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            main_file: "./index.js".to_string(),
            dist_file: "build.js".to_string(),
            dist_dir: "./dist/".to_string(),
            es5_origin: "./src/**/*".to_string(),
            es5_dir: "./es5/".to_string(),
            watchify_debug: true,
            watchify_full_paths: false,
            browser_sync_enabled: true,
            browser_sync_base_dir: "./".to_string(),
            uglify: false,
            polyfills_enabled: false,
            lint_jscs: true,
            lint_eslint: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "mainFile": self.main_file,
            "dist": {
                "file": self.dist_file,
                "dir": self.dist_dir
            },
            "es5": {
                "origin": self.es5_origin,
                "dir": self.es5_dir
            },
            "watchifyOptions": {
                "debug": self.watchify_debug,
                "fullPaths": self.watchify_full_paths
            },
            "browserSyncOptions": {
                "enabled": self.browser_sync_enabled,
                "server": {
                    "baseDir": self.browser_sync_base_dir,
                    "directory": false,
                    "index": "index.html",
                    "routes": {
                        "/src/": "./src/",
                        "/dist/": "./dist/",
                        "/es5/": "./es5/"
                    }
                }
            },
            "babelifyOptions": {
                "presets": ["es2015"]
            },
            "polyfillsEnabled": self.polyfills_enabled,
            "polyfills": [
                "whatwg-fetch/fetch",
                "core-js/fn/symbol",
                "core-js/fn/promise"
            ],
            "uglify": self.uglify,
            "lint": {
                "jscs": self.lint_jscs,
                "eslint": self.lint_eslint,
                "target": ["./src/**/*.js"]
            },
            "esdocOptions": {
                "enabled": true,
                "source": "./src",
                "destination": "./docs",
                "plugins": [
                    {"name": "esdoc-es7-plugin"}
                ]
            },
            "jestOptions": {
                "target": ".",
                "collectCoverage": true,
                "scriptPreprocessor": "node_modules/babel-jest",
                "preprocessorIgnorePatterns": ["/node_modules/", "/dist/", "/es5/"],
                "testFileExtensions": ["es6", "js", "jsx"],
                "moduleFileExtensions": ["js", "json", "jsx", "es6"]
            },
            "tasks": {
                "build": "build",
                "serve": "serve",
                "es5": "es5",
                "clean": "clean",
                "cleanEs5": "cleanEs5",
                "lint": "lint",
                "test": "test",
                "uploadDocs": "uploadDocs",
                "docs": "docs"
            }
        })
    }
}

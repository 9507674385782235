//! End-to-end configuration resolution against real files.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use buildlane::config::{
    ConfigError, ConfigInput, FsPathResolver, OptionsFileReader, PathResolver, ResolvedConfig,
};

/// Reads options files relative to a project directory, the way a host
/// build tool would with the process cwd at the project root.
struct ProjectReader {
    root: PathBuf,
}

impl OptionsFileReader for ProjectReader {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(path))
    }
}

fn project_with(files: &[(&str, &str)]) -> (TempDir, ProjectReader) {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).unwrap();
    }
    let reader = ProjectReader {
        root: dir.path().to_path_buf(),
    };
    (dir, reader)
}

fn resolve(
    fragment: serde_json::Value,
    reader: &ProjectReader,
) -> Result<ResolvedConfig, ConfigError> {
    ResolvedConfig::build(ConfigInput::Fragment(fragment), reader, &FsPathResolver)
}

#[test]
fn esdoc_options_read_from_file() {
    let (_dir, reader) = project_with(&[("validFile.json", r#"{"name":"docs","type":"file"}"#)]);

    let config = resolve(json!({"esdocOptions": "validFile.json"}), &reader).unwrap();

    // The file's keys land in the resolved options...
    assert_eq!(config.get_str("esdocOptions.name"), Some("docs"));
    assert_eq!(config.get_str("esdocOptions.type"), Some("file"));
    // ...merged over the defaults like any other fragment object
    assert_eq!(config.get_bool("esdocOptions.enabled"), Some(true));
    assert_eq!(config.get_str("esdocOptions.source"), Some("./src"));
}

#[test]
fn esdoc_options_missing_file_falls_back_to_default() {
    let (_dir, reader) = project_with(&[]);

    let config = resolve(json!({"esdocOptions": "missingFile"}), &reader).unwrap();

    // The compiled-in default applies untouched
    assert_eq!(config.get_bool("esdocOptions.enabled"), Some(true));
    assert_eq!(config.get_str("esdocOptions.source"), Some("./src"));
}

#[test]
fn esdoc_options_malformed_file_aborts_construction() {
    let (_dir, reader) = project_with(&[("esdoc.json", "{ definitely not json")]);

    let err = resolve(json!({"esdocOptions": "esdoc.json"}), &reader).unwrap_err();

    assert!(matches!(err, ConfigError::MalformedOptions { .. }));
}

#[test]
fn jest_options_from_package_json_keeps_jest_field() {
    let (_dir, reader) = project_with(&[(
        "package.json",
        r#"{"name":"my-app","jest":{"collectCoverageOnlyFrom":{"file.js":true}}}"#,
    )]);

    let config = resolve(json!({"jestOptions": "package.json"}), &reader).unwrap();

    // The allowlist key is rewritten to its absolute path, value preserved
    let expected_key = FsPathResolver.resolve_absolute("file.js");
    let coverage = config.get("jestOptions.collectCoverageOnlyFrom").unwrap();
    assert_eq!(coverage[&expected_key], json!(true));
    assert!(coverage.get("file.js").is_none());
    assert!(PathBuf::from(&expected_key).is_absolute());

    // Other package manifest fields never leak into the options
    assert!(config.get("jestOptions.name").is_none());
}

#[test]
fn jest_options_from_dedicated_file_taken_whole() {
    let (_dir, reader) = project_with(&[(
        "jest.json",
        r#"{"collectCoverage":false,"testFileExtensions":["js"]}"#,
    )]);

    let config = resolve(json!({"jestOptions": "jest.json"}), &reader).unwrap();

    assert_eq!(config.get_bool("jestOptions.collectCoverage"), Some(false));
    // Whole-value replacement of the defaults' array
    assert_eq!(
        config.get("jestOptions.testFileExtensions").unwrap(),
        &json!(["js"])
    );
    // Default keys the file does not mention are preserved by the merge
    assert_eq!(config.get_str("jestOptions.target"), Some("."));
}

#[test]
fn inline_coverage_allowlist_is_absolutized_too() {
    let (_dir, reader) = project_with(&[]);

    let fragment = json!({
        "jestOptions": {"collectCoverageOnlyFrom": {"src/a.js": true}}
    });
    let config = resolve(fragment, &reader).unwrap();

    let expected_key = FsPathResolver.resolve_absolute("src/a.js");
    assert_eq!(
        config.get("jestOptions.collectCoverageOnlyFrom").unwrap()[&expected_key],
        json!(true)
    );
}

#[test]
fn derived_route_examples() {
    let (_dir, reader) = project_with(&[]);

    let charito = resolve(json!({"dist": {"dir": "/charito/"}}), &reader).unwrap();
    assert_eq!(
        charito.get_str("browserSyncOptions.server.routes./charito/"),
        Some("/charito/")
    );

    let relative = resolve(json!({"dist": {"dir": "./dist/"}}), &reader).unwrap();
    assert_eq!(
        relative.get_str("browserSyncOptions.server.routes./dist/"),
        Some("./dist/")
    );

    // A directory the default route table never mentions, to show the
    // entry really is derived
    let custom = resolve(json!({"dist": {"dir": "./out/"}}), &reader).unwrap();
    assert_eq!(
        custom.get_str("browserSyncOptions.server.routes./out/"),
        Some("./out/")
    );
}

#[test]
fn defaults_survive_deep_override() {
    let (_dir, reader) = project_with(&[]);

    // One boolean three levels deep, nothing else restated
    let fragment = json!({"browserSyncOptions": {"server": {"directory": true}}});
    let config = resolve(fragment, &reader).unwrap();

    assert_eq!(
        config.get_bool("browserSyncOptions.server.directory"),
        Some(true)
    );
    // Siblings at every level are intact
    assert_eq!(config.get_str("browserSyncOptions.server.baseDir"), Some("./"));
    assert_eq!(config.get_bool("browserSyncOptions.enabled"), Some(true));
    assert_eq!(
        config.get_str("browserSyncOptions.server.routes./src/"),
        Some("./src/")
    );
}

#[test]
fn shorthand_fragment_matches_nested_fragment() {
    let (_dir, reader) = project_with(&[]);

    let flat = resolve(
        json!({"browserSyncEnabled": false, "jscs": false}),
        &reader,
    )
    .unwrap();
    let nested = resolve(
        json!({"browserSyncOptions": {"enabled": false}, "lint": {"jscs": false}}),
        &reader,
    )
    .unwrap();

    assert_eq!(flat.config, nested.config);
}

//! File-backed options resolution
//!
//! `esdocOptions` and `jestOptions` accept either an inline object or a
//! string naming a JSON file. String values are read through an injected
//! reader before the merge:
//! - unreadable or empty file: the field is dropped and the built-in
//!   default applies, silently
//! - malformed JSON: fatal, propagates out of construction
//! - `jestOptions: "package.json"`: only the `jest` sub-field is kept
//!
//! The coverage allowlist (`jestOptions.collectCoverageOnlyFrom`) keys are
//! file paths; the wrapped test runner requires them absolute, so they are
//! rewritten through an injected path resolver after the merge.

use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::resolver::ConfigError;

/// Reads options files named by the configuration fragment.
pub trait OptionsFileReader {
    fn read_to_string(&self, path: &str) -> io::Result<String>;
}

/// Real filesystem reader used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl OptionsFileReader for FsReader {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Resolves relative file paths to absolute ones.
pub trait PathResolver {
    fn resolve_absolute(&self, path: &str) -> String;
}

/// Resolves against the current working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPathResolver;

impl PathResolver for FsPathResolver {
    fn resolve_absolute(&self, path: &str) -> String {
        let p = Path::new(path);
        if p.is_absolute() {
            return path.to_string();
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(p).to_string_lossy().into_owned(),
            Err(_) => path.to_string(),
        }
    }
}

/// Provenance for an options file that was actually read.
#[derive(Debug, Clone)]
pub struct ResolvedOptionsFile {
    /// Path as given in the fragment
    pub path: String,

    /// SHA-256 digest of the raw file contents
    pub digest: String,
}

/// Resolve one file-backed options field in place.
///
/// Returns provenance for the file when one was read and parsed, `None`
/// when the field was inline, absent, or dropped.
pub fn resolve_options_field(
    fragment: &mut Map<String, Value>,
    field: &str,
    reader: &dyn OptionsFileReader,
) -> Result<Option<ResolvedOptionsFile>, ConfigError> {
    let path = match fragment.get(field).and_then(Value::as_str) {
        Some(p) => p.to_string(),
        None => return Ok(None),
    };

    let contents = match reader.read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            // Unreadable file: drop the field so the default applies.
            fragment.remove(field);
            return Ok(None);
        }
    };
    if contents.is_empty() {
        fragment.remove(field);
        return Ok(None);
    }

    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let parsed: Value =
        serde_json::from_str(&contents).map_err(|e| ConfigError::MalformedOptions {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    // The package manifest holds test-runner settings under its `jest` key;
    // anything else in it is irrelevant here.
    let resolved = if field == "jestOptions" && path == "package.json" {
        parsed.get("jest").cloned()
    } else {
        Some(parsed)
    };

    match resolved {
        Some(value) => {
            fragment.insert(field.to_string(), value);
        }
        None => {
            fragment.remove(field);
        }
    }

    Ok(Some(ResolvedOptionsFile { path, digest }))
}

/// Rewrite the keys of `jestOptions.collectCoverageOnlyFrom` to absolute
/// paths, preserving the values. Runs on the merged tree.
pub fn rewrite_coverage_paths(config: &mut Value, paths: &dyn PathResolver) {
    let Some(coverage) = config
        .pointer_mut("/jestOptions/collectCoverageOnlyFrom")
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    let rewritten: Map<String, Value> = std::mem::take(coverage)
        .into_iter()
        .map(|(file, keep)| (paths.resolve_absolute(&file), keep))
        .collect();
    *coverage = rewritten;
}

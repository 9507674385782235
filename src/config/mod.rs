//! Configuration resolution
//!
//! One authoritative configuration tree per lane, produced by:
//! 1. Input normalization (main-file shorthand vs. fragment)
//! 2. Shorthand alias expansion
//! 3. File-backed options resolution (esdocOptions, jestOptions)
//! 4. Deep merge over built-in defaults
//! 5. Coverage path absolutization and dist route derivation
//! 6. Validation

mod defaults;
mod merge;
mod options;
mod resolver;
mod shorthand;

pub use defaults::BuiltinDefaults;
pub use merge::{deep_merge, merge_layers};
pub use options::{
    FsPathResolver, FsReader, OptionsFileReader, PathResolver, ResolvedOptionsFile,
};
pub use resolver::{
    ConfigError, ConfigInput, ConfigOrigin, ConfigSource, ResolvedConfig, SCHEMA_ID,
    SCHEMA_VERSION,
};
pub use shorthand::{expand_shorthand, SHORTHAND_ALIASES};

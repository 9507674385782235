//! buildlane - configuration and orchestration lane for front-end build pipelines
//!
//! This crate wires a module bundler, file-watcher, transpiler, dev
//! server, linter, doc generator, and test runner together as named build
//! tasks. The core is the configuration merge engine (defaults, shorthand
//! aliases, file-backed options, derived routes) and a lazily-loading
//! dependency registry with injection overrides; the tool invocations
//! themselves belong to the host.

pub mod config;
pub mod lane;
pub mod registry;

pub use config::{deep_merge, merge_layers, ConfigError, ConfigInput, ResolvedConfig};
pub use lane::{Lane, TaskKind, TaskRegistrar, TaskSpec};
pub use registry::{
    Capability, CapabilityLoader, DependencyRegistry, NodeModuleLoader, RegistryError, ToolHandle,
};

//! Dependency registry
//!
//! Task bodies obtain their external tools through a uniform accessor that
//! prefers a caller-injected override and otherwise loads the named
//! default exactly once, caching the handle for the lane's lifetime. The
//! capability set is closed: it is the fixed list of tools the pipeline
//! pipes data through.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("capability '{name}' could not be loaded: {reason}")]
    MissingCapability { name: &'static str, reason: String },
}

/// The closed set of external capabilities the lane knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Browserify,
    Watchify,
    Babelify,
    VinylSourceStream,
    VinylTransform,
    BrowserSync,
    Rimraf,
    GulpIf,
    GulpStreamify,
    GulpUglify,
    GulpJscs,
    GulpEslint,
    Esdoc,
    EsdocPublisher,
    EsdocUploader,
    Jest,
    Through,
}

impl Capability {
    /// Every capability, in a stable order.
    pub const ALL: [Capability; 17] = [
        Capability::Browserify,
        Capability::Watchify,
        Capability::Babelify,
        Capability::VinylSourceStream,
        Capability::VinylTransform,
        Capability::BrowserSync,
        Capability::Rimraf,
        Capability::GulpIf,
        Capability::GulpStreamify,
        Capability::GulpUglify,
        Capability::GulpJscs,
        Capability::GulpEslint,
        Capability::Esdoc,
        Capability::EsdocPublisher,
        Capability::EsdocUploader,
        Capability::Jest,
        Capability::Through,
    ];

    /// The module name the default implementation is installed under.
    pub fn module_name(&self) -> &'static str {
        match self {
            Capability::Browserify => "browserify",
            Capability::Watchify => "watchify",
            Capability::Babelify => "babelify",
            Capability::VinylSourceStream => "vinyl-source-stream",
            Capability::VinylTransform => "vinyl-transform",
            Capability::BrowserSync => "browser-sync",
            Capability::Rimraf => "rimraf",
            Capability::GulpIf => "gulp-if",
            Capability::GulpStreamify => "gulp-streamify",
            Capability::GulpUglify => "gulp-uglify",
            Capability::GulpJscs => "gulp-jscs",
            Capability::GulpEslint => "gulp-eslint",
            Capability::Esdoc => "esdoc",
            Capability::EsdocPublisher => "esdoc-publisher",
            Capability::EsdocUploader => "esdoc-uploader",
            Capability::Jest => "jest-cli",
            Capability::Through => "through2",
        }
    }

    /// Look a capability up by its module name.
    pub fn from_module_name(name: &str) -> Option<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.module_name() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

/// Loads the default implementation of a capability.
///
/// The loader is only consulted for capabilities without an override, the
/// first time each one is requested.
pub trait CapabilityLoader {
    /// Handle type the loader produces
    type Tool;

    fn load(&mut self, capability: Capability) -> Result<Self::Tool, RegistryError>;
}

/// Named-capability registry with override slots and a lazy default cache.
pub struct DependencyRegistry<L: CapabilityLoader> {
    loader: L,
    overrides: HashMap<Capability, Arc<L::Tool>>,
    cache: HashMap<Capability, Arc<L::Tool>>,
}

impl<L: CapabilityLoader> DependencyRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            overrides: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// The fixed capability set.
    pub fn capabilities() -> &'static [Capability] {
        &Capability::ALL
    }

    /// Inject (`Some`) or clear (`None`) the override for a capability.
    /// With no override, the next `get` falls through to the lazy default.
    pub fn set_override(&mut self, capability: Capability, handle: Option<Arc<L::Tool>>) {
        match handle {
            Some(handle) => {
                self.overrides.insert(capability, handle);
            }
            None => {
                self.overrides.remove(&capability);
            }
        }
    }

    /// Whether an override is currently set for a capability.
    pub fn has_override(&self, capability: Capability) -> bool {
        self.overrides.contains_key(&capability)
    }

    /// Get the tool for a capability: the override when set, otherwise the
    /// default, loaded once and cached for the registry's lifetime.
    pub fn get(&mut self, capability: Capability) -> Result<Arc<L::Tool>, RegistryError> {
        if let Some(handle) = self.overrides.get(&capability) {
            return Ok(Arc::clone(handle));
        }
        if let Some(handle) = self.cache.get(&capability) {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(self.loader.load(capability)?);
        self.cache.insert(capability, Arc::clone(&handle));
        Ok(handle)
    }
}

/// Handle to an installed tool module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolHandle {
    /// The capability this handle satisfies
    pub capability: Capability,

    /// Directory the module is installed in
    pub install_dir: PathBuf,
}

/// Loads capability defaults from an installed modules directory
/// (conventionally `node_modules/`). A capability is present when its
/// module directory exists; a missing module means the host environment
/// is misconfigured and surfaces as `MissingCapability`.
#[derive(Debug, Clone)]
pub struct NodeModuleLoader {
    modules_dir: PathBuf,
}

impl NodeModuleLoader {
    pub fn new(modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules_dir: modules_dir.into(),
        }
    }

    /// Loader rooted at `./node_modules`.
    pub fn from_cwd() -> Self {
        Self::new(Path::new("node_modules"))
    }
}

impl CapabilityLoader for NodeModuleLoader {
    type Tool = ToolHandle;

    fn load(&mut self, capability: Capability) -> Result<ToolHandle, RegistryError> {
        let install_dir = self.modules_dir.join(capability.module_name());
        if !install_dir.is_dir() {
            return Err(RegistryError::MissingCapability {
                name: capability.module_name(),
                reason: format!("no module at {}", install_dir.display()),
            });
        }
        Ok(ToolHandle {
            capability,
            install_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts loads so tests can assert the cache is hit.
    struct CountingLoader {
        loads: usize,
    }

    impl CapabilityLoader for CountingLoader {
        type Tool = String;

        fn load(&mut self, capability: Capability) -> Result<String, RegistryError> {
            self.loads += 1;
            Ok(format!("default-{}", capability.module_name()))
        }
    }

    struct FailingLoader;

    impl CapabilityLoader for FailingLoader {
        type Tool = String;

        fn load(&mut self, capability: Capability) -> Result<String, RegistryError> {
            Err(RegistryError::MissingCapability {
                name: capability.module_name(),
                reason: "not installed".to_string(),
            })
        }
    }

    #[test]
    fn test_override_preferred() {
        let mut registry = DependencyRegistry::new(CountingLoader { loads: 0 });
        let custom = Arc::new("custom-rimraf".to_string());

        registry.set_override(Capability::Rimraf, Some(Arc::clone(&custom)));

        let got = registry.get(Capability::Rimraf).unwrap();
        assert!(Arc::ptr_eq(&got, &custom));
        assert_eq!(registry.loader.loads, 0);
    }

    #[test]
    fn test_cleared_override_falls_through_to_default() {
        let mut registry = DependencyRegistry::new(CountingLoader { loads: 0 });

        registry.set_override(Capability::Rimraf, Some(Arc::new("custom".to_string())));
        assert!(registry.has_override(Capability::Rimraf));

        registry.set_override(Capability::Rimraf, None);
        assert!(!registry.has_override(Capability::Rimraf));

        let got = registry.get(Capability::Rimraf).unwrap();
        assert_eq!(*got, "default-rimraf");
        assert_eq!(registry.loader.loads, 1);
        // The lazily-loaded default does not count as an override
        assert!(!registry.has_override(Capability::Rimraf));
    }

    #[test]
    fn test_default_loaded_once_and_cached() {
        let mut registry = DependencyRegistry::new(CountingLoader { loads: 0 });

        let first = registry.get(Capability::Browserify).unwrap();
        let second = registry.get(Capability::Browserify).unwrap();

        // Same handle, not a reload
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.loader.loads, 1);
    }

    #[test]
    fn test_cache_keyed_by_capability() {
        let mut registry = DependencyRegistry::new(CountingLoader { loads: 0 });

        registry.get(Capability::Browserify).unwrap();
        registry.get(Capability::Watchify).unwrap();

        assert_eq!(registry.loader.loads, 2);
    }

    #[test]
    fn test_override_shadows_cached_default() {
        let mut registry = DependencyRegistry::new(CountingLoader { loads: 0 });

        let cached = registry.get(Capability::Jest).unwrap();
        let custom = Arc::new("custom-jest".to_string());
        registry.set_override(Capability::Jest, Some(Arc::clone(&custom)));

        let got = registry.get(Capability::Jest).unwrap();
        assert!(Arc::ptr_eq(&got, &custom));

        // Clearing the override exposes the previously cached default again.
        registry.set_override(Capability::Jest, None);
        let again = registry.get(Capability::Jest).unwrap();
        assert!(Arc::ptr_eq(&again, &cached));
        assert_eq!(registry.loader.loads, 1);
    }

    #[test]
    fn test_missing_capability_propagates() {
        let mut registry = DependencyRegistry::new(FailingLoader);

        let err = registry.get(Capability::Esdoc).unwrap_err();
        assert!(err.to_string().contains("esdoc"));

        // An override still works even when the loader cannot.
        registry.set_override(Capability::Esdoc, Some(Arc::new("injected".to_string())));
        assert!(registry.get(Capability::Esdoc).is_ok());
    }

    #[test]
    fn test_capability_set_is_fixed() {
        let all = DependencyRegistry::<CountingLoader>::capabilities();
        assert_eq!(all.len(), 17);
        assert!(all.contains(&Capability::Rimraf));
        assert!(all.contains(&Capability::Through));
    }

    #[test]
    fn test_module_name_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(
                Capability::from_module_name(capability.module_name()),
                Some(capability)
            );
        }
        assert_eq!(Capability::from_module_name("left-pad"), None);
    }

    #[test]
    fn test_node_module_loader() {
        let temp = tempfile::tempdir().unwrap();
        let modules = temp.path().join("node_modules");
        std::fs::create_dir_all(modules.join("rimraf")).unwrap();

        let mut registry = DependencyRegistry::new(NodeModuleLoader::new(&modules));

        let rimraf = registry.get(Capability::Rimraf).unwrap();
        assert_eq!(rimraf.install_dir, modules.join("rimraf"));

        let err = registry.get(Capability::Browserify).unwrap_err();
        assert!(matches!(err, RegistryError::MissingCapability { name, .. } if name == "browserify"));
    }
}

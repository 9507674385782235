//! Lane wrapper
//!
//! `Lane` ties the resolved configuration and the dependency registry to a
//! host task registrar. The wrapper registers the pipeline's named tasks
//! (honoring the `tasks` table: disable with `false`, rename with a string
//! or an object, extend dependencies with an object) and exposes the
//! accessors the task bodies consume. The task bodies themselves live with
//! the host; they only read configuration and pull tool handles from the
//! registry.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{
    ConfigError, ConfigInput, FsPathResolver, FsReader, OptionsFileReader, PathResolver,
    ResolvedConfig,
};
use crate::registry::{Capability, CapabilityLoader, DependencyRegistry, RegistryError};

/// Internal identifiers for the tasks the lane registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Build,
    Serve,
    Es5,
    Clean,
    CleanEs5,
    Lint,
    Test,
    UploadDocs,
    Docs,
}

impl TaskKind {
    /// Every task, in registration order.
    pub const ALL: [TaskKind; 9] = [
        TaskKind::Build,
        TaskKind::Serve,
        TaskKind::Es5,
        TaskKind::Clean,
        TaskKind::CleanEs5,
        TaskKind::Lint,
        TaskKind::Test,
        TaskKind::UploadDocs,
        TaskKind::Docs,
    ];

    /// The key this task uses in the configuration's `tasks` table.
    pub fn id(&self) -> &'static str {
        match self {
            TaskKind::Build => "build",
            TaskKind::Serve => "serve",
            TaskKind::Es5 => "es5",
            TaskKind::Clean => "clean",
            TaskKind::CleanEs5 => "cleanEs5",
            TaskKind::Lint => "lint",
            TaskKind::Test => "test",
            TaskKind::UploadDocs => "uploadDocs",
            TaskKind::Docs => "docs",
        }
    }

    /// Built-in task dependencies: a build is preceded by a clean, a serve
    /// by a build.
    pub fn default_deps(&self) -> &'static [&'static str] {
        match self {
            TaskKind::Serve => &["build"],
            TaskKind::Build => &["clean"],
            TaskKind::Es5 => &["cleanEs5"],
            _ => &[],
        }
    }
}

/// One task registration handed to the host registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Which lane task this is
    pub kind: TaskKind,

    /// Name the task is registered under
    pub name: String,

    /// Task dependency names, extras first, built-ins last
    pub deps: Vec<String>,
}

/// Host-side task registration capability (the gulp-like collaborator).
pub trait TaskRegistrar {
    fn task(&mut self, spec: TaskSpec);
}

/// Hook invoked with the configured task name before a task body runs.
pub type BeforeTaskHook = Box<dyn FnMut(&str)>;

/// The configured wrapper instance: one resolved configuration, one
/// dependency registry, one registrar.
pub struct Lane<R: TaskRegistrar, L: CapabilityLoader> {
    registrar: R,
    config: ResolvedConfig,
    registry: DependencyRegistry<L>,
    before_task: Option<BeforeTaskHook>,
}

impl<R: TaskRegistrar, L: CapabilityLoader> Lane<R, L> {
    /// Create a lane with the default filesystem collaborators.
    pub fn new(registrar: R, loader: L, input: ConfigInput) -> Result<Self, ConfigError> {
        Self::with_collaborators(registrar, loader, input, &FsReader, &FsPathResolver)
    }

    /// Create a lane with injected file-reading and path-resolving
    /// collaborators (tests inject fakes here).
    pub fn with_collaborators(
        registrar: R,
        loader: L,
        input: ConfigInput,
        reader: &dyn OptionsFileReader,
        paths: &dyn PathResolver,
    ) -> Result<Self, ConfigError> {
        let config = ResolvedConfig::build(input, reader, paths)?;
        Ok(Self {
            registrar,
            config,
            registry: DependencyRegistry::new(loader),
            before_task: None,
        })
    }

    /// The lane's resolved configuration.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The dependency registry, for direct override management.
    pub fn registry(&mut self) -> &mut DependencyRegistry<L> {
        &mut self.registry
    }

    /// Inject (`Some`) or clear (`None`) the tool override for a capability.
    pub fn override_tool(&mut self, capability: Capability, handle: Option<Arc<L::Tool>>) {
        self.registry.set_override(capability, handle);
    }

    /// Get the tool for a capability (override first, lazy default after).
    pub fn tool(&mut self, capability: Capability) -> Result<Arc<L::Tool>, RegistryError> {
        self.registry.get(capability)
    }

    /// Install the pre-task hook.
    pub fn set_before_task_hook(&mut self, hook: BeforeTaskHook) {
        self.before_task = Some(hook);
    }

    /// Report a task about to run to the pre-task hook, under its
    /// configured name.
    pub fn before_task(&mut self, kind: TaskKind) {
        if let Some(hook) = self.before_task.as_mut() {
            let name = configured_task_name(&self.config, kind);
            hook(&name);
        }
    }

    /// Register every enabled task with the host registrar. Disabled tasks
    /// (`tasks.<id> = false`) are skipped; object bindings may rename the
    /// task and prepend extra dependencies ahead of the built-in ones.
    pub fn register_tasks(&mut self) -> &mut Self {
        for kind in TaskKind::ALL {
            let Some(spec) = task_spec(&self.config, kind) else {
                continue;
            };
            self.registrar.task(spec);
        }
        self
    }

    /// Consume the one-shot test target: the wrapped test runner receives
    /// the rest of `jestOptions` as its config, so the target must not
    /// linger there after being read.
    pub fn take_jest_target(&mut self) -> Option<String> {
        let options = self
            .config
            .config
            .pointer_mut("/jestOptions")?
            .as_object_mut()?;
        match options.remove("target") {
            Some(Value::String(target)) => Some(target),
            // Non-string targets are discarded the same way.
            _ => None,
        }
    }

    /// Directory the clean task deletes.
    pub fn clean_dir(&self) -> Option<&str> {
        self.config.get_str("dist.dir")
    }

    /// Directory the cleanEs5 task deletes.
    pub fn clean_es5_dir(&self) -> Option<&str> {
        self.config.get_str("es5.dir")
    }
}

/// Build the registration spec for one task, or `None` when the task is
/// disabled or absent from the table.
pub fn task_spec(config: &ResolvedConfig, kind: TaskKind) -> Option<TaskSpec> {
    let binding = config.get(&format!("tasks.{}", kind.id()))?;

    let (name, extra_deps) = match binding {
        Value::Bool(false) => return None,
        Value::Bool(true) => (kind.id().to_string(), Vec::new()),
        Value::String(name) => (name.clone(), Vec::new()),
        Value::Object(obj) => {
            let name = obj
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(kind.id())
                .to_string();
            let extra = obj
                .get("deps")
                .and_then(Value::as_array)
                .map(|deps| {
                    deps.iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            (name, extra)
        }
        _ => return None,
    };

    let mut deps = extra_deps;
    deps.extend(kind.default_deps().iter().map(|d| d.to_string()));

    Some(TaskSpec { kind, name, deps })
}

fn configured_task_name(config: &ResolvedConfig, kind: TaskKind) -> String {
    task_spec(config, kind)
        .map(|spec| spec.name)
        .unwrap_or_else(|| kind.id().to_string())
}

//! buildlane CLI
//!
//! Entry point for the `buildlane` command-line tool: inspect the resolved
//! configuration, the tasks that would be registered, and the capability
//! modules the lane can load.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use buildlane::config::{ConfigInput, ResolvedConfig};
use buildlane::lane::task_spec;
use buildlane::registry::{Capability, DependencyRegistry, NodeModuleLoader};
use buildlane::TaskKind;

#[derive(Parser)]
#[command(name = "buildlane")]
#[command(about = "Configuration and task lane for front-end build pipelines", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration as pretty JSON
    Config {
        /// Path to a config fragment file (TOML or JSON)
        #[arg(long, short = 'f')]
        fragment: Option<PathBuf>,

        /// Override only the entry file (ignores --fragment)
        #[arg(long)]
        main_file: Option<String>,
    },

    /// List the tasks that would be registered, with their dependencies
    Tasks {
        /// Path to a config fragment file (TOML or JSON)
        #[arg(long, short = 'f')]
        fragment: Option<PathBuf>,
    },

    /// List the capability modules and whether they are installed
    Capabilities {
        /// Installed modules directory
        #[arg(long, default_value = "node_modules")]
        modules_dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config {
            fragment,
            main_file,
        } => cmd_config(fragment, main_file),
        Commands::Tasks { fragment } => cmd_tasks(fragment),
        Commands::Capabilities { modules_dir } => cmd_capabilities(modules_dir),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        process::exit(2);
    }
}

fn load_input(
    fragment: Option<PathBuf>,
    main_file: Option<String>,
) -> Result<ConfigInput, String> {
    if let Some(main) = main_file {
        return Ok(ConfigInput::MainFile(main));
    }
    match fragment {
        Some(path) => ConfigInput::from_fragment_file(&path).map_err(|e| e.to_string()),
        None => Ok(ConfigInput::default()),
    }
}

fn cmd_config(fragment: Option<PathBuf>, main_file: Option<String>) -> Result<(), String> {
    let input = load_input(fragment, main_file)?;
    let config = ResolvedConfig::build(
        input,
        &buildlane::config::FsReader,
        &buildlane::config::FsPathResolver,
    )
    .map_err(|e| e.to_string())?;

    let json = config.to_json().map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn cmd_tasks(fragment: Option<PathBuf>) -> Result<(), String> {
    let input = load_input(fragment, None)?;
    let config = ResolvedConfig::build(
        input,
        &buildlane::config::FsReader,
        &buildlane::config::FsPathResolver,
    )
    .map_err(|e| e.to_string())?;

    for kind in TaskKind::ALL {
        match task_spec(&config, kind) {
            Some(spec) if spec.deps.is_empty() => println!("{}", spec.name),
            Some(spec) => println!("{} (after: {})", spec.name, spec.deps.join(", ")),
            None => println!("{} (disabled)", kind.id()),
        }
    }
    Ok(())
}

fn cmd_capabilities(modules_dir: PathBuf) -> Result<(), String> {
    let mut registry = DependencyRegistry::new(NodeModuleLoader::new(modules_dir));

    for capability in Capability::ALL {
        match registry.get(capability) {
            Ok(handle) => println!("{capability}: {}", handle.install_dir.display()),
            Err(_) => println!("{capability}: missing"),
        }
    }
    Ok(())
}

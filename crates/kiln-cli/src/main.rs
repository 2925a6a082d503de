use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod progress;
mod workspace;

/// Kiln: build orchestrator for multi-project native workspaces.
///
/// Each project directory carries a manifest.json naming its id, type
/// (lib, app, kernel or module), link dependencies (`libs`) and
/// include-only dependencies (`includes`). Kiln resolves the dependency
/// graph, generates per-project headers and drives the configured
/// compiler, assembler, archiver and linker.
///
/// EXAMPLES:
///     kiln list                     List discovered projects
///     kiln info kernel              Show resolved dependencies of a project
///     kiln build                    Build every project
///     kiln build kernel             Build the kernel and its libraries
///     kiln rebuild libc             Clean, then build
///
/// ENVIRONMENT VARIABLES:
///     KILN_CC, KILN_AS, KILN_LD,    Override toolchain programs
///     KILN_AR, KILN_OBJDUMP
///     RUST_LOG                      Log filter (default: warn)
///     NO_COLOR                      Disable colored output
#[derive(Parser)]
#[command(name = "kiln")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory to start searching for kiln.toml from
    #[arg(long, global = true, env = "KILN_ROOT")]
    root: Option<PathBuf>,

    /// Verbose output (debug logs, tool command lines)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every discovered project
    ///
    /// EXAMPLES:
    ///     kiln list           Table of id, type and output
    ///     kiln list --json    Machine-readable output
    #[command(visible_alias = "ls")]
    List {
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Show a project with its dependency closures resolved
    ///
    /// Reports the link closure, include closure, header search order and
    /// the archives that would be linked.
    Info {
        /// Project id
        id: String,
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Build projects and their link dependencies
    ///
    /// Without ids (or with --all) every project is built. Building
    /// continues past failed projects; the exit status is non-zero if any
    /// project failed.
    ///
    /// EXAMPLES:
    ///     kiln build
    ///     kiln build kernel init
    #[command(visible_alias = "b")]
    Build {
        /// Project ids to build
        ids: Vec<String>,
        /// Build every project
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },

    /// Remove obj/ and bin/ of projects
    Clean {
        /// Project ids to clean
        ids: Vec<String>,
        /// Clean every project
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },

    /// Clean, then build
    Rebuild {
        /// Project ids to rebuild
        ids: Vec<String>,
        /// Rebuild every project
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let workspace = workspace::Workspace::load(&root)?;

    match cli.command {
        Commands::List { json } => commands::list::run(&workspace, json),
        Commands::Info { id, json } => commands::info::run(&workspace, &id, json),
        Commands::Build { ids, all } => {
            let selection = workspace.select(&ids, all)?;
            commands::build::run(&workspace, &selection)
        }
        Commands::Clean { ids, all } => {
            let selection = workspace.select(&ids, all)?;
            commands::clean::run(&workspace, &selection)
        }
        Commands::Rebuild { ids, all } => {
            let selection = workspace.select(&ids, all)?;
            commands::clean::run(&workspace, &selection)?;
            commands::build::run(&workspace, &selection)
        }
    }
}

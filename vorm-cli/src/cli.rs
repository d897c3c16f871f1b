//! CLI argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// vorm CLI - schema migrations for vector collections
#[derive(Parser, Debug)]
#[command(name = "vorm")]
#[command(version)]
#[command(about = "vorm CLI - schema migrations for vector collections", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file
    #[arg(long, global = true, env = "VORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding schema history and migrations
    #[arg(long, global = true, env = "VORM_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Directory searched for `.vorm` entity declarations
    #[arg(long, global = true, env = "VORM_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new vorm project
    Init(InitArgs),

    /// Schema migration commands
    Migrate(MigrateArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Init Command
// =============================================================================

/// Arguments for the `init` command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to initialize the project (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Skip generating the example entity
    #[arg(long)]
    pub no_example: bool,

    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

// =============================================================================
// Migrate Command
// =============================================================================

/// Arguments for the `migrate` command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateSubcommand,
}

/// Migrate subcommands
#[derive(Subcommand, Debug)]
pub enum MigrateSubcommand {
    /// Generate a migration from entity changes
    Generate(MigrateGenerateArgs),

    /// Show detected entity changes without writing anything
    Diff,

    /// Apply pending migrations
    Run(MigrateRunArgs),

    /// Show applied and pending migrations
    Status(MigrateStatusArgs),

    /// Run the downgrade of the last applied migration
    Rollback(MigrateRollbackArgs),

    /// Rebuild schema history from migration artifacts
    RebuildHistory,

    /// Check or create the migration history collection
    Init,
}

/// Arguments for `migrate generate`
#[derive(Args, Debug)]
pub struct MigrateGenerateArgs {
    /// Name for the migration
    pub name: String,
}

/// Arguments for `migrate run`
#[derive(Args, Debug)]
pub struct MigrateRunArgs {
    /// List pending migrations without applying them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `migrate status`
#[derive(Args, Debug)]
pub struct MigrateStatusArgs {
    /// Print status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `migrate rollback`
#[derive(Args, Debug)]
pub struct MigrateRollbackArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

//! `vorm migrate` commands - Schema migration management.

use serde::Serialize;

use vorm_migrate::{MIGRATION_HISTORY_COLLECTION, MigrationError, MigrationLedger, MigrationRecord};

use crate::cli::{
    GlobalArgs, MigrateArgs, MigrateGenerateArgs, MigrateRollbackArgs, MigrateRunArgs,
    MigrateStatusArgs, MigrateSubcommand,
};
use crate::config::Project;
use crate::error::{CliError, CliResult};
use crate::output::{self, success, warn};

/// Run the migrate command
pub fn run(global: &GlobalArgs, args: MigrateArgs) -> CliResult<()> {
    let project = Project::load(global)?;

    match args.command {
        MigrateSubcommand::Generate(generate_args) => run_generate(&project, generate_args),
        MigrateSubcommand::Diff => run_diff(&project),
        MigrateSubcommand::Run(run_args) => run_pending(&project, run_args),
        MigrateSubcommand::Status(status_args) => run_status(&project, status_args),
        MigrateSubcommand::Rollback(rollback_args) => run_rollback(&project, rollback_args),
        MigrateSubcommand::RebuildHistory => run_rebuild_history(&project),
        MigrateSubcommand::Init => run_init(&project),
    }
}

/// Run `vorm migrate generate` - write an artifact for detected changes
fn run_generate(project: &Project, args: MigrateGenerateArgs) -> CliResult<()> {
    output::header("Migrate Generate");
    output::kv("Models", &project.models_dir.display().to_string());
    output::kv("Schema", &project.schema_dir.display().to_string());
    output::newline();

    let manager = project.manager();
    let artifact = match manager.generate_migration(&args.name) {
        Ok(artifact) => artifact,
        Err(MigrationError::NoChanges) => {
            output::info("No changes detected, nothing to generate");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    output::section("Upgrade");
    output::operations(&artifact.upgrade);
    output::newline();

    success(&format!(
        "Generated migration {} ({} entities)",
        artifact.id,
        artifact.entities.len()
    ));
    output::dim(&format!("  {}", artifact.path.display()));

    Ok(())
}

/// Run `vorm migrate diff` - show changes without writing anything
fn run_diff(project: &Project) -> CliResult<()> {
    output::header("Migrate Diff");

    let changes = project.manager().detect_changes(false)?;
    if changes.is_empty() {
        output::info("No changes detected");
        return Ok(());
    }

    for (entity, change) in &changes {
        output::section(&format!("{} ({})", entity, change.collection_name));
        output::change_set(change);
        output::newline();
    }

    output::info(&format!("{} entities changed", changes.len()));
    Ok(())
}

/// Run `vorm migrate run` - apply pending migrations
fn run_pending(project: &Project, args: MigrateRunArgs) -> CliResult<()> {
    output::header("Migrate Run");

    let manager = project.manager();
    let mut ledger = project.ledger();

    if args.dry_run {
        let pending = manager.pending_migrations(&ledger)?;
        if pending.is_empty() {
            output::info("No pending migrations");
            return Ok(());
        }
        output::section(&format!("{} pending migrations", pending.len()));
        for artifact in &pending {
            output::list_item(&artifact.id);
            output::operations(&artifact.upgrade);
        }
        output::newline();
        output::dim("Dry run, nothing applied");
        return Ok(());
    }

    let mut catalog = project.catalog()?;
    let result = match manager.run_pending_migrations(&mut catalog, &mut ledger) {
        Ok(result) => result,
        Err(MigrationError::ApplyFailed {
            id,
            applied,
            source,
        }) => {
            if !applied.is_empty() {
                output::section("Applied before failure");
                for applied_id in &applied {
                    output::list_item(applied_id);
                }
            }
            return Err(MigrationError::ApplyFailed {
                id,
                applied,
                source,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    for warning in &result.warnings {
        warn(warning);
    }

    if !result.has_changes() {
        output::info("No pending migrations");
        return Ok(());
    }

    for id in &result.applied_migrations {
        output::list_item(&output::style_success(id));
    }
    output::newline();
    success(&result.summary());

    Ok(())
}

#[derive(Serialize)]
struct StatusReport<'a> {
    applied: &'a [MigrationRecord],
    pending: Vec<&'a str>,
    missing: &'a [String],
}

/// Run `vorm migrate status` - list applied and pending migrations
fn run_status(project: &Project, args: MigrateStatusArgs) -> CliResult<()> {
    let status = project.manager().status(&project.ledger())?;

    if args.json {
        let report = StatusReport {
            applied: &status.applied,
            pending: status.pending.iter().map(|a| a.id.as_str()).collect(),
            missing: &status.missing,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Command(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    output::header("Migrate Status");

    output::section("Applied");
    if status.applied.is_empty() {
        output::dim("  none");
    }
    for record in &status.applied {
        output::list_item(&format!(
            "{} {}",
            output::style_success(&record.id),
            record.applied_at.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    output::newline();

    output::section("Pending");
    if status.pending.is_empty() {
        output::dim("  none");
    }
    for artifact in &status.pending {
        output::list_item(&output::style_pending(&artifact.id));
    }

    if !status.missing.is_empty() {
        output::newline();
        for id in &status.missing {
            warn(&format!("Applied migration {} has no artifact file", id));
        }
    }

    output::newline();
    output::info(&status.summary());
    Ok(())
}

/// Run `vorm migrate rollback` - run the last applied downgrade
fn run_rollback(project: &Project, args: MigrateRollbackArgs) -> CliResult<()> {
    output::header("Migrate Rollback");

    let manager = project.manager();
    let mut ledger = project.ledger();

    let Some(last) = ledger.last_applied()? else {
        output::info("No applied migrations to roll back");
        return Ok(());
    };

    if !args.force && !output::confirm(&format!("Roll back migration {}?", last.id)) {
        output::info("Rollback cancelled");
        return Ok(());
    }

    let mut catalog = project.catalog()?;
    let artifact = manager.rollback_last(&mut catalog, &mut ledger)?;

    output::section("Downgrade");
    output::operations(&artifact.downgrade);
    output::newline();
    success(&format!("Rolled back {}", artifact.id));
    output::dim("Schema history is unchanged; run `vorm migrate rebuild-history` to resync it");
    Ok(())
}

/// Run `vorm migrate rebuild-history` - replay artifacts into snapshots
fn run_rebuild_history(project: &Project) -> CliResult<()> {
    output::header("Rebuild History");

    let rebuilt = project.manager().rebuild_history()?;
    if rebuilt.is_empty() {
        output::info("No entity has been migrated yet");
        return Ok(());
    }

    for schema in &rebuilt {
        output::list_item(&format!(
            "{} ({}) version {}",
            schema.entity_name, schema.collection_name, schema.version
        ));
    }
    output::newline();
    success(&format!("Rebuilt {} snapshots", rebuilt.len()));
    Ok(())
}

/// Run `vorm migrate init` - check or create the bookkeeping collection
fn run_init(project: &Project) -> CliResult<()> {
    output::header("Migrate Init");

    let mut catalog = project.catalog()?;
    let mut ledger = project.ledger();
    let created = project
        .manager()
        .initialize_bookkeeping(&mut catalog, &mut ledger)?;

    if created {
        success(&format!(
            "Created collection {}",
            MIGRATION_HISTORY_COLLECTION
        ));
    } else {
        output::info(&format!(
            "Collection {} already exists",
            MIGRATION_HISTORY_COLLECTION
        ));
    }
    Ok(())
}

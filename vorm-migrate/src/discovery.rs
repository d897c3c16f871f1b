//! Entity discovery from declaration files.

use std::path::Path;

use tracing::{debug, warn};
use vorm_schema::{EntityRegistry, parse_entity_file};
use walkdir::WalkDir;

use crate::error::{MigrateResult, MigrationError};

/// Extension of entity declaration files.
pub const MODEL_EXTENSION: &str = "vorm";

/// Parse every declaration file under `models_dir` into a fresh registry.
///
/// Files are visited in sorted path order. A file that fails to parse is
/// skipped with a warning; when two files declare the same entity the first
/// one wins.
pub fn discover_entities(models_dir: &Path) -> MigrateResult<EntityRegistry> {
    if !models_dir.is_dir() {
        return Err(MigrationError::config(format!(
            "entity search path {} is not a readable directory",
            models_dir.display()
        )));
    }

    let mut registry = EntityRegistry::new();
    let walker = WalkDir::new(models_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().is_none_or(|ext| ext != MODEL_EXTENSION)
        {
            continue;
        }

        match parse_entity_file(path) {
            Ok(entities) => {
                debug!(path = %path.display(), entities = entities.len(), "parsed model file");
                for name in registry.merge(entities) {
                    warn!(
                        entity = %name,
                        path = %path.display(),
                        "entity already declared in an earlier file, keeping the first"
                    );
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unparsable model file");
            }
        }
    }

    Ok(registry)
}

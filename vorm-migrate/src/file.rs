//! Migration artifact files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{MigrateResult, MigrationError};
use crate::generator::MigrationOps;
use crate::operation::Operation;

/// Timestamp prefix format of migration IDs.
pub const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const ID_TIMESTAMP_LEN: usize = 15;

/// A generated migration: an immutable upgrade/downgrade pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationArtifact {
    /// Sortable ID: `<YYYYMMDD_HHMMSS>_<name>`.
    pub id: String,
    /// Sanitized migration name.
    pub name: String,
    /// When the artifact was generated.
    pub created_at: DateTime<Utc>,
    /// Entities whose changes the artifact carries.
    #[serde(default)]
    pub entities: Vec<String>,
    /// Forward procedure.
    pub upgrade: Vec<Operation>,
    /// Backward procedure.
    pub downgrade: Vec<Operation>,
    /// Where the artifact was read from or written to.
    #[serde(skip)]
    pub path: PathBuf,
}

impl MigrationArtifact {
    /// Checksum of both procedures.
    pub fn checksum(&self) -> String {
        compute_checksum(&self.upgrade, &self.downgrade)
    }

    /// Whether any upgrade operation targets the collection.
    pub fn touches(&self, collection: &str) -> bool {
        self.upgrade.iter().any(|op| op.collection() == collection)
    }

    /// Upgrade operations for one collection, in order.
    pub fn upgrade_for<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a Operation> {
        self.upgrade.iter().filter(move |op| op.collection() == collection)
    }
}

/// Compute a SHA-256 checksum over the canonical JSON of both procedures.
pub fn compute_checksum(upgrade: &[Operation], downgrade: &[Operation]) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain enums of strings and integers cannot fail.
    hasher.update(serde_json::to_vec(&upgrade).unwrap_or_default());
    hasher.update(b"\n");
    hasher.update(serde_json::to_vec(&downgrade).unwrap_or_default());
    hex::encode(hasher.finalize())
}

/// Reduce a migration name to `[a-z0-9_]`.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Split a migration ID into its timestamp and name.
pub fn parse_migration_id(id: &str) -> MigrateResult<(NaiveDateTime, String)> {
    let invalid = || MigrationError::migration_file(format!("Invalid migration ID: {}", id));

    if id.len() <= ID_TIMESTAMP_LEN + 1 || !id.is_char_boundary(ID_TIMESTAMP_LEN) {
        return Err(invalid());
    }
    let (stamp, rest) = id.split_at(ID_TIMESTAMP_LEN);
    let name = rest.strip_prefix('_').ok_or_else(invalid)?;
    let timestamp =
        NaiveDateTime::parse_from_str(stamp, ID_TIMESTAMP_FORMAT).map_err(|_| invalid())?;

    Ok((timestamp, name.to_string()))
}

/// Migration artifact reader/writer.
pub struct MigrationFileManager {
    /// Directory where artifacts are stored.
    migrations_dir: PathBuf,
}

impl MigrationFileManager {
    /// Create a new file manager.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Get the migrations directory.
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Ensure the migrations directory exists.
    pub fn ensure_dir(&self) -> MigrateResult<()> {
        fs::create_dir_all(&self.migrations_dir)?;
        Ok(())
    }

    /// List all artifacts in ID order.
    ///
    /// A malformed artifact is an error: skipping it would break ordering.
    pub fn list_migrations(&self) -> MigrateResult<Vec<MigrationArtifact>> {
        if !self.migrations_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.migrations_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|p| self.read_migration(p)).collect()
    }

    /// Read one artifact.
    pub fn read_migration(&self, path: &Path) -> MigrateResult<MigrationArtifact> {
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MigrationError::migration_file(format!("Invalid path: {}", path.display())))?;
        parse_migration_id(stem)?;

        let content = fs::read_to_string(path)?;
        let mut artifact: MigrationArtifact = serde_json::from_str(&content).map_err(|e| {
            MigrationError::migration_file(format!("{}: {}", path.display(), e))
        })?;

        if artifact.id != stem {
            return Err(MigrationError::migration_file(format!(
                "{}: ID `{}` does not match the file name",
                path.display(),
                artifact.id
            )));
        }

        artifact.path = path.to_path_buf();
        Ok(artifact)
    }

    /// Generate the next migration ID.
    ///
    /// IDs are strictly increasing: when `now` does not sort after the latest
    /// artifact, the second after it is used.
    pub fn next_id(&self, name: &str, now: DateTime<Utc>) -> MigrateResult<String> {
        let name = sanitize_name(name);
        if name.is_empty() {
            return Err(MigrationError::migration_file("Migration name is empty"));
        }

        let mut stamp = now.naive_utc();
        if let Some(latest) = self.latest_timestamp()? {
            if stamp.format(ID_TIMESTAMP_FORMAT).to_string()
                <= latest.format(ID_TIMESTAMP_FORMAT).to_string()
            {
                stamp = latest + Duration::seconds(1);
            }
        }

        Ok(format!("{}_{}", stamp.format(ID_TIMESTAMP_FORMAT), name))
    }

    /// Write a new artifact. Existing files are never overwritten.
    pub fn write_migration(
        &self,
        name: &str,
        entities: Vec<String>,
        ops: MigrationOps,
        now: DateTime<Utc>,
    ) -> MigrateResult<MigrationArtifact> {
        self.ensure_dir()?;

        let id = self.next_id(name, now)?;
        let path = self.migrations_dir.join(format!("{}.json", id));
        let artifact = MigrationArtifact {
            name: sanitize_name(name),
            id,
            created_at: now,
            entities,
            upgrade: ops.upgrade,
            downgrade: ops.downgrade,
            path: path.clone(),
        };

        let json = serde_json::to_string_pretty(&artifact)?;
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;

        info!(id = %artifact.id, path = %path.display(), "wrote migration");
        Ok(artifact)
    }

    fn latest_timestamp(&self) -> MigrateResult<Option<NaiveDateTime>> {
        if !self.migrations_dir.exists() {
            return Ok(None);
        }

        let mut latest = None;
        for entry in fs::read_dir(&self.migrations_dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };
            match parse_migration_id(stem) {
                Ok((stamp, _)) => latest = latest.max(Some(stamp)),
                Err(_) => debug!(path = %path.display(), "ignoring non-migration file"),
            }
        }
        Ok(latest)
    }
}

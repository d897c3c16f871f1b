//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use vorm_migrate::{FileLedger, LocalCatalog, MigrationConfig, MigrationManager};

use crate::cli::GlobalArgs;
use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "vorm.toml";

/// Default schema directory (relative to project root)
pub const SCHEMA_DIR: &str = "schema";

/// Default entity search path (relative to project root)
pub const MODELS_DIR: &str = "models";

/// Default local catalog file (relative to project root)
pub const CATALOG_FILE: &str = "schema/catalog.json";

/// Default ledger file (relative to project root)
pub const LEDGER_FILE: &str = "schema/applied.json";

/// vorm CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project paths
    pub paths: PathsConfig,

    /// Schema store configuration
    pub store: StoreConfig,

    /// Migration configuration
    pub migrations: MigrationsConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `history/` and `migrations/`
    pub schema_dir: String,

    /// Directory searched for `.vorm` entity declarations
    pub models: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            schema_dir: SCHEMA_DIR.to_string(),
            models: MODELS_DIR.to_string(),
        }
    }
}

/// Schema store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// File backing the local collection catalog
    pub catalog: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            catalog: CATALOG_FILE.to_string(),
        }
    }
}

/// Migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// File recording applied migrations
    pub ledger: String,

    /// Stop when an applied migration was modified
    pub fail_on_checksum_mismatch: bool,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            ledger: LEDGER_FILE.to_string(),
            fail_on_checksum_mismatch: true,
        }
    }
}

/// A loaded project: configuration plus resolved paths.
#[derive(Debug, Clone)]
pub struct Project {
    /// Loaded configuration
    pub config: Config,
    /// Directory relative paths resolve against
    pub root: PathBuf,
    /// Resolved schema directory
    pub schema_dir: PathBuf,
    /// Resolved entity search path
    pub models_dir: PathBuf,
}

impl Project {
    /// Load the project for the current directory and global options.
    ///
    /// An explicit `--config` must exist; the default `vorm.toml` may be
    /// absent, in which case defaults apply.
    pub fn load(global: &GlobalArgs) -> CliResult<Self> {
        let cwd = std::env::current_dir()?;
        let (config, root) = match &global.config {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
                let root = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.clone());
                (Config::load(path)?, root)
            }
            None => {
                let path = cwd.join(CONFIG_FILE_NAME);
                let config = if path.is_file() {
                    Config::load(&path)?
                } else {
                    Config::default()
                };
                (config, cwd.clone())
            }
        };

        let schema_dir = global
            .schema_dir
            .clone()
            .unwrap_or_else(|| root.join(&config.paths.schema_dir));
        let models_dir = global
            .models_dir
            .clone()
            .unwrap_or_else(|| root.join(&config.paths.models));

        debug!(
            root = %root.display(),
            schema_dir = %schema_dir.display(),
            models_dir = %models_dir.display(),
            "resolved project paths"
        );
        Ok(Self {
            config,
            root,
            schema_dir,
            models_dir,
        })
    }

    /// Migration manager for this project.
    pub fn manager(&self) -> MigrationManager {
        MigrationManager::new(
            MigrationConfig::new()
                .schema_dir(&self.schema_dir)
                .models_dir(&self.models_dir)
                .fail_on_checksum_mismatch(self.config.migrations.fail_on_checksum_mismatch),
        )
    }

    /// Path of the local catalog file.
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.config.store.catalog)
    }

    /// Path of the ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(&self.config.migrations.ledger)
    }

    /// Open the local catalog.
    pub fn catalog(&self) -> CliResult<LocalCatalog> {
        Ok(LocalCatalog::open(self.catalog_path())?)
    }

    /// Open the ledger.
    pub fn ledger(&self) -> FileLedger {
        FileLedger::new(self.ledger_path())
    }
}

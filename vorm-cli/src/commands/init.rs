//! `vorm init` command - Initialize a new vorm project.

use std::path::Path;

use crate::cli::InitArgs;
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::CliResult;
use crate::output::{self, success};

/// File name of the generated example entity
const EXAMPLE_FILE_NAME: &str = "rule.vorm";

const EXAMPLE_ENTITY: &str = r#"// Entities declared here are picked up by `vorm migrate generate`.

abstract entity Timestamped {
    created_at Int64
}

entity Rule extends Timestamped {
    @@collection("rules")

    id          String(100) @primary
    type        String(50)
    description String(1000)
    embedding   FloatVector(1536)
}
"#;

/// Run the init command
pub fn run(args: InitArgs) -> CliResult<()> {
    output::header("Initialize vorm Project");

    let project_path = args.path.as_path();
    std::fs::create_dir_all(project_path)?;

    let config_path = project_path.join(CONFIG_FILE_NAME);
    if config_path.exists() && !args.force {
        output::warn(&format!(
            "Project already initialized. {} exists (use --force to overwrite).",
            CONFIG_FILE_NAME
        ));
        return Ok(());
    }

    let config = Config::default();
    config.save(&config_path)?;
    output::list_item(&format!("Created {}", CONFIG_FILE_NAME));

    create_project_structure(project_path, &config)?;

    if !args.no_example {
        let example_path = project_path
            .join(&config.paths.models)
            .join(EXAMPLE_FILE_NAME);
        if example_path.exists() {
            output::list_item(&format!("Kept existing {}", example_path.display()));
        } else {
            std::fs::write(&example_path, EXAMPLE_ENTITY)?;
            output::list_item(&format!("Created {}", example_path.display()));
        }
    }

    output::newline();
    success("Project initialized");

    output::newline();
    output::section("Next steps");
    output::list_item("Declare entities in the models directory");
    output::list_item("Run `vorm migrate init` to create the migration history collection");
    output::list_item("Run `vorm migrate generate <name>` to create the first migration");

    Ok(())
}

fn create_project_structure(root: &Path, config: &Config) -> CliResult<()> {
    let schema_dir = root.join(&config.paths.schema_dir);
    std::fs::create_dir_all(schema_dir.join("history"))?;
    std::fs::create_dir_all(schema_dir.join("migrations"))?;
    std::fs::create_dir_all(root.join(&config.paths.models))?;
    Ok(())
}

//! `vorm version` command - Display version information.

use vorm_schema::DataType;

use crate::error::CliResult;
use crate::output::{self, kv};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const FIELD_TYPES: [DataType; 8] = [
    DataType::String,
    DataType::Int64,
    DataType::Float32,
    DataType::Float64,
    DataType::Bool,
    DataType::Json,
    DataType::FloatVector,
    DataType::Array,
];

/// Run the version command
pub fn run() -> CliResult<()> {
    output::header(&format!("vorm {}", VERSION));

    kv("Version", VERSION);
    kv("Build", if cfg!(debug_assertions) { "debug" } else { "release" });
    kv(
        "Types",
        &FIELD_TYPES
            .iter()
            .map(DataType::as_tag)
            .collect::<Vec<_>>()
            .join(", "),
    );

    output::newline();
    output::section("Components");
    kv("schema", &format!("vorm-schema {}", VERSION));
    kv("migrate", &format!("vorm-migrate {}", VERSION));

    Ok(())
}

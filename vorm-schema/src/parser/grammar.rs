//! Pest grammar parser for `.vorm` declaration files.

use pest_derive::Parser;

/// The entity declaration parser.
#[derive(Parser)]
#[grammar = "parser/vorm.pest"]
pub struct VormParser;

//! vorm CLI - Command-line interface for the vorm vector ORM.
//!
//! This crate provides the CLI tool for managing vorm projects:
//! scaffolding, migration generation, and migration application.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

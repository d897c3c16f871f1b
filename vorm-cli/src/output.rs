//! Terminal rendering for command results.
//!
//! Everything except [`error`] goes to stdout.

use std::io::{self, BufRead, Write};

use owo_colors::OwoColorize;
use vorm_migrate::{ChangeSet, Operation};

/// Command title, underlined.
pub fn header(title: &str) {
    let rule = "─".repeat(title.chars().count());
    println!("\n{}\n{}\n", title.bold().cyan(), rule.dimmed());
}

/// Group title inside a command's output.
pub fn section(title: &str) {
    println!("{}", title.bold());
}

pub fn kv(key: &str, value: &str) {
    println!("  {:<10} {}", format!("{}:", key).dimmed(), value);
}

pub fn success(message: &str) {
    println!("{} {}", "✔".green().bold(), message.green());
}

pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Failure line on stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", "✖".red().bold(), message.red());
}

pub fn list_item(text: &str) {
    println!("  {} {}", "•".dimmed(), text);
}

pub fn newline() {
    println!();
}

pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}

/// Migration ID of an applied artifact.
pub fn style_success(id: &str) -> String {
    id.green().to_string()
}

/// Migration ID of a pending artifact.
pub fn style_pending(id: &str) -> String {
    id.yellow().to_string()
}

/// Field-level changes of one entity: `+` added, `-` removed, `~` modified.
pub fn change_set(change: &ChangeSet) {
    if change.initial {
        dim("    new collection");
    }
    for field in &change.added {
        println!("    {} {}", "+".green().bold(), field);
    }
    for field in &change.removed {
        println!("    {} {}", "-".red().bold(), field);
    }
    for field in &change.modified {
        println!(
            "    {} {} {} {}",
            "~".yellow().bold(),
            field.old,
            "→".dimmed(),
            field.new
        );
    }
}

/// A procedure, one operation per block.
pub fn operations(ops: &[Operation]) {
    if ops.is_empty() {
        dim("      (no operations)");
    }
    for op in ops {
        for line in op.to_string().lines() {
            println!("      {}", line.bright_white());
        }
    }
}

/// Yes/no prompt on stdin; defaults to no.
pub fn confirm(question: &str) -> bool {
    print!("{} {} ", question, "[y/N]".dimmed());
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

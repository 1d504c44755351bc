//! Help text generation.

use crate::argument::Argument;
use crate::parser::Parser;

/// Usage line shown when no program name is set.
const USAGE: &str = "<argument>=<value> <flag>";
/// Gap between the key column and the help column.
const COLUMN_GAP: usize = 2;
const INDENT: &str = "  ";

/// Left column for one argument: `-s, --long` plus `*` when required.
fn key_column(arg: &Argument) -> String {
    let mut column = format!("-{}", arg.short_key());
    if !arg.long_key().is_empty() {
        column.push_str(", --");
        column.push_str(arg.long_key());
    }
    if arg.is_required() {
        column.push('*');
    }
    column
}

/// Generate the full help text for a parser.
///
/// Arguments are listed in registration order, followed by the built-in
/// `-h, --help` entry, the required legend (if any argument is required)
/// and the description (if set).
pub fn generate_help(parser: &Parser) -> String {
    let mut rows: Vec<(String, &str)> = parser
        .arguments()
        .iter()
        .map(|arg| (key_column(arg), arg.help_text()))
        .collect();
    rows.push(("-h, --help".to_string(), "Shows this help message"));

    let width = rows
        .iter()
        .map(|(keys, _)| keys.chars().count())
        .max()
        .unwrap_or(0);

    let mut help = String::new();
    match parser.program_name() {
        Some(name) => help.push_str(&format!("Usage: {} {}\n", name, USAGE)),
        None => help.push_str(&format!("Usage: {}\n", USAGE)),
    }
    help.push('\n');
    help.push_str("Available arguments:\n\n");

    for (keys, text) in &rows {
        let line = format!(
            "{}{:<width$}{}",
            INDENT,
            keys,
            text,
            width = width + COLUMN_GAP
        );
        help.push_str(line.trim_end());
        help.push('\n');
    }
    help.push('\n');

    if parser.arguments().iter().any(Argument::is_required) {
        help.push_str("Arguments marked with * are required and have to be set.\n\n");
    }

    if let Some(description) = parser.description().filter(|d| !d.is_empty()) {
        help.push_str(description);
        help.push('\n');
    }

    help
}

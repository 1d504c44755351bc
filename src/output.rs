//! Sourceable shell files: exports for parsed values, or help/error text.

use crate::config::Binding;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Heredoc delimiter for help text.
const HELP_DELIMITER: &str = "CAPE_HELP";

/// Quote a value for a shell single-quoted context.
///
/// Everything between single quotes is literal, so the only character that
/// needs work is the quote itself: `'` becomes `'\''`.
fn quote_shell_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Render one `export` line per binding, in declaration order.
pub fn generate_output_string(bindings: &[Binding], prefix: &str) -> String {
    let mut output = String::new();
    for binding in bindings {
        output.push_str(&format!(
            "export {}{}={}\n",
            prefix,
            binding.name,
            quote_shell_value(&binding.value.render())
        ));
    }
    output
}

/// Write the export statements to a temporary file and return its path.
///
/// The file is kept after the process exits so a shell can source it.
pub fn generate_output(bindings: &[Binding], prefix: &str) -> Result<PathBuf> {
    write_temp_file(&generate_output_string(bindings, prefix))
}

/// Script that prints the help text and exits the sourcing shell with 1.
pub fn generate_help_output_string(help_text: &str) -> String {
    format!(
        "cat <<'{delimiter}'\n{text}{delimiter}\nexit 1\n",
        delimiter = HELP_DELIMITER,
        text = help_text
    )
}

/// Script that prints `message` to stderr, then the help text, then exits with 1.
pub fn generate_error_output_string(message: &str, help_text: &str) -> String {
    format!(
        "echo {} >&2\n{}",
        quote_shell_value(message),
        generate_help_output_string(help_text)
    )
}

/// Write the help script to a temporary file and return its path.
pub fn generate_help_output(help_text: &str) -> Result<PathBuf> {
    write_temp_file(&generate_help_output_string(help_text))
}

/// Write the error script to a temporary file and return its path.
pub fn generate_error_output(message: &str, help_text: &str) -> Result<PathBuf> {
    write_temp_file(&generate_error_output_string(message, help_text))
}

/// Write content to a temporary file and return its path.
fn write_temp_file(content: &str) -> Result<PathBuf> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    let path = file.into_temp_path().keep()?;
    Ok(path)
}

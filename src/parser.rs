//! Argument registry and the parsing algorithm.

use crate::argument::Argument;
use crate::help::generate_help;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::process;
use thiserror::Error;
use tracing::{debug, trace};

/// Exit status used when help is shown or parsing fails.
pub const EXIT_FAILURE: i32 = 1;

/// Errors that can occur while registering an argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("short key must not be empty")]
    EmptyShortKey,

    #[error("invalid short key '{0}': must be a single character other than '-' or '='")]
    InvalidShortKey(String),

    #[error("invalid long key '{0}': must have at least two characters, no leading '-' and no '='")]
    InvalidLongKey(String),

    #[error("short key '{0}' is already registered")]
    DuplicateShortKey(char),

    #[error("long key '{0}' is already registered")]
    DuplicateLongKey(String),
}

/// Errors that can occur during argument parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid argument '{token}': {reason}")]
    Syntax { token: String, reason: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("missing required arguments: {}", .0.join(", "))]
    UnmetRequired(Vec<String>),
}

/// Outcome of a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// All tokens were applied (or there were none).
    Done,
    /// The first token was `-h` or `--help`.
    Help,
}

/// Registry of arguments.
#[derive(Debug, Default)]
pub struct Parser {
    args: Vec<Argument>,
    by_short: HashMap<char, usize>,
    aliases: HashMap<String, char>,
    description: Option<String>,
    program_name: Option<String>,
}

impl Parser {
    /// Create a parser with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free text printed at the end of the help output.
    pub fn set_description(&mut self, text: &str) {
        self.description = Some(text.to_string());
    }

    /// Set the program name printed in the usage line.
    pub fn set_program_name(&mut self, name: &str) {
        self.program_name = Some(name.to_string());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    /// Registered arguments in registration order.
    pub fn arguments(&self) -> &[Argument] {
        &self.args
    }

    pub fn argument(&self, short_key: char) -> Option<&Argument> {
        self.by_short.get(&short_key).map(|&i| &self.args[i])
    }

    pub fn argument_by_long(&self, long_key: &str) -> Option<&Argument> {
        self.aliases
            .get(long_key)
            .and_then(|short| self.argument(*short))
    }

    /// Register a new argument and return it for further configuration.
    ///
    /// `long_key` may be empty. `short_key` must be exactly one character.
    pub fn register(
        &mut self,
        long_key: &str,
        short_key: &str,
        help: &str,
    ) -> Result<&mut Argument, RegisterError> {
        let mut chars = short_key.chars();
        let short = match (chars.next(), chars.next()) {
            (None, _) => return Err(RegisterError::EmptyShortKey),
            (Some(c), None) if c != '-' && c != '=' => c,
            _ => return Err(RegisterError::InvalidShortKey(short_key.to_string())),
        };

        if !long_key.is_empty() {
            if long_key.chars().count() < 2 || long_key.starts_with('-') || long_key.contains('=')
            {
                return Err(RegisterError::InvalidLongKey(long_key.to_string()));
            }
            if self.aliases.contains_key(long_key) {
                return Err(RegisterError::DuplicateLongKey(long_key.to_string()));
            }
        }

        if self.by_short.contains_key(&short) {
            return Err(RegisterError::DuplicateShortKey(short));
        }

        let index = self.args.len();
        self.args.push(Argument::new(long_key, short, help));
        self.by_short.insert(short, index);
        if !long_key.is_empty() {
            self.aliases.insert(long_key.to_string(), short);
        }

        debug!(short = %short, long = long_key, "registered argument");
        Ok(&mut self.args[index])
    }

    /// Parse `tokens` and write their values into the registered arguments.
    ///
    /// An empty token list is accepted as-is, without checking required
    /// arguments. The first malformed or unknown token stops the scan; values
    /// applied before it are kept.
    pub fn parse<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<ParseOutcome, ParseError> {
        let Some(first) = tokens.first() else {
            debug!("no arguments given");
            return Ok(ParseOutcome::Done);
        };

        if matches!(first.as_ref(), "-h" | "--help") {
            debug!("help requested");
            return Ok(ParseOutcome::Help);
        }

        let mut pending: HashSet<char> = self
            .args
            .iter()
            .filter(|a| a.is_required())
            .map(Argument::short_key)
            .collect();

        let tokens = expand_combined(tokens);
        debug!(?tokens, "expanded combined flags");

        for token in &tokens {
            let (key, value) = split_token(token)?;
            let short = self.resolve(key)?;
            let index = self.by_short[&short];

            self.args[index].apply_raw_value(value.unwrap_or("true"));
            pending.remove(&short);

            trace!(token = %token, short = %short, "applied argument");
        }

        if !pending.is_empty() {
            let missing: Vec<String> = self
                .args
                .iter()
                .filter(|a| pending.contains(&a.short_key()))
                .map(Argument::display_name)
                .collect();
            debug!(?missing, "required arguments not set");
            return Err(ParseError::UnmetRequired(missing));
        }

        Ok(ParseOutcome::Done)
    }

    /// Parse `tokens`; on help or failure print help and exit with status 1.
    pub fn parse_or_exit<S: AsRef<str>>(&mut self, tokens: &[S]) {
        match self.parse(tokens) {
            Ok(ParseOutcome::Done) => {}
            Ok(ParseOutcome::Help) => self.exit_with_help(),
            Err(err) => {
                debug!(error = %err, "argument parsing failed");
                eprintln!("{}", err);
                self.exit_with_help();
            }
        }
    }

    fn exit_with_help(&self) -> ! {
        if let Err(err) = self.show_help() {
            debug!(error = %err, "failed to write help");
        }
        process::exit(EXIT_FAILURE)
    }

    /// Parse the arguments of the running process (program name excluded).
    pub fn parse_env(&mut self) {
        let tokens: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.parse_or_exit(&tokens);
    }

    /// Help text for this parser.
    pub fn render_help(&self) -> String {
        generate_help(self)
    }

    /// Write the help text to `out`.
    pub fn write_help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.render_help().as_bytes())?;
        out.flush()
    }

    /// Print the help text to stdout.
    pub fn show_help(&self) -> io::Result<()> {
        self.write_help(&mut io::stdout().lock())
    }

    /// Map a truncated key to a registered short key.
    fn resolve(&self, key: &str) -> Result<char, ParseError> {
        let mut chars = key.chars();
        let short = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => *self
                .aliases
                .get(key)
                .ok_or_else(|| ParseError::UnknownArgument(format!("--{}", key)))?,
        };

        if !self.by_short.contains_key(&short) {
            return Err(ParseError::UnknownArgument(format!("-{}", short)));
        }
        Ok(short)
    }
}

/// Split every combined short flag token (`-abc`) into single flags
/// (`-a -b -c`). Other tokens pass through unchanged and in order.
pub fn expand_combined<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.as_ref();
        match combined_flags(token) {
            Some(flags) => expanded.extend(flags.chars().map(|c| format!("-{}", c))),
            None => expanded.push(token.to_string()),
        }
    }
    expanded
}

/// The flag characters of a combined token, if `token` is one.
fn combined_flags(token: &str) -> Option<&str> {
    let rest = token.strip_prefix('-')?;
    if rest.starts_with('-') || token.contains('=') || rest.chars().count() < 2 {
        return None;
    }
    Some(rest)
}

/// Strip the dashes from a key: `--foo` gives `foo`, `-f` gives `f`.
///
/// Long keys need at least two characters and short keys exactly one, so
/// `--f` and `-foo` are rejected, as is anything without a leading dash.
pub fn truncate(key: &str) -> Result<&str, ParseError> {
    if let Some(rest) = key.strip_prefix("--") {
        return match rest.chars().count() {
            0 => Err(syntax(key, "a double dash needs a key after it")),
            1 => Err(syntax(
                key,
                &format!("long keys need at least two characters, did you mean -{}?", rest),
            )),
            _ => Ok(rest),
        };
    }

    if key == "-" {
        return Err(syntax(key, "a lone dash is not an argument"));
    }

    match key.strip_prefix('-') {
        Some(rest) if rest.chars().count() == 1 => Ok(rest),
        _ => Err(syntax(key, "expected -<short> or --<long>")),
    }
}

/// Split a token into its truncated key and optional `=value` part.
fn split_token(token: &str) -> Result<(&str, Option<&str>), ParseError> {
    let (key_part, value) = match token.split_once('=') {
        Some((k, v)) => (k, Some(v)),
        None => (token, None),
    };

    let key = truncate(key_part)?;
    if key.starts_with('-') {
        return Err(syntax(key_part, "keys must not start with a dash"));
    }
    Ok((key, value))
}

fn syntax(token: &str, reason: &str) -> ParseError {
    ParseError::Syntax {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

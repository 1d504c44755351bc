//! JSON declaration of an argument set, used by the `cape` binary.

use crate::argument::Slot;
use crate::parser::{Parser, RegisterError};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Prefix for exported variables when none is configured.
pub const DEFAULT_PREFIX: &str = "CAPE_";

/// Errors that can occur during config parsing and building.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("cannot register argument '{name}': {source}")]
    Register {
        name: String,
        #[source]
        source: RegisterError,
    },

    #[error("argument '{0}' does not map to a shell variable name: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidVarName(String),

    #[error("arguments '{0}' and '{1}' both export {2}")]
    DuplicateVarName(String, String, String),
}

/// Which value slot an argument is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// The string slot (default)
    #[default]
    String,
    /// The integer slot
    Int,
    /// The boolean slot
    Bool,
}

/// Declaration of a single argument.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgConfig {
    /// Short key, a single character (e.g. "v" for -v)
    pub short: String,
    /// Long key (e.g. "verbose" for --verbose)
    #[serde(default)]
    pub long: Option<String>,
    /// Help text for this argument
    #[serde(default)]
    pub help: Option<String>,
    /// Whether this argument has to be given
    #[serde(default)]
    pub required: bool,
    /// Raw value applied before parsing
    pub default: Option<String>,
    /// Slot exported for this argument
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
}

impl ArgConfig {
    /// Name used for the exported variable: the long key, or the short key.
    pub fn var_name(&self) -> &str {
        match self.long.as_deref() {
            Some(long) if !long.is_empty() => long,
            _ => &self.short,
        }
    }

    /// Shell variable suffix: uppercased `var_name` with hyphens as underscores.
    pub fn shell_var_name(&self) -> Result<String, ConfigError> {
        let name = self.var_name();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::InvalidVarName(name.to_string()));
        }
        Ok(name.to_uppercase().replace('-', "_"))
    }
}

/// Top-level declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Program name shown in the usage line
    pub name: Option<String>,
    /// Text shown at the end of the help output
    pub description: Option<String>,
    /// Environment variable prefix (default: "CAPE_")
    pub prefix: Option<String>,
    /// Argument declarations, in help order
    #[serde(default)]
    pub args: Vec<ArgConfig>,
}

/// Handle to the declared slot of one argument.
#[derive(Debug, Clone)]
pub enum BoundValue {
    Str(Slot<String>),
    Int(Slot<i64>),
    Bool(Slot<bool>),
}

impl BoundValue {
    /// Current value as text.
    pub fn render(&self) -> String {
        match self {
            BoundValue::Str(slot) => slot.get(),
            BoundValue::Int(slot) => slot.get().to_string(),
            BoundValue::Bool(slot) => slot.get().to_string(),
        }
    }
}

/// A declared argument's variable name and value handle.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Variable name without prefix, e.g. `DRY_RUN`
    pub name: String,
    pub value: BoundValue,
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Register every declared argument, in order, on a new parser.
    pub fn build(&self) -> Result<(Parser, Vec<Binding>), ConfigError> {
        let mut parser = Parser::new();
        if let Some(ref name) = self.name {
            parser.set_program_name(name);
        }
        if let Some(ref description) = self.description {
            parser.set_description(description);
        }

        let mut bindings = Vec::with_capacity(self.args.len());
        let mut exported: HashSet<String> = HashSet::new();
        for arg_config in &self.args {
            let var_name = arg_config.shell_var_name()?;
            if !exported.insert(var_name.clone()) {
                let first = self
                    .args
                    .iter()
                    .find(|a| a.shell_var_name().ok().as_deref() == Some(var_name.as_str()))
                    .map(|a| a.var_name().to_string())
                    .unwrap_or_default();
                return Err(ConfigError::DuplicateVarName(
                    first,
                    arg_config.var_name().to_string(),
                    var_name,
                ));
            }

            let arg = parser
                .register(
                    arg_config.long.as_deref().unwrap_or(""),
                    &arg_config.short,
                    arg_config.help.as_deref().unwrap_or(""),
                )
                .map_err(|source| ConfigError::Register {
                    name: arg_config.var_name().to_string(),
                    source,
                })?;

            if arg_config.required {
                arg.required();
            }
            if let Some(ref default) = arg_config.default {
                arg.default_value(default);
            }

            let value = match arg_config.value_type {
                ValueType::String => BoundValue::Str(arg.as_string()),
                ValueType::Int => BoundValue::Int(arg.as_int()),
                ValueType::Bool => BoundValue::Bool(arg.as_bool()),
            };
            bindings.push(Binding {
                name: var_name,
                value,
            });
        }

        Ok((parser, bindings))
    }

    /// Get the effective prefix, using the default if none is set.
    pub fn effective_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "name": "myscript",
            "description": "My awesome script",
            "prefix": "MYAPP_",
            "args": [
                {"short": "v", "long": "verbose", "type": "bool", "help": "Enable verbose output"},
                {"short": "n", "long": "count", "type": "int", "required": true, "default": "3"},
                {"short": "o", "help": "Output file"}
            ]
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.name, Some("myscript".to_string()));
        assert_eq!(config.description, Some("My awesome script".to_string()));
        assert_eq!(config.prefix, Some("MYAPP_".to_string()));
        assert_eq!(config.args.len(), 3);

        let verbose = &config.args[0];
        assert_eq!(verbose.short, "v");
        assert_eq!(verbose.long, Some("verbose".to_string()));
        assert_eq!(verbose.value_type, ValueType::Bool);
        assert!(!verbose.required);

        let count = &config.args[1];
        assert_eq!(count.value_type, ValueType::Int);
        assert!(count.required);
        assert_eq!(count.default, Some("3".to_string()));

        let output = &config.args[2];
        assert_eq!(output.value_type, ValueType::String);
        assert_eq!(output.var_name(), "o");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_json("{}").unwrap();
        assert!(config.name.is_none());
        assert!(config.args.is_empty());
        assert_eq!(config.effective_prefix(), "CAPE_");
    }

    #[test]
    fn test_error_on_bad_json() {
        let result = Config::from_json(r#"{"args": [{"long": "no-short"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_build_registers_in_order() {
        let config = Config::from_json(
            r#"{"name": "demo", "description": "Demo", "args": [
                {"short": "a", "long": "alpha", "required": true},
                {"short": "b"}
            ]}"#,
        )
        .unwrap();

        let (parser, bindings) = config.build().unwrap();
        let keys: Vec<char> = parser.arguments().iter().map(|a| a.short_key()).collect();
        assert_eq!(keys, vec!['a', 'b']);
        assert!(parser.argument('a').unwrap().is_required());
        assert_eq!(parser.program_name(), Some("demo"));
        assert_eq!(parser.description(), Some("Demo"));
        assert_eq!(bindings[0].name, "ALPHA");
        assert_eq!(bindings[1].name, "B");
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = Config::from_json(
            r#"{"args": [
                {"short": "n", "type": "int", "default": "42"},
                {"short": "q", "type": "bool", "default": "true"}
            ]}"#,
        )
        .unwrap();

        let (_, bindings) = config.build().unwrap();
        assert_eq!(bindings[0].value.render(), "42");
        assert_eq!(bindings[1].value.render(), "true");
    }

    #[test]
    fn test_build_bindings_follow_parse() {
        let config = Config::from_json(
            r#"{"args": [{"short": "n", "long": "num", "type": "int"}]}"#,
        )
        .unwrap();

        let (mut parser, bindings) = config.build().unwrap();
        parser.parse(&["--num=7"]).unwrap();
        assert_eq!(bindings[0].value.render(), "7");
    }

    #[test]
    fn test_build_rejects_duplicate_short() {
        let config = Config::from_json(
            r#"{"args": [{"short": "a", "long": "one"}, {"short": "a", "long": "two"}]}"#,
        )
        .unwrap();

        let result = config.build();
        assert!(matches!(
            result,
            Err(ConfigError::Register {
                source: RegisterError::DuplicateShortKey('a'),
                ..
            })
        ));
    }

    #[test]
    fn test_build_rejects_long_short_key() {
        let config = Config::from_json(r#"{"args": [{"short": "ab"}]}"#).unwrap();
        let err = config.build().unwrap_err();
        assert!(err.to_string().contains("'ab'"), "{}", err);
    }

    #[test]
    fn test_shell_var_name_maps_hyphens() {
        let config =
            Config::from_json(r#"{"args": [{"short": "d", "long": "dry-run"}]}"#).unwrap();
        assert_eq!(config.args[0].shell_var_name().unwrap(), "DRY_RUN");
    }

    #[test]
    fn test_build_rejects_invalid_var_name() {
        for json in [
            r#"{"args": [{"short": "."}]}"#,
            r#"{"args": [{"short": "a", "long": "out.file"}]}"#,
        ] {
            let result = Config::from_json(json).unwrap().build();
            assert!(
                matches!(result, Err(ConfigError::InvalidVarName(_))),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_build_rejects_colliding_var_names() {
        let config = Config::from_json(
            r#"{"args": [
                {"short": "a", "long": "dry-run"},
                {"short": "b", "long": "dry_run"}
            ]}"#,
        )
        .unwrap();

        let err = config.build().unwrap_err();
        match err {
            ConfigError::DuplicateVarName(first, second, var) => {
                assert_eq!(first, "dry-run");
                assert_eq!(second, "dry_run");
                assert_eq!(var, "DRY_RUN");
            }
            other => panic!("Expected DuplicateVarName, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_case_only_difference() {
        let config =
            Config::from_json(r#"{"args": [{"short": "a"}, {"short": "A"}]}"#).unwrap();
        assert!(matches!(
            config.build(),
            Err(ConfigError::DuplicateVarName(..))
        ));
    }
}

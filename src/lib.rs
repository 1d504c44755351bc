//! cape - a small command-line argument parser.
//!
//! Arguments are registered with a mandatory one-character short key and an
//! optional long key. Parsing accepts `-s`, `-s=value`, `--long`,
//! `--long=value` and combined short flags (`-abc`), and stores every value
//! into up to three typed slots (string, integer, boolean) at once.
//!
//! ```
//! use cape::{ParseOutcome, Parser};
//!
//! let mut parser = Parser::new();
//! let count = parser.register("count", "c", "How many").unwrap().required().as_int();
//! let verbose = parser.register("verbose", "v", "Talk more").unwrap().as_bool();
//!
//! assert_eq!(parser.parse(&["--count=3", "-v"]), Ok(ParseOutcome::Done));
//! assert_eq!(count.get(), 3);
//! assert!(verbose.get());
//! ```

pub mod argument;
pub mod config;
pub mod help;
pub mod output;
pub mod parser;

pub use argument::{Argument, Slot, Value};
pub use config::{ArgConfig, Binding, BoundValue, Config, ConfigError, ValueType};
pub use help::generate_help;
pub use output::{
    generate_error_output, generate_help_output, generate_output, generate_output_string,
};
pub use parser::{
    expand_combined, truncate, ParseError, ParseOutcome, Parser, RegisterError, EXIT_FAILURE,
};

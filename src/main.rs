//! cape - parse script arguments from a JSON declaration.

use anyhow::{Context, Result};
use cape::{
    generate_error_output, generate_help_output, generate_output, Config, ParseOutcome,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Parse arguments declared in JSON and export them for a shell script.
#[derive(Parser, Debug)]
#[command(name = "cape", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse script arguments and output environment variables
    Parse {
        /// JSON declaration of the script's arguments
        #[arg(long)]
        config: String,

        /// Environment variable prefix (overrides config)
        #[arg(long)]
        prefix: Option<String>,

        /// Arguments to parse for the target script
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help text for the target script
    Help {
        /// JSON declaration of the script's arguments
        #[arg(long)]
        config: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CAPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            config,
            prefix,
            args,
        } => {
            let cfg = Config::from_json(&config).context("failed to parse config JSON")?;
            let (mut parser, bindings) = cfg.build().context("invalid config")?;

            let effective_prefix = prefix.as_deref().unwrap_or_else(|| cfg.effective_prefix());

            let path = match parser.parse(&args) {
                Ok(ParseOutcome::Done) => generate_output(&bindings, effective_prefix)
                    .context("failed to generate output file")?,
                Ok(ParseOutcome::Help) => generate_help_output(&parser.render_help())
                    .context("failed to generate help file")?,
                Err(err) => {
                    tracing::debug!(error = %err, "argument parsing failed");
                    generate_error_output(&err.to_string(), &parser.render_help())
                        .context("failed to generate error file")?
                }
            };

            println!("{}", path.display());
        }
        Commands::Help { config } => {
            let cfg = Config::from_json(&config).context("failed to parse config JSON")?;
            let (parser, _) = cfg.build().context("invalid config")?;
            print!("{}", parser.render_help());
        }
    }

    Ok(())
}

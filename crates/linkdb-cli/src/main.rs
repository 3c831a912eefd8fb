//! linkdb CLI
//!
//! Command-line interface for the linkdb bookmark datastore.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use linkdb_core::{Config, LinkFilter, LinkStore, StoreError};

mod commands;
mod output;

use commands::link::NewLink;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "linkdb")]
#[command(about = "linkdb - single-file bookmark datastore")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Act as the logged-in owner (see private links, allow changes)
    #[arg(long, global = true, env = "LINKDB_LOGGED_IN")]
    logged_in: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all links, newest first
    #[command(alias = "ls")]
    List,
    /// Show a link by key
    Show {
        /// Link key (YYYYMMDD_HHMMSS)
        key: String,
    },
    /// Save a new link (or update the link with this URL)
    Add {
        /// URL to save
        url: String,
        /// Title (defaults to the URL)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Tags to add
        #[arg(short, long)]
        tag: Vec<String>,
        /// Only visible when logged in
        #[arg(short, long, conflicts_with = "public")]
        private: bool,
        /// Visible to everyone (undoes --private)
        #[arg(long)]
        public: bool,
    },
    /// Delete a link by key
    #[command(alias = "rm")]
    Delete {
        /// Link key (YYYYMMDD_HHMMSS)
        key: String,
    },
    /// Full-text search over title, description, URL and tags
    Search {
        /// Search query (matched as one substring)
        query: String,
    },
    /// List tags with counts, or links carrying every given tag
    Tags {
        /// Required tags, space or comma separated
        #[arg(short, long)]
        filter: Option<String>,
        /// Match tag case exactly
        #[arg(long, requires = "filter")]
        case_sensitive: bool,
    },
    /// Links saved on a day
    Day {
        /// Day as YYYYMMDD
        day: String,
    },
    /// List days that have links
    Days,
    /// Look up a link by permalink token
    Hash {
        /// Permalink token
        hash: String,
    },
    /// Show datastore status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, hide_public_links, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        if let Some(hint) = recovery_hint(&err) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = LinkStore::open_with_config(&config, cli.logged_in)
        .with_context(|| format!("Failed to open datastore {:?}", config.datastore_path()))?;
    debug!("Opened datastore with {} visible links", store.len());

    match cli.command {
        Commands::List => commands::link::list(&store, &output),
        Commands::Show { key } => commands::link::show(&store, &key, &output),
        Commands::Add {
            url,
            title,
            description,
            tag,
            private,
            public,
        } => commands::link::add(
            &mut store,
            NewLink {
                url,
                title,
                description,
                tags: tag,
                private: privacy_flag(private, public),
            },
            &output,
        ),
        Commands::Delete { key } => commands::link::delete(&mut store, &key, &output),
        Commands::Search { query } => {
            commands::query::filter(&store, LinkFilter::Text(query), &output)
        }
        Commands::Tags {
            filter: Some(expr),
            case_sensitive,
        } => commands::query::filter(
            &store,
            LinkFilter::Tags {
                expr,
                case_sensitive,
            },
            &output,
        ),
        Commands::Tags { filter: None, .. } => commands::query::tags(&store, &output),
        Commands::Day { day } => commands::query::filter(&store, LinkFilter::Day(day), &output),
        Commands::Days => commands::query::days(&store, &output),
        Commands::Hash { hash } => {
            commands::query::filter(&store, LinkFilter::Hash(hash), &output)
        }
        Commands::Status => commands::status::show(&store, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// `Some` only when a privacy flag was given
fn privacy_flag(private: bool, public: bool) -> Option<bool> {
    match (private, public) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Recovery suggestion for the first store error in the chain
fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>())
        .and_then(StoreError::recovery_suggestion)
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level. Logs go
/// to `config.log_file` when configured, stderr otherwise.
fn init_logging(config: &Config, verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("linkdb_core={},linkdb_cli={}", log_level, log_level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore error if already initialized
    let _ = match &config.log_file {
        Some(path) => match File::create(path) {
            Ok(file) => builder.with_ansi(false).with_writer(file).try_init(),
            Err(e) => {
                eprintln!("Warning: Could not create log file {:?}: {}", path, e);
                builder.with_writer(std::io::stderr).try_init()
            }
        },
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_flag() {
        assert_eq!(privacy_flag(false, false), None);
        assert_eq!(privacy_flag(true, false), Some(true));
        assert_eq!(privacy_flag(false, true), Some(false));
    }

    #[test]
    fn test_add_flags_parse() {
        let cli = Cli::try_parse_from(["linkdb", "add", "https://a.example", "--public"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Add {
                private: false,
                public: true,
                ..
            }
        ));

        assert!(
            Cli::try_parse_from(["linkdb", "add", "https://a.example", "--private", "--public"])
                .is_err()
        );
    }

    #[test]
    fn test_recovery_hint_found_through_context() {
        let err = anyhow::Error::new(StoreError::Unauthorized {
            operation: "modify links",
        })
        .context("Failed to add link");
        assert_eq!(recovery_hint(&err), Some("Log in and retry the operation."));

        let err = anyhow::Error::new(StoreError::Validation("empty url".to_string()))
            .context("Failed to add link");
        assert_eq!(recovery_hint(&err), None);

        assert_eq!(recovery_hint(&anyhow::anyhow!("Link not found: x")), None);
    }
}

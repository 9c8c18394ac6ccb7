//! `intake` is the intake form client.
//!
//! Fill the form field by field (each edit is kept as a local draft), check
//! it, submit it, and browse what the service stored.

mod commands;
mod config;

use clap::{Parser, Subcommand};

use commands::{form, remote};

/// Intake CLI tool.
#[derive(Parser, Debug)]
#[command(name = "intake", about = "Intake form client")]
struct Cli {
    /// Path to client config file (default: ~/.intake/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show or change client settings.
    Config {
        /// Service base URL.
        #[arg(long)]
        server: Option<String>,
        /// Total submit attempts.
        #[arg(long)]
        retries: Option<u32>,
        /// Pause between submit attempts, in milliseconds.
        #[arg(long)]
        retry_delay_ms: Option<u64>,
    },

    /// Edit or inspect the local form.
    Form {
        #[command(subcommand)]
        action: FormAction,
    },

    /// Check one value against a field's rules.
    Validate {
        /// Field name (e.g. erCode or er-code).
        field: String,
        value: String,
    },

    /// Submit the current form.
    Submit,

    /// List stored submissions, newest first.
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Get one submission.
    Get { id: String },

    /// Delete one submission.
    Delete {
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Check server status.
    Status,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum FormAction {
    /// Set one field and save the draft.
    Set { field: String, value: String },
    /// Show every field with its validation.
    Show,
    /// Discard the draft.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.output == "json";

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let mut client_config = config::ClientConfig::load(&config_path)?;

    match cli.command {
        Commands::Config {
            server,
            retries,
            retry_delay_ms,
        } => {
            let changed = server.is_some() || retries.is_some() || retry_delay_ms.is_some();
            if let Some(server) = server {
                client_config.server = server;
            }
            if let Some(retries) = retries {
                client_config.retries = retries;
            }
            if let Some(ms) = retry_delay_ms {
                client_config.retry_delay_ms = ms;
            }
            if changed {
                client_config.save(&config_path)?;
                println!("Saved {}", config_path.display());
            }
            print!("{}", toml::to_string_pretty(&client_config)?);
        }

        Commands::Form { action } => {
            let mut state = form::open_state(&client_config)?;
            match action {
                FormAction::Set { field, value } => {
                    let field = form::parse_field(&field)?;
                    println!("{}", form::set(&mut state, field, &value)?);
                }
                FormAction::Show => {
                    println!("{}", form::show(&state, json_output)?);
                }
                FormAction::Clear => {
                    form::clear(&mut state)?;
                    println!("Draft cleared.");
                }
            }
        }

        Commands::Validate { field, value } => {
            let field = form::parse_field(&field)?;
            let (ok, message) = form::check(field, &value);
            if ok {
                println!("{} ok", field.label());
            } else {
                println!("{}", message);
                std::process::exit(1);
            }
        }

        Commands::Submit => {
            let state = form::open_state(&client_config)?;
            let client = remote::build_client(&client_config)?;
            let outcome = remote::submit(state, client).await;
            println!("{}", remote::render_outcome(&outcome, json_output)?);
            if !outcome.success {
                std::process::exit(1);
            }
        }

        Commands::List { page, limit } => {
            let client = remote::build_client(&client_config)?;
            remote::list(&client, page, limit, json_output).await?;
        }

        Commands::Get { id } => {
            let client = remote::build_client(&client_config)?;
            remote::get(&client, &id).await?;
        }

        Commands::Delete { id, yes } => {
            if !yes {
                eprint!("Delete submission {}? [y/N]: ", id);
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let client = remote::build_client(&client_config)?;
            remote::delete(&client, &id).await?;
        }

        Commands::Status => {
            remote::status(&client_config).await?;
        }

        Commands::Version => {
            println!("intake cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

use anyhow::Context;
use bookshelf_app::StoreBackend;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book records service
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate the database and serve the HTTP API
    Serve {
        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
        /// Keep records in memory instead of Postgres
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply pending migrations and exit
    Migrate,
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve {
            host,
            port,
            in_memory,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            let backend = if in_memory {
                StoreBackend::InMemory
            } else {
                StoreBackend::Postgres
            };
            bookshelf_app::serve(settings, backend).await
        }
        Command::Migrate => {
            let applied = bookshelf_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
            Ok(())
        }
        Command::Config => {
            settings.database.url = settings.database.redacted_url();
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from(["bookshelf", "serve", "--port", "9000", "--in-memory"]);
        match cli.command {
            Command::Serve {
                host,
                port,
                in_memory,
            } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
                assert!(in_memory);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}

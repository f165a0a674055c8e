//! Lazuli CLI - ATProto firehose consumer and record client.

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Lazuli - ATProto firehose and XRPC client
#[derive(Parser, Debug)]
#[command(name = "lazuli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// XRPC base URL
    #[arg(long, env = "XRPC_URL", global = true)]
    xrpc_url: Option<String>,

    /// Firehose WebSocket URL
    #[arg(long, env = "WS_URL", global = true)]
    ws_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Account used by commands that need a session
#[derive(Args, Debug)]
struct Credentials {
    /// Handle, DID or email
    #[arg(short, long, env = "IDENTIFIER")]
    identifier: String,

    /// Account or app password
    #[arg(short, long, env = "PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Consume the firehose and log every commit event
    Firehose {
        /// Stop after this many events
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Create a session and print the account
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Repost a record
    Repost {
        #[command(flatten)]
        credentials: Credentials,
        /// AT URI of the record
        uri: String,
        /// CID of the record
        cid: String,
    },

    /// Like a record
    Like {
        #[command(flatten)]
        credentials: Credentials,
        /// AT URI of the record
        uri: String,
        /// CID of the record
        cid: String,
    },

    /// Fetch posts by AT URI
    Posts {
        #[command(flatten)]
        credentials: Credentials,
        /// Up to 25 post URIs
        #[arg(required = true)]
        uris: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lazuli={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = commands::config(cli.xrpc_url, cli.ws_url);

    let result = match cli.command {
        Commands::Firehose { limit } => commands::firehose(config, limit).await,
        Commands::Login { credentials } => {
            commands::login(config, &credentials.identifier, &credentials.password).await
        }
        Commands::Repost {
            credentials,
            uri,
            cid,
        } => {
            commands::repost(config, &credentials.identifier, &credentials.password, &uri, &cid)
                .await
        }
        Commands::Like {
            credentials,
            uri,
            cid,
        } => {
            commands::like(config, &credentials.identifier, &credentials.password, &uri, &cid)
                .await
        }
        Commands::Posts { credentials, uris } => {
            commands::posts(config, &credentials.identifier, &credentials.password, &uris).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

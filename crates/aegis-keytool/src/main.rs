/*!
 * Aegis key tool
 *
 * Operator commands for tenant key material and tokens:
 * 1. Generate fresh seeds for a key file
 * 2. Print the key ids a tenant's seeds derive to
 * 3. Mint a client access token for a caller
 * 4. Decode or verify a token
 * 5. Run a relationship check with a token
 *
 * Usage:
 *   aegis-keytool generate --count 2 >> keys/svc-1.keys
 *   aegis-keytool inspect svc-1
 *   aegis-keytool issue svc-1
 *   aegis-keytool decode <token> --verify
 *   aegis-keytool check <token> owner doc 42
 */

mod commands;
mod config;
mod source;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aegis-keytool")]
#[command(about = "Manage tenant seeds and inspect aegis tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of `<id>.keys` files (overrides AEGIS_KEYS_DIR)
    #[arg(short, long, global = true)]
    keys_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random seeds, one hex line each
    Generate {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Print the signing and encryption key ids of a tenant
    Inspect {
        /// Tenant id
        id: String,
    },
    /// Mint a client access token signed by the caller's key
    Issue {
        /// Caller (service) id
        caller_id: String,

        /// Audience override
        #[arg(short, long)]
        audience: Option<String>,
    },
    /// Print the claims and key id of a token
    Decode {
        token: String,

        /// Verify the signature and decrypt user info
        #[arg(short, long)]
        verify: bool,
    },
    /// Ask the authorization service whether a token's subject holds a relation
    Check {
        token: String,
        relation: String,
        object_type: String,
        object_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegis=info,aegis_keytool=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.keys_dir {
        config.keys_dir = dir;
    }

    match cli.command {
        Commands::Generate { count } => commands::keys::generate(count)?,

        Commands::Inspect { id } => commands::keys::inspect(&config, &id).await?,

        Commands::Issue {
            caller_id,
            audience,
        } => commands::tokens::issue(&config, &caller_id, audience).await?,

        Commands::Decode { token, verify } => {
            commands::tokens::decode(&config, &token, verify).await?
        }

        Commands::Check {
            token,
            relation,
            object_type,
            object_id,
        } => commands::check::check(&config, &token, &relation, &object_type, &object_id).await?,
    }

    Ok(())
}

// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, build a client, dispatch.
// - Returns `anyhow::Result` so any failure prints its chain and exits
//   non-zero.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pinata_cli::credentials::CredentialStore;
use pinata_cli::types::{Credential, ListQuery, PinStatus};
use pinata_cli::ui::{self, ConsoleReporter};
use pinata_cli::PinataClient;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pinata")]
#[command(version)]
#[command(
    about = "A CLI for uploading files to Pinata. Create an API key at https://app.pinata.cloud/keys, then authorize with the auth command"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize the CLI with your Pinata JWT
    #[command(alias = "a")]
    Auth {
        /// Your Pinata JWT; prompted for when omitted
        jwt: Option<String>,
    },
    /// Upload a file or folder to Pinata
    #[command(alias = "u")]
    Upload { path: PathBuf },
    /// List most recent files
    #[command(alias = "l")]
    List {
        /// Search files by CID
        #[arg(short, long)]
        cid: Option<String>,
        /// Number of files to return, max 1000
        #[arg(short, long, default_value_t = 10)]
        amount: u32,
        /// The name of the file
        #[arg(short, long)]
        name: Option<String>,
        /// Status of the file
        #[arg(short, long, value_enum, default_value_t = PinStatus::Pinned)]
        status: PinStatus,
        /// Offset for paging through results
        #[arg(short, long)]
        page_offset: Option<u32>,
    },
    /// Delete a file by CID
    #[command(alias = "d")]
    Delete {
        cid: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = PinataClient::from_env().context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Auth { jwt } => {
            let jwt = match jwt {
                Some(jwt) => jwt,
                None => ui::prompt_jwt()?,
            };
            let credential = Credential::new(jwt);
            if credential.is_empty() {
                bail!("no jwt supplied");
            }
            client.store().save(&credential)?;
            let status = client
                .test_authentication(&credential)
                .context("Failed to test authentication")?;
            ui::print_auth_result(status);
        }
        Commands::Upload { path } => {
            client
                .upload(&path, &ConsoleReporter)
                .with_context(|| format!("Upload of {} failed", path.display()))?;
        }
        Commands::List {
            cid,
            amount,
            name,
            status,
            page_offset,
        } => {
            let query = ListQuery {
                page_limit: amount,
                cid,
                name,
                status,
                page_offset,
            };
            let pins = client.list(&query).context("Failed to list files")?;
            println!();
            ui::print_pins(&pins)?;
        }
        Commands::Delete { cid, yes } => {
            if cid.trim().is_empty() {
                bail!("no CID provided");
            }
            // Fail on a missing token before asking anything.
            client.store().load()?;
            if !yes && !ui::confirm_delete(&cid)? {
                return Ok(());
            }
            client.delete(&cid).context("Failed to delete file")?;
            ui::print_deleted(&cid);
        }
    }
    Ok(())
}

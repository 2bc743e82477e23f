//! `apikey`: provision tenant credentials from the command line.

use clap::Subcommand;
use uuid::Uuid;

use crate::services::api_key_service::{self, CreateApiKey};
use crate::storage::CredentialStore;

#[derive(Subcommand, Debug)]
pub enum ApiKeyCommand {
    /// Create a key and print it once
    Create {
        #[arg(long)]
        name: String,

        /// Comma separated: soccer, basketball or *
        #[arg(long)]
        sports: String,

        /// Requests per minute
        #[arg(long, default_value_t = 100)]
        rate_limit: i32,

        #[arg(long)]
        expires_in_days: Option<u32>,
    },

    /// List keys (prefixes only)
    List,

    /// Deactivate a key
    Revoke { id: Uuid },
}

pub async fn run(store: &dyn CredentialStore, command: ApiKeyCommand) -> anyhow::Result<()> {
    match command {
        ApiKeyCommand::Create {
            name,
            sports,
            rate_limit,
            expires_in_days,
        } => {
            let (key, plaintext) = api_key_service::create_api_key(
                store,
                CreateApiKey {
                    name,
                    sports,
                    rate_limit,
                    expires_in_days,
                },
            )
            .await?;

            println!("Created API key '{}' ({})", key.name, key.id);
            println!("  sports:     {}", key.sports.join(","));
            println!("  rate limit: {}/min", key.rate_limit);
            if let Some(expires_at) = key.expires_at {
                println!("  expires at: {expires_at}");
            }
            println!();
            println!("{plaintext}");
            println!();
            println!("Store this key now; it cannot be shown again.");
        }
        ApiKeyCommand::List => {
            let keys = store.list_credentials().await?;
            if keys.is_empty() {
                println!("No API keys");
                return Ok(());
            }

            println!(
                "{:<36}  {:<12}  {:<8}  {:<18}  {:>6}  NAME",
                "ID", "PREFIX", "STATUS", "SPORTS", "RPM"
            );
            for key in keys {
                let status = if !key.is_active {
                    "revoked"
                } else if key.is_expired(chrono::Utc::now()) {
                    "expired"
                } else {
                    "active"
                };
                println!(
                    "{:<36}  {:<12}  {:<8}  {:<18}  {:>6}  {}",
                    key.id,
                    key.key_prefix,
                    status,
                    key.sports.join(","),
                    key.rate_limit,
                    key.name
                );
            }
        }
        ApiKeyCommand::Revoke { id } => {
            api_key_service::revoke_api_key(store, id).await?;
            println!("Revoked API key {id}");
        }
    }

    Ok(())
}

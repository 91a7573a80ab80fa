//! Hash-password command - prints a hash suitable for the user store

use std::io::BufRead;

use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::user::create_hasher;

#[derive(Args, Debug)]
pub struct HashPasswordArgs {
    /// Password to hash; read from stdin when omitted
    #[arg(long)]
    pub password: Option<String>,

    /// bcrypt cost, overriding the configured one
    #[arg(long)]
    pub cost: Option<u32>,
}

/// Print the hash of the given (or piped) password
pub async fn run(args: HashPasswordArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();

    let password = match args.password {
        Some(password) => password,
        None => read_password(std::io::stdin().lock())?,
    };

    let hash = hash_password(&config, &password, args.cost).await?;
    println!("{}", hash);

    Ok(())
}

async fn hash_password(
    config: &AppConfig,
    password: &str,
    cost: Option<u32>,
) -> anyhow::Result<String> {
    anyhow::ensure!(!password.is_empty(), "password must not be empty");

    let hasher = create_hasher(
        config.auth.password_scheme,
        cost.unwrap_or(config.auth.bcrypt_cost),
    )?;
    let password = password.to_string();

    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
    Ok(hash)
}

fn read_password(mut reader: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::user::{BcryptHasher, PasswordHasher};

    #[test]
    fn test_read_password_strips_newline() {
        let input = b"pw 123\r\nignored\n";
        assert_eq!(read_password(&input[..]).unwrap(), "pw 123");
    }

    #[tokio::test]
    async fn test_hash_password_uses_cost_override() {
        let config = AppConfig::default();

        let hash = hash_password(&config, "pw123", Some(4)).await.unwrap();

        assert!(hash.starts_with("$2b$04$"));
        assert!(BcryptHasher::with_cost(4).verify("pw123", &hash));
    }

    #[tokio::test]
    async fn test_hash_password_rejects_cost_out_of_range() {
        let config = AppConfig::default();
        assert!(hash_password(&config, "pw123", Some(40)).await.is_err());
    }

    #[tokio::test]
    async fn test_hash_password_rejects_empty() {
        let config = AppConfig::default();
        assert!(hash_password(&config, "", Some(4)).await.is_err());
    }
}

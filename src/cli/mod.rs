//! CLI module for the auth BFF
//!
//! - `serve`: run the HTTP service
//! - `hash-password`: print a password hash for seeding the user store

pub mod hash_password;
pub mod serve;

use clap::{Parser, Subcommand};

/// Auth BFF - credential login, token validation and profile access
#[derive(Parser)]
#[command(name = "auth-bff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Hash a password with the configured scheme
    HashPassword(hash_password::HashPasswordArgs),
}

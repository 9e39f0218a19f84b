use clap::Subcommand;
use misenplace_core::{hash_secret, Config};

use super::{sign_in, Session};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the digest to store for a password
    Hash {
        /// Password to hash
        secret: String,
    },
    /// Check the --user/--password credentials
    Check,
}

pub fn run(action: AuthAction, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Hash { secret } => {
            println!("{}", hash_secret(&secret));
        }
        AuthAction::Check => {
            let config = Config::load()?;
            match sign_in(&config, session)? {
                Some(principal) => println!("signed in as {}", principal.name),
                None => println!("sign-in disabled"),
            }
        }
    }
    Ok(())
}

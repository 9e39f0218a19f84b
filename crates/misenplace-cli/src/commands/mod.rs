pub mod auth;
pub mod config;
pub mod log;
pub mod task;

use misenplace_core::storage::data_dir;
use misenplace_core::{Authenticator, Config, Principal, StaticAuthenticator, TaskLifecycleController};

/// Credentials supplied on the command line or through the environment.
pub struct Session {
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Load config and build the controller over the configured files.
pub fn open_controller() -> Result<(Config, TaskLifecycleController), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let controller = TaskLifecycleController::from_config(&config, &data_dir()?);
    Ok((config, controller))
}

/// Sign in with the session credentials.
///
/// Returns `None` when sign-in is disabled and no name was given. When a
/// password is required, missing credentials are an error.
pub fn sign_in(config: &Config, session: &Session) -> Result<Option<Principal>, Box<dyn std::error::Error>> {
    let auth = StaticAuthenticator::new(config.auth.clone());
    match (&session.user, auth.requires_secret()) {
        (None, false) => Ok(None),
        (None, true) => Err("sign-in required: pass --user and --password".into()),
        (Some(user), requires_secret) => {
            let secret = match (&session.password, requires_secret) {
                (Some(p), _) => p.as_str(),
                (None, false) => "",
                (None, true) => return Err("sign-in required: pass --password".into()),
            };
            Ok(Some(auth.authenticate(user, secret)?))
        }
    }
}

// src/utils/env.rs
use log::debug;

/// Loads variables from a `.env` file into the process environment. Already
/// set variables win over file values.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found, using process environment"),
    }
}

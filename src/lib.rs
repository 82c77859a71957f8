//! Album Shuffle Library
//!
//! This library provides the pieces of a small Spotify companion: a backend
//! that performs the OAuth authorization-code flow and keeps the resulting
//! tokens in a server-side session, and a player client that shuffles the
//! saved album library and steps through it album by album.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the backend routes
//! - `cli` - Command-line front end for the server and the player
//! - `config` - Configuration management and environment variables
//! - `error` - The crate wide error type
//! - `management` - Sessions, the auth service and persisted client state
//! - `player` - Queue controller, token keeper and the cache they share
//! - `server` - Router construction and the HTTP server loop
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Shuffling and session id helpers
//!
//! # Example
//!
//! ```
//! use albumshuffle::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> albumshuffle::Res<()> {
//!     config::load_env().await?;
//!     let state = server::AppState::from_config(config::Config::from_env()?)?;
//!     server::start_api_server(state).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod player;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate reports an [`Error`], whose variants
/// map onto the user facing failure categories (unauthenticated, failed code
/// exchange, failed refresh, failed library fetch) plus the ambient I/O and
/// decoding failures.
///
/// # Example
///
/// ```
/// use albumshuffle::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Loaded {} albums", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal startup failures such as a missing configuration
/// value. Request handlers and background tasks report through
/// [`warning!`] instead and keep running.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues: failed upstream calls, quarantined upstream
/// records, background refreshes that will be retried on the next tick.
///
/// # Example
///
/// ```
/// warning!("Token refresh failed, retrying on next heartbeat: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

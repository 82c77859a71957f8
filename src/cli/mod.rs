//! # CLI Module
//!
//! The terminal front end of Album Shuffle. One function per subcommand; each
//! builds the pieces it needs from the environment, reports progress with the
//! crate's logging macros and exits through [`crate::error!`] only when there
//! is nothing useful left to do.
//!
//! ## Commands
//!
//! ### Backend
//!
//! - [`serve`] - Runs the HTTP backend until Ctrl-C
//!
//! ### Session
//!
//! - [`login`] - Opens the Spotify login in the browser
//! - [`logout`] - Ends the backend session and forgets the local queue
//!
//! ### Player
//!
//! - [`show`] - Prints the current album and the ones after it
//! - [`next`] / [`prev`] - Steps through the shuffled albums
//! - [`reload`] - Fetches the library again and reshuffles
//! - [`token`] - Prints the access token, or keeps it fresh with `--watch`
//!
//! ## Usage Patterns
//!
//! ```bash
//! albumshuffle serve                       # start the backend
//! albumshuffle login                       # log in through the browser
//! export ALBUMSHUFFLE_SESSION=...          # cookie value from the browser
//! albumshuffle player show                 # current album and what follows
//! albumshuffle player next
//! albumshuffle player reload
//! albumshuffle token --watch
//! ```
//!
//! The queue lives in `<data_local_dir>/albumshuffle/state/player.json`, so
//! the position survives between invocations. The album library is fetched
//! again once it is older than a day.

mod player;
mod serve;
mod session;
mod token;

pub use player::DEFAULT_WINDOW;
pub use player::next;
pub use player::prev;
pub use player::reload;
pub use player::show;
pub use serve::serve;
pub use session::login;
pub use session::logout;
pub use token::token;

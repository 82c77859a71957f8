//! # API Module
//!
//! HTTP handlers for the Album Shuffle backend, built on
//! [Axum](https://docs.rs/axum). Each handler is a thin adapter: it reads the
//! session cookie, calls into [`crate::management::AuthService`] or
//! [`crate::spotify::library`], and lets [`crate::Error`] pick the status.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`auth_url`] - `GET /api/auth`, the Spotify authorization URL as a JSON string
//! - [`callback`] - `GET /api/auth/callback`, code exchange, session cookie, redirect to the player
//! - [`token`] - `GET /api/auth/token`, the current access token, refreshed when lapsed
//! - [`logout`] - `GET /api/auth/logout`, destroys the session
//!
//! ### Library
//!
//! - [`albums`] - `GET /api/albums`, the saved-album library
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`, status and version
//!
//! ## Security Considerations
//!
//! - The refresh token never leaves the server; only the access token is served
//! - The session cookie is `HttpOnly`, `SameSite=Lax`, and `Secure` in production
//! - Unauthenticated calls get a bare 401 so the client can show its login

mod albums;
mod auth;
pub mod cookies;
mod health;

pub use albums::albums;
pub use auth::auth_url;
pub use auth::callback;
pub use auth::logout;
pub use auth::token;
pub use health::health;

mod auth;
mod session;
mod state;

pub use auth::AuthService;
pub use auth::CallbackOutcome;
pub use auth::SESSION_TTL_DAYS;
pub use session::FileSessionStore;
pub use session::MemorySessionStore;
pub use session::SessionStore;
pub use state::ClientStateStore;
pub use state::STATE_TYPE_PLAYER;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub const SESSION_ID_LEN: usize = 64;

/// Shuffles `items` in place with the thread-local generator.
pub fn shuffle<T>(items: &mut [T]) {
    shuffle_with(items, &mut rand::rng());
}

/// Backward Fisher-Yates walk: for each `i` from the end down to 1, swap
/// with a uniformly drawn `j` in `0..=i`.
pub fn shuffle_with<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Session ids travel in a cookie, so only accept what we hand out.
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == SESSION_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Store key for a session id: the raw id never reaches the session store.
pub fn session_key(secret: &str, session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b":");
    hasher.update(session_id.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

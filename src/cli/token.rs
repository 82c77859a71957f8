use std::sync::Arc;

use chrono::Utc;

use crate::{
    error, info,
    player::{ApiClient, TokenKeeper},
    success,
    types::AccessToken,
    warning,
};

pub async fn token(watch: bool) {
    let mut keeper = TokenKeeper::new(Arc::new(ApiClient::from_env()));

    if !watch {
        match keeper.get().await {
            Ok(Some(token)) => print_token(&token),
            Ok(None) => error!("Not logged in. Run albumshuffle login."),
            Err(e) => error!("Cannot fetch access token: {}", e),
        }
        return;
    }

    let mut updates = keeper.subscribe();
    keeper.start();
    info!("Keeping the access token fresh, press Ctrl-C to stop");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                match updates.borrow_and_update().clone() {
                    Some(token) => print_token(&token),
                    None => warning!("Session lost. Run albumshuffle login."),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    keeper.stop();
    info!("Stopped");
}

fn print_token(token: &AccessToken) {
    let minutes = token
        .expires_in(Utc::now())
        .map(|left| left.as_secs() / 60)
        .unwrap_or(0);
    success!(
        "{} (expires {} in {} min)",
        token.value,
        token.expires_at.to_rfc3339(),
        minutes
    );
}

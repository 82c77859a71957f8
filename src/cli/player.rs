use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    Error, error, info,
    management::ClientStateStore,
    player::{ApiClient, QueueController},
    success,
    types::QueueTableRow,
    warning,
};

/// Albums listed by `player show` unless asked otherwise.
pub const DEFAULT_WINDOW: usize = 5;

const MOBILE_NOTICE: &str = "To listen on another device, open the Spotify app there and select it from the web player's Connect menu.";

pub async fn show(count: usize) {
    let queue = open_queue().await;
    load(&queue, false).await;

    if !queue.seen_mobile_notice().await {
        info!("{}", MOBILE_NOTICE);
        queue.mark_mobile_notice_seen().await;
    }

    print_window(&queue, count).await;
}

pub async fn next() {
    let queue = open_queue().await;
    load(&queue, false).await;

    if !queue.advance().await {
        warning!("Already at the last album. Run albumshuffle player reload to reshuffle.");
    }
    print_window(&queue, 2).await;
}

pub async fn prev() {
    let queue = open_queue().await;
    load(&queue, false).await;

    if !queue.retreat().await {
        warning!("Already at the first album.");
    }
    print_window(&queue, 2).await;
}

pub async fn reload() {
    let queue = open_queue().await;
    load(&queue, true).await;
    print_window(&queue, DEFAULT_WINDOW).await;
}

async fn open_queue() -> QueueController {
    let client = ApiClient::from_env();
    if !client.has_session() {
        warning!("ALBUMSHUFFLE_SESSION is not set. Run albumshuffle login first.");
    }

    QueueController::restore(Arc::new(client), ClientStateStore::default_location()).await
}

async fn load(queue: &QueueController, force: bool) {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching saved albums...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = if force {
        queue.reload().await.map(Some)
    } else {
        queue.ensure_loaded().await.map(|_| None)
    };
    pb.finish_and_clear();

    match result {
        Ok(Some(count)) => success!("Shuffled {} albums", count),
        Ok(None) => {}
        Err(Error::Unauthenticated) => error!("Not logged in. Run albumshuffle login."),
        Err(e) => warning!("Cannot load albums, keeping the previous queue: {}", e),
    }
}

async fn print_window(queue: &QueueController, count: usize) {
    let total = queue.albums().await.len();
    if total == 0 {
        info!("Your library has no saved albums.");
        return;
    }

    let rows: Vec<QueueTableRow> = queue
        .upcoming(count)
        .await
        .into_iter()
        .map(|(i, album)| QueueTableRow {
            position: format!("{}/{}", i + 1, total),
            name: album.name,
            artist: album.artist,
            tracks: album.uris.len(),
        })
        .collect();

    if rows.is_empty() {
        info!(
            "End of the queue. Step back with albumshuffle player prev or reshuffle with albumshuffle player reload."
        );
        return;
    }

    println!("{}", Table::new(rows));
}

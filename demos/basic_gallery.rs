//! Basic gallery-style consumer example
//!
//! Simulates a scrolling image grid: each visible slot enqueues a thumbnail,
//! a scrolled-away slot re-enqueues with a new URL (superseding the old
//! request), and view teardown clears everything that is still pending.

use thumbnail_dl::{Config, ThumbnailDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Slots are identified by their grid position
    let downloader: ThumbnailDownloader<usize, _> =
        ThumbnailDownloader::over_http(Config::default())?;

    // Each time a thumbnail finishes downloading, display it
    downloader
        .set_listener(|slot: usize, image: image::DynamicImage| {
            println!(
                "[GRID] slot {slot} ready: {}x{} pixels",
                image.width(),
                image.height()
            );
        })
        .await;

    downloader.start().await?;

    // The visible page requests its thumbnails
    for slot in 0..8 {
        downloader
            .enqueue(slot, format!("https://picsum.photos/seed/{slot}/120/120"))
            .await?;
    }

    // The user scrolls: slot 3 now shows a different item. The old request
    // is superseded; if its fetch is still in flight the result is dropped.
    downloader
        .enqueue(3, "https://picsum.photos/seed/scrolled/120/120")
        .await?;

    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

    // The view goes away but the app keeps running: drop pending interest
    downloader.clear().await?;
    println!("view torn down, {} requests pending", downloader.pending().await);

    // App shutdown: terminate the worker entirely
    downloader.stop().await?;
    Ok(())
}

//! Multiple event subscribers example
//!
//! This example demonstrates how multiple parts of your application can
//! independently observe coordinator events while a single listener receives
//! the decoded images.

use thumbnail_dl::{Config, Event, ThumbnailDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let downloader: ThumbnailDownloader<u64, _> =
        ThumbnailDownloader::over_http(Config::default())?;

    downloader
        .set_listener(|id: u64, image: image::DynamicImage| {
            println!("[UI] thumbnail {id} ready ({}x{})", image.width(), image.height());
        })
        .await;

    // Logging subscriber - logs everything
    let mut log_events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = log_events.recv().await {
            println!("[LOG] Event: {event:?}");
        }
    });

    // Health subscriber - only cares about failures
    let mut failure_events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = failure_events.recv().await {
            match event {
                Event::FetchFailed { url, error, .. } => {
                    eprintln!("[HEALTH] fetch failed for {url}: {error}");
                }
                Event::DecodeFailed { url, error, .. } => {
                    eprintln!("[HEALTH] decode failed for {url}: {error}");
                }
                _ => {}
            }
        }
    });

    downloader.start().await?;

    downloader
        .enqueue(1, "https://picsum.photos/seed/one/96/96")
        .await?;
    downloader
        .enqueue(2, "https://invalid.example.invalid/two.png")
        .await?;

    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

    downloader.stop().await?;
    Ok(())
}

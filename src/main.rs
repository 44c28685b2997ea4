use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use futures_util::future::join_all;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use photoreel::application::{ImageCache, PhotoSession};
use photoreel::domain::entities::DISPLAY_WIDTH;
use photoreel::domain::{CancellationToken, HttpTransport, PhotoRecord};
use photoreel::infrastructure::{
    AppConfig, CliArgs, PicsumCatalogFetcher, ReqwestTransport, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn create_session(config: &AppConfig) -> Result<PhotoSession> {
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(config.request_timeout())?);
    let catalog = Arc::new(PicsumCatalogFetcher::new(
        Arc::clone(&transport),
        config.catalog.base_url.clone(),
    ));
    let images = ImageCache::with_config(transport, config.image_cache_config());

    Ok(PhotoSession::new(catalog, images, config.page_size()))
}

fn print_row(photo: &PhotoRecord, detail: &str) {
    println!(
        "{:>6}  {:<32} {}  {detail}",
        photo.id(),
        photo.author(),
        photo.size_label(DISPLAY_WIDTH)
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(&args);

    init_logging(&config)?;
    info!(
        version = photoreel::VERSION,
        endpoint = %config.catalog.base_url,
        page_size = config.page_size().get(),
        "Starting photoreel"
    );

    let session = create_session(&config)?;

    session.refresh().await?;
    for _ in 1..args.pages {
        if let Err(e) = session.load_next().await {
            warn!(error = %e, "Stopping after failed page load");
            break;
        }
    }

    let view = match args.search.as_deref() {
        Some(text) => session.confirm_search(text),
        None => session.current_view(),
    };
    if view.is_empty() {
        println!("No photos found");
        return Ok(());
    }

    if args.fetch_images {
        let token = CancellationToken::new();
        let outcomes = join_all(
            view.iter()
                .map(|photo| session.resolve_image(photo.image_key(), &token)),
        )
        .await;

        for (photo, outcome) in view.iter().zip(outcomes) {
            let detail = match outcome {
                Some(Ok(image)) => format!(
                    "{:?} {}x{}, {} bytes",
                    image.format(),
                    image.width(),
                    image.height(),
                    image.len()
                ),
                Some(Err(e)) => format!("failed: {e}"),
                None => "cancelled".to_string(),
            };
            print_row(photo, &detail);
        }
        info!("{}", session.images().stats());
    } else {
        for photo in &view {
            print_row(photo, photo.image_key());
        }
    }

    info!(
        shown = view.len(),
        page = session.state().current_page.get(),
        "Done"
    );
    Ok(())
}

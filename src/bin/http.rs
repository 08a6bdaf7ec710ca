#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use parking_lot::RwLock;
    use physio_tracker::{
        Clock, Config, LogNotifier, SystemClock, Tracker, http_api, quote::QuoteSource,
        reminder::ReminderTask,
    };
    use tracing::info;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("physio_tracker=info,http=info")),
        )
        .init();

    let config = Config::load()?;
    let addr: SocketAddr = config.server.addr.parse()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = config.open_store()?;
    let tracker = Tracker::open(store, clock.clone(), config.storage.seed_samples)?;
    let tracker = Arc::new(RwLock::new(tracker));
    info!(path = %config.storage.path.display(), "store opened");

    let reminders = config.reminders.enabled.then(|| {
        ReminderTask::new(
            tracker.clone(),
            clock.clone(),
            Arc::new(LogNotifier),
            config.reminders.tolerance(),
        )
        .spawn(config.reminders.poll_interval())
    });

    let state = http_api::AppState::with_shared(tracker, QuoteSource::from_config(&config.quotes));
    println!("physio-tracker HTTP API listening on http://{addr}");
    http_api::serve(addr, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    if let Some(reminders) = reminders {
        reminders.cancel().await;
    }
    info!("server stopped");
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}

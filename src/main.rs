use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use moonwatch::config::Config;
use moonwatch::data::alert::AlertStateTracker;
use moonwatch::data::channel::AlertChannelStore;
use moonwatch::data::credential::CredentialStore;
use moonwatch::data::structure::StructureCache;
use moonwatch::esi::EsiClient;
use moonwatch::notifier::LogNotifier;
use moonwatch::scheduler;
use moonwatch::service::alert::AlertScheduler;
use moonwatch::service::sync::StructureSyncer;
use moonwatch::service::token::TokenLifecycleManager;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let esi = match EsiClient::builder()
        .client_id(&config.client_id)
        .client_secret(&config.client_secret)
        .user_agent(&config.user_agent)
        .build()
    {
        Ok(esi) => Arc::new(esi),
        Err(e) => {
            eprintln!("Failed to build ESI client: {e}");
            std::process::exit(1);
        }
    };

    let (credentials, channels, cache, alerts) = match build_stores(&config) {
        Ok(stores) => stores,
        Err(e) => {
            eprintln!("Failed to open data directory: {e}");
            std::process::exit(1);
        }
    };

    let tokens = Arc::new(TokenLifecycleManager::new(credentials.clone(), esi.clone()));
    let syncer = Arc::new(StructureSyncer::new(tokens.clone(), esi, cache.clone()));
    let alert_scheduler = Arc::new(AlertScheduler::new(
        credentials.clone(),
        channels,
        syncer,
        cache,
        alerts,
        Arc::new(LogNotifier),
        config.rates,
    ));

    let handles = scheduler::spawn(
        tokens,
        credentials,
        alert_scheduler,
        config.refresh_interval,
        config.alert_interval,
    );

    tracing::info!("Moonwatch started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Shutting down");
    handles.abort();
}

type Stores = (
    Arc<CredentialStore>,
    Arc<AlertChannelStore>,
    Arc<StructureCache>,
    Arc<AlertStateTracker>,
);

fn build_stores(config: &Config) -> Result<Stores, moonwatch::error::store::StoreError> {
    Ok((
        Arc::new(CredentialStore::new(&config.data_dir)?),
        Arc::new(AlertChannelStore::new(&config.data_dir)?),
        Arc::new(StructureCache::new(&config.data_dir)?),
        Arc::new(AlertStateTracker::new(&config.data_dir)?),
    ))
}

use std::sync::Arc;

use crate::config::Config;
use fortacrypt_core::config::{MarketSettings, RecoveryConfig, SourceKind};
use fortacrypt_core::ohlc::OhlcStore;
use fortacrypt_core::recovery::{JsonFileStateStore, RecoveryStateStore};
use fortacrypt_market_data::{BudaSource, HttpPageFetcher, PageFetcher};
use fortacrypt_storage_sqlite::{db, OhlcRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub recovery_config: RecoveryConfig,
    pub ohlc_store: Arc<dyn OhlcStore>,
    pub state_store: Arc<dyn RecoveryStateStore>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("FORTACRYPT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let mut recovery_config = RecoveryConfig::load(&config.config_path)?;
    if let Some(markets) = &config.markets {
        recovery_config.retain_markets(markets)?;
    }
    tracing::info!(
        "Loaded configuration for {} markets from {}",
        recovery_config.markets.len(),
        config.config_path.display()
    );

    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let ohlc_store: Arc<dyn OhlcStore> = Arc::new(OhlcRepository::new(pool, writer));
    let state_store: Arc<dyn RecoveryStateStore> =
        Arc::new(JsonFileStateStore::new(&config.state_file));

    Ok(Arc::new(AppState {
        recovery_config,
        ohlc_store,
        state_store,
        db_path,
    }))
}

/// Builds the page fetcher for one market's source.
pub fn build_fetcher(settings: &MarketSettings) -> Arc<dyn PageFetcher> {
    match settings.source {
        SourceKind::Buda => Arc::new(HttpPageFetcher::new(BudaSource::new(
            settings.base_url.clone(),
            settings.page_size,
        ))),
    }
}

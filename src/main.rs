use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use site_api::{
    AppState, app,
    config::Config,
    infrastructure::PushoverNotifier,
    store::{ClickCounter, HourlyRateLimiter, SystemClock},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // config
    let config = Config::from_env().expect("Failed to load configuration");

    for file in [&config.cat_store_file, &config.rate_limit_store_file] {
        ensure_parent_dir(file);
    }

    // notifier
    let notifier = PushoverNotifier::new(&config).expect("Failed to build Pushover client");
    if config.pushover_api_token.is_none() || config.pushover_user_key.is_none() {
        tracing::warn!("Pushover credentials not set, pokes will fail");
    }

    // shared state
    let state = AppState {
        rate_limiter: Arc::new(HourlyRateLimiter::new(
            config.rate_limit_store_file.clone(),
            Arc::new(SystemClock),
        )),
        clicks: Arc::new(ClickCounter::new(config.cat_store_file.clone())),
        notifier: Arc::new(notifier),
        config: config.clone(),
    };

    tracing::info!(
        "Hourly limits: cat {}, poke {} (0 or less is unlimited)",
        config.cat_hourly_limit,
        config.poke_hourly_limit
    );

    // start server
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app(state),
    )
    .await
    .expect("Failed to start server");
}

fn ensure_parent_dir(file: &Path) {
    let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(dir) {
        // writes will fail and surface per request
        tracing::error!("Failed to create store directory {}: {}", dir.display(), e);
    }
}

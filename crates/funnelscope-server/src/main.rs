mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use funnelscope_adlib::AdLibraryClient;
use funnelscope_core::WeightedRules;
use funnelscope_synth::Synthesizer;

use crate::api::{build_app, AppState};
use crate::middleware::AuthState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(funnelscope_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Persistence is optional: without DATABASE_URL the service runs and
    // simply skips best-effort writes.
    let pool = match config.database_url.as_deref() {
        Some(url) => {
            let pool_config = funnelscope_db::PoolConfig {
                max_connections: config.db_max_connections,
                min_connections: config.db_min_connections,
                acquire_timeout_secs: config.db_acquire_timeout_secs,
            };
            let pool = funnelscope_db::connect_pool(url, pool_config).await?;
            funnelscope_db::run_migrations(&pool).await?;
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; persistence disabled");
            None
        }
    };

    let rules = match WeightedRules::load_or_default(&config.rules_path) {
        Ok(rules) => {
            if !config.rules_path.exists() {
                tracing::warn!(
                    path = %config.rules_path.display(),
                    "rules file not found; using embedded default ruleset"
                );
            }
            Arc::new(rules)
        }
        Err(e) => return Err(e.into()),
    };

    let adlib = match config.adlib_access_token.as_deref() {
        Some(token) => Some(Arc::new(AdLibraryClient::new(
            &config.adlib_base_url,
            token,
            config.fetch_timeout_secs,
        )?)),
        None => {
            tracing::warn!("ad library access token not set; ad search disabled");
            None
        }
    };

    let synth = Arc::new(Synthesizer::from_app_config(&config));

    let auth = AuthState::from_env(matches!(
        config.env,
        funnelscope_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            pool,
            synth,
            rules,
            adlib,
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "funnelscope server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

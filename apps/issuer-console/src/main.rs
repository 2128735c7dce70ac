// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use issuer_console::{
    api::router,
    backend::HttpBackend,
    blockchain::{LocalWallet, WalletAdapter},
    config::{ConsoleConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ConsoleConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Issuer console stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ConsoleConfig) -> Result<(), Box<dyn Error>> {
    let backend = HttpBackend::new(&config.api_base_url, Some(config.backend_timeout))?;

    let wallet: Option<Arc<dyn WalletAdapter>> = match &config.signer {
        Some(source) => {
            let wallet = LocalWallet::new(
                source.load()?,
                config.rpc_urls.clone(),
                config.wallet_chain,
                config.receipt_poll_interval,
            );
            info!(account = %wallet.address(), chain = %config.wallet_chain, "Self-custody wallet connected");
            let wallet: Arc<dyn WalletAdapter> = Arc::new(wallet);
            Some(wallet)
        }
        None => {
            warn!("No signer configured; self-custody operations are unavailable");
            None
        }
    };

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        Arc::new(backend),
        wallet,
        config.rewards_refresh_delay,
        shutdown.clone(),
    );
    let app = router(state);

    let addr: SocketAddr = config.bind_addr().parse()?;

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received");
        signal.cancel();
    });

    info!(
        backend = %config.api_base_url,
        tls = config.tls.is_some(),
        "Issuer console listening on {addr} (docs at /docs)"
    );

    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "rustls crypto provider was already installed")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tokio::select! {
                served = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()) => served?,
                _ = shutdown.cancelled() => {}
            }
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await?;
        }
    }

    info!("Issuer console shut down");
    Ok(())
}

mod config;
mod routes;

use std::fs::File;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::error;
use log::info;
use log::warn;
use simplelog::ColorChoice;
use simplelog::CombinedLogger;
use simplelog::Config;
use simplelog::SharedLogger;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;
use skyfare_lib::AmadeusClient;
use skyfare_lib::auth::AutoRefreshTokenProvider;
use skyfare_lib::auth::ClientCredentialsFlow;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ConfigError;
use crate::config::ServerConfig;
use crate::routes::AppState;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialize logger: {0}")]
    Logger(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] skyfare_lib::error::Error),
}

fn init_logging(config: &ServerConfig) -> Result<(), StartupError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        loggers.push(WriteLogger::new(
            config.log_level,
            Config::default(),
            File::create(path)?,
        ));
    }
    CombinedLogger::init(loggers).map_err(|e| StartupError::Logger(e.to_string()))
}

fn build_client(config: &ServerConfig) -> Result<AmadeusClient, StartupError> {
    let flow = ClientCredentialsFlow::from_credentials(
        &config.base_url,
        config.client_id.clone(),
        config.client_secret.clone(),
    )
    .map_err(skyfare_lib::error::Error::from)?;

    Ok(AmadeusClient::builder()
        .base_url(&config.base_url)
        .token_provider(AutoRefreshTokenProvider::new(flow))
        .build()?)
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    init_logging(&config)?;

    let state = AppState {
        client: build_client(&config)?,
        frontend_url: config.frontend_url.clone(),
    };

    let listener = TcpListener::bind(config.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
        shutdown.cancel();
    });

    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            },
        };

        let state = state.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req| routes::handle(req, state.clone()));
            let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
            tokio::pin!(conn);

            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(e) = result {
                        warn!("Connection from {} failed: {}", peer, e);
                    }
                }
                _ = cancel.cancelled() => {
                    conn.as_mut().graceful_shutdown();
                    let _ = conn.as_mut().await;
                }
            }
        });
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

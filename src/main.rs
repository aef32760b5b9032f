use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use contact_relay::{Config, Server, SmtpMailer, app};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal in production.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mailer = match SmtpMailer::new(&config.smtp) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            error!("failed to set up SMTP transport: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        allowed_origins = config.allowed_origins.len(),
        rate_limits = config.rate_limits.enabled,
        "configuration loaded"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    match Server::bind(addr).serve(app(&config, mailer)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}

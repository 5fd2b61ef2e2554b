use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, EmailConfig, ServerConfig};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::auth::{repo::SeaOrmAuthRepository, AuthConfig, AuthService};
use service::mail::{ConsoleMailer, DynMailer, SmtpMailer};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {}", cfg.host, cfg.port, e)))
}

/// SMTP when a host is configured, otherwise messages only go to the log.
pub fn build_mailer(cfg: &EmailConfig) -> Result<DynMailer, StartupError> {
    match &cfg.smtp_host {
        Some(host) => {
            let mailer = SmtpMailer::new(cfg).map_err(|e| StartupError::Mail(e.to_string()))?;
            info!(smtp_host = %host, port = cfg.smtp_port, "smtp mailer configured");
            Ok(Arc::new(mailer))
        }
        None => {
            warn!("no smtp host configured; verification emails are only logged");
            Ok(Arc::new(ConsoleMailer))
        }
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env()?;
    if cfg.security.uses_dev_secret() {
        warn!("SECRET_KEY not set; signing verification tokens with the development key");
    }

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let mailer = build_mailer(&cfg.email)?;
    let repo = Arc::new(SeaOrmAuthRepository::new(db));
    let auth = AuthService::new(repo, mailer, AuthConfig::from_settings(&cfg.security));
    let app: Router = routes::build_router(ServerState::new(auth), build_cors());

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_config() {
        let cfg = ServerConfig { host: "0.0.0.0".into(), port: 9000, worker_threads: None };
        assert_eq!(bind_addr(&cfg).unwrap().port(), 9000);

        let cfg = ServerConfig { host: "not a host".into(), port: 9000, worker_threads: None };
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }

    #[test]
    fn console_mailer_without_smtp_host() {
        assert!(build_mailer(&EmailConfig::default()).is_ok());
    }
}

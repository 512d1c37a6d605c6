//! Server binary: config, pool, migrations, provider wiring, serve.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trailbound_core::providers::{LogNotifier, MockPaymentGateway, Notifier, PaymentGateway};
use trailbound_core::Environment;
use trailbound_postgres::{run_migrations, stores};
use trailbound_web::auth::BearerUserAuthProvider;
use trailbound_web::images::FsImages;
use trailbound_web::notify::SmtpNotifier;
use trailbound_web::{router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    run_migrations(&pool).await?;

    let (tours, reviews, bookings, users) = stores(pool);
    let users = Arc::new(users);

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, "using smtp notifier");
            Arc::new(SmtpNotifier::new(smtp)?)
        }
        None => {
            tracing::info!("no smtp configured, emails go to the log");
            Arc::new(LogNotifier)
        }
    };

    let payments: Option<Arc<dyn PaymentGateway>> = if config.payments_enabled {
        Some(Arc::new(MockPaymentGateway))
    } else {
        tracing::warn!("payments disabled, checkout endpoints will answer 502");
        None
    };

    let env = Environment {
        tours: Arc::new(tours),
        reviews: Arc::new(reviews),
        bookings: Arc::new(bookings),
        users: users.clone(),
        auth: Arc::new(BearerUserAuthProvider::new(users)),
        notifier,
        images: Arc::new(FsImages::new(&config.image_dir)),
        payments,
    };

    let app = router(AppState::new(env, config.base_url.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

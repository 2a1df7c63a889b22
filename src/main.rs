use std::sync::Arc;

use sweeper::{appsettings::AppSettings, http, sweep::ReminderSweepJob};
use sweeper_push::WebPushDispatcher;
use sweeper_storage::sqlite::{self, SqliteReminderStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let settings = AppSettings::load()?;
    log::info!("Starting reminder service");

    let pool = sqlite::connect(&settings.database.url).await?;
    let store = Arc::new(SqliteReminderStore::new(pool));
    let dispatcher = Arc::new(WebPushDispatcher::configure(settings.vapid.clone())?);
    let job = Arc::new(ReminderSweepJob::new(store, dispatcher, &settings.app_url));

    let listener = TcpListener::bind((settings.server.host.as_str(), settings.server.port)).await?;
    http::serve(listener, http::router(job, settings.trigger.secret.clone())).await
}

fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();
}

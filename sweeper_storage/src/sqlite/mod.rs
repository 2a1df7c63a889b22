pub mod reminder_storage;

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub use reminder_storage::{SqliteReminderStore, SqliteStoreError};

/// Opens the pool for `database_url` and brings the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool, SqliteStoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Connected to reminder database");

    Ok(pool)
}

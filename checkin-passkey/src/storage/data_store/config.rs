//! Database connection and table configuration

use std::{env, str::FromStr, sync::LazyLock};
use tokio::sync::Mutex;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

static DATA_STORE_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("DATA_STORE_TYPE").expect("DATA_STORE_TYPE must be set"));

static DATA_STORE_URL: LazyLock<String> =
    LazyLock::new(|| env::var("DATA_STORE_URL").expect("DATA_STORE_URL must be set"));

pub(crate) static DATA_STORE: LazyLock<Mutex<Box<dyn DataStore>>> = LazyLock::new(|| {
    let store_type = DATA_STORE_TYPE.as_str();
    let store_url = DATA_STORE_URL.as_str();

    tracing::info!(
        "Initializing data store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store = match store_type {
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(store_url)
                .expect("Failed to parse SQLite connection string")
                .create_if_missing(true);

            Box::new(SqliteDataStore {
                pool: sqlx::sqlite::SqlitePool::connect_lazy_with(opts),
            }) as Box<dyn DataStore>
        }
        "postgres" => Box::new(PostgresDataStore {
            pool: sqlx::PgPool::connect_lazy(store_url).expect("Failed to create Postgres pool"),
        }) as Box<dyn DataStore>,
        t => panic!("Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"),
    };

    Mutex::new(store)
});

/// Table prefix from environment variable
static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "checkin_".to_string()));

pub(crate) static DB_TABLE_ADMIN_CREDENTIALS: LazyLock<String> =
    LazyLock::new(|| format!("{}admin_credentials", DB_TABLE_PREFIX.as_str()));

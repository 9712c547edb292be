use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres, Row, Sqlite, postgres::PgRow, sqlite::SqliteRow};

use crate::passkey::errors::PasskeyError;
use crate::passkey::types::StoredCredential;
use crate::storage::{DATA_STORE, DB_TABLE_ADMIN_CREDENTIALS};

/// Persistent store for admin passkey credentials.
///
/// Backed by the process-wide data store; all access goes through these
/// associated functions so nothing outside the passkey module touches the
/// table directly.
pub struct CredentialStore;

impl CredentialStore {
    pub(crate) async fn init() -> Result<(), PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            create_tables_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            create_tables_postgres(pool).await
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }

    /// Number of registered credentials. Zero means the system is still in
    /// bootstrap mode.
    pub(crate) async fn count() -> Result<i64, PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            count_credentials_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            count_credentials_postgres(pool).await
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }

    /// Upsert keyed by credential_id.
    pub(crate) async fn store_credential(credential: StoredCredential) -> Result<(), PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            store_credential_sqlite(pool, &credential).await
        } else if let Some(pool) = store.as_postgres() {
            store_credential_postgres(pool, &credential).await
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }

    pub(crate) async fn get_credential(
        credential_id: &str,
    ) -> Result<Option<StoredCredential>, PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_credential_sqlite(pool, credential_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_credential_postgres(pool, credential_id).await
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }

    /// All registered credentials, used to build the excludeCredentials and
    /// allowCredentials descriptor lists.
    pub(crate) async fn get_all_credentials() -> Result<Vec<StoredCredential>, PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_all_credentials_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            get_all_credentials_postgres(pool).await
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }

    /// Unconditional overwrite. The authentication ceremony rejects counter
    /// regressions before this is called.
    pub(crate) async fn update_credential_counter(
        credential_id: &str,
        counter: u32,
    ) -> Result<(), PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            update_credential_counter_sqlite(pool, credential_id, counter).await
        } else if let Some(pool) = store.as_postgres() {
            update_credential_counter_postgres(pool, credential_id, counter).await
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }

    #[cfg(test)]
    pub(crate) async fn delete_all_credentials() -> Result<(), PasskeyError> {
        let store = DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            sqlx::query(&format!(
                "DELETE FROM {}",
                DB_TABLE_ADMIN_CREDENTIALS.as_str()
            ))
            .execute(pool)
            .await
            .map_err(|e| PasskeyError::Storage(e.to_string()))?;
            Ok(())
        } else if let Some(pool) = store.as_postgres() {
            sqlx::query(&format!(
                "DELETE FROM {}",
                DB_TABLE_ADMIN_CREDENTIALS.as_str()
            ))
            .execute(pool)
            .await
            .map_err(|e| PasskeyError::Storage(e.to_string()))?;
            Ok(())
        } else {
            Err(PasskeyError::Storage("Unsupported database type".into()))
        }
    }
}

fn encode_transports(transports: &Option<Vec<String>>) -> Result<Option<String>, PasskeyError> {
    transports
        .as_ref()
        .map(|t| serde_json::to_string(t))
        .transpose()
        .map_err(|e| PasskeyError::Storage(e.to_string()))
}

fn decode_transports(raw: Option<String>) -> Result<Option<Vec<String>>, sqlx::Error> {
    raw.map(|t| {
        serde_json::from_str(&t).map_err(|e| sqlx::Error::ColumnDecode {
            index: "transports".to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

// SQLite implementations
async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), PasskeyError> {
    let credentials_table = DB_TABLE_ADMIN_CREDENTIALS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {credentials_table} (
            credential_id TEXT PRIMARY KEY NOT NULL,
            public_key TEXT NOT NULL,
            counter INTEGER NOT NULL DEFAULT 0,
            transports TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    Ok(())
}

async fn count_credentials_sqlite(pool: &Pool<Sqlite>) -> Result<i64, PasskeyError> {
    let row = sqlx::query(&format!(
        "SELECT COUNT(*) as count FROM {}",
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .fetch_one(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    row.try_get("count")
        .map_err(|e| PasskeyError::Storage(e.to_string()))
}

async fn store_credential_sqlite(
    pool: &Pool<Sqlite>,
    credential: &StoredCredential,
) -> Result<(), PasskeyError> {
    let transports = encode_transports(&credential.transports)?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {}
        (credential_id, public_key, counter, transports, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(credential_id) DO UPDATE SET
            public_key = excluded.public_key,
            counter = excluded.counter,
            transports = excluded.transports,
            updated_at = excluded.updated_at
        "#,
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .bind(&credential.credential_id)
    .bind(&credential.public_key)
    .bind(credential.counter as i64)
    .bind(transports)
    .bind(credential.created_at)
    .bind(credential.updated_at)
    .execute(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    Ok(())
}

async fn get_credential_sqlite(
    pool: &Pool<Sqlite>,
    credential_id: &str,
) -> Result<Option<StoredCredential>, PasskeyError> {
    sqlx::query_as::<_, StoredCredential>(&format!(
        "SELECT * FROM {} WHERE credential_id = ?",
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .bind(credential_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))
}

async fn get_all_credentials_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<Vec<StoredCredential>, PasskeyError> {
    sqlx::query_as::<_, StoredCredential>(&format!(
        "SELECT * FROM {} ORDER BY created_at",
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))
}

async fn update_credential_counter_sqlite(
    pool: &Pool<Sqlite>,
    credential_id: &str,
    counter: u32,
) -> Result<(), PasskeyError> {
    sqlx::query(&format!(
        r#"
        UPDATE {}
        SET counter = ?, updated_at = CURRENT_TIMESTAMP
        WHERE credential_id = ?
        "#,
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .bind(counter as i64)
    .bind(credential_id)
    .execute(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    Ok(())
}

// PostgreSQL implementations
async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), PasskeyError> {
    let credentials_table = DB_TABLE_ADMIN_CREDENTIALS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {credentials_table} (
            credential_id TEXT PRIMARY KEY NOT NULL,
            public_key TEXT NOT NULL,
            counter INTEGER NOT NULL DEFAULT 0,
            transports TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    Ok(())
}

async fn count_credentials_postgres(pool: &Pool<Postgres>) -> Result<i64, PasskeyError> {
    let row = sqlx::query(&format!(
        "SELECT COUNT(*) as count FROM {}",
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .fetch_one(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    row.try_get("count")
        .map_err(|e| PasskeyError::Storage(e.to_string()))
}

async fn store_credential_postgres(
    pool: &Pool<Postgres>,
    credential: &StoredCredential,
) -> Result<(), PasskeyError> {
    let transports = encode_transports(&credential.transports)?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {}
        (credential_id, public_key, counter, transports, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (credential_id) DO UPDATE SET
            public_key = EXCLUDED.public_key,
            counter = EXCLUDED.counter,
            transports = EXCLUDED.transports,
            updated_at = EXCLUDED.updated_at
        "#,
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .bind(&credential.credential_id)
    .bind(&credential.public_key)
    .bind(credential.counter as i32)
    .bind(transports)
    .bind(credential.created_at)
    .bind(credential.updated_at)
    .execute(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    Ok(())
}

async fn get_credential_postgres(
    pool: &Pool<Postgres>,
    credential_id: &str,
) -> Result<Option<StoredCredential>, PasskeyError> {
    sqlx::query_as::<_, StoredCredential>(&format!(
        "SELECT * FROM {} WHERE credential_id = $1",
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .bind(credential_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))
}

async fn get_all_credentials_postgres(
    pool: &Pool<Postgres>,
) -> Result<Vec<StoredCredential>, PasskeyError> {
    sqlx::query_as::<_, StoredCredential>(&format!(
        "SELECT * FROM {} ORDER BY created_at",
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))
}

async fn update_credential_counter_postgres(
    pool: &Pool<Postgres>,
    credential_id: &str,
    counter: u32,
) -> Result<(), PasskeyError> {
    sqlx::query(&format!(
        r#"
        UPDATE {}
        SET counter = $1, updated_at = CURRENT_TIMESTAMP
        WHERE credential_id = $2
        "#,
        DB_TABLE_ADMIN_CREDENTIALS.as_str()
    ))
    .bind(counter as i32)
    .bind(credential_id)
    .execute(pool)
    .await
    .map_err(|e| PasskeyError::Storage(e.to_string()))?;

    Ok(())
}

// Implement FromRow for StoredCredential to handle the transports JSON column
impl<'r> FromRow<'r, SqliteRow> for StoredCredential {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let credential_id: String = row.try_get("credential_id")?;
        let public_key: String = row.try_get("public_key")?;
        let counter: i64 = row.try_get("counter")?;
        let transports: Option<String> = row.try_get("transports")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(StoredCredential {
            credential_id,
            public_key,
            counter: counter as u32,
            transports: decode_transports(transports)?,
            created_at,
            updated_at,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StoredCredential {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let credential_id: String = row.try_get("credential_id")?;
        let public_key: String = row.try_get("public_key")?;
        let counter: i32 = row.try_get("counter")?;
        let transports: Option<String> = row.try_get("transports")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(StoredCredential {
            credential_id,
            public_key,
            counter: counter as u32,
            transports: decode_transports(transports)?,
            created_at,
            updated_at,
        })
    }
}

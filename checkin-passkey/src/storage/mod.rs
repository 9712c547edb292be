mod cache_store;
mod data_store;
mod errors;
mod types;

pub(crate) async fn init() -> Result<(), errors::StorageError> {
    let _ = *cache_store::CACHE_STORE;
    let _ = *data_store::DATA_STORE;

    Ok(())
}

pub(crate) use cache_store::CACHE_STORE;
pub(crate) use data_store::{DATA_STORE, DB_TABLE_ADMIN_CREDENTIALS};
pub(crate) use errors::StorageError;
pub(crate) use types::CacheData;

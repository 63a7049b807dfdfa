use thiserror::Error;

use moneta_import::ImportError;
use moneta_storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Stored records are corrupt: {0}")]
    CorruptRecords(#[from] serde_json::Error),
    #[error("No record with id '{0}'")]
    NotFound(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Marketplace already initialised in {0}")]
    AlreadyInitialised(String),

    #[error(transparent)]
    Marketplace(#[from] acdm_node::MarketplaceError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

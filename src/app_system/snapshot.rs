use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::Product;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Snapshot at {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Snapshot at {path} has product {name:?} updated before it was created")]
    UpdatedBeforeCreated { path: PathBuf, name: String },
}

/// Read the products saved by [`save_snapshot`]. A missing file is an empty store.
#[instrument(fields(path = %path.display()))]
pub async fn load_snapshot(path: &Path) -> Result<Vec<Product>, SnapshotError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No snapshot found, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let products: Vec<Product> =
        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    if let Some(product) = products.iter().find(|p| p.updated_at < p.created_at) {
        return Err(SnapshotError::UpdatedBeforeCreated {
            path: path.to_path_buf(),
            name: product.name.to_string(),
        });
    }
    debug!(product_count = products.len(), "Snapshot loaded");
    Ok(products)
}

/// Write `products` as a JSON array. The file is replaced atomically.
#[instrument(skip(products), fields(path = %path.display(), product_count = products.len()))]
pub async fn save_snapshot(path: &Path, products: &[Product]) -> Result<(), SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(products).map_err(|source| SnapshotError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    debug!("Snapshot written");
    Ok(())
}

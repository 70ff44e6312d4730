use crate::errors::AppError;
use crate::models::{AppData, DhikrRecord};
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file {}: {err}", path.display());
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Backup file body: the bare record array.
pub fn export_records(records: &[DhikrRecord]) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(records).map_err(AppError::internal)
}

pub fn parse_records(bytes: &[u8]) -> Result<Vec<DhikrRecord>, AppError> {
    serde_json::from_slice(bytes)
        .map_err(|err| AppError::bad_request(format!("invalid backup file: {err}")))
}

pub mod excel;
pub mod pdf;

use bson::oid::ObjectId;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::dao::Entity;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Excel export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }
}

/// A rendered export: the bytes plus the name it should be served under.
#[derive(Debug)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render a filtered entity page into the requested format. Naming keeps
/// tenant and timestamp in the file name so artifacts never collide.
pub fn export_entities<T: Entity>(
    tenant_id: ObjectId,
    items: &[T],
    format: ExportFormat,
) -> Result<Artifact, ExportError> {
    let bytes = match format {
        ExportFormat::Pdf => pdf::export(items),
        ExportFormat::Excel => excel::export(items)?,
    };
    Ok(Artifact {
        file_name: artifact_name(T::KIND, tenant_id, format.extension()),
        bytes,
    })
}

fn artifact_name(kind: &str, tenant_id: ObjectId, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        kind,
        tenant_id.to_hex(),
        Utc::now().timestamp_millis(),
        extension
    )
}

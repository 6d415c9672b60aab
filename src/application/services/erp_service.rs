use crate::application::ports::DeliveryApi;
use crate::domain::entities::ErpDocument;
use crate::domain::value_objects::{detect_document_type, DocumentType};
use crate::shared::error::AppError;
use crate::shared::validation::require_non_empty;
use std::sync::Arc;
use tracing::info;

/// Scanned-document lookups against the ERP bridge.
pub struct ErpService {
    api: Arc<dyn DeliveryApi>,
}

impl ErpService {
    pub fn new(api: Arc<dyn DeliveryApi>) -> Self {
        Self { api }
    }

    pub fn classify(barcode: &str) -> Result<DocumentType, AppError> {
        require_non_empty("Barcode", barcode)?;
        detect_document_type(barcode)
            .ok_or_else(|| AppError::validation(format!("Unrecognised document barcode: {barcode}")))
    }

    pub async fn lookup(&self, barcode: &str) -> Result<ErpDocument, AppError> {
        let barcode = barcode.trim();
        let document_type = Self::classify(barcode)?;
        let document = self.api.fetch_erp_document(document_type, barcode).await?;
        info!("Loaded {document_type} document {barcode}");
        Ok(document)
    }

    pub async fn push_status(&self, document: &ErpDocument, status: &str) -> Result<(), AppError> {
        require_non_empty("Status", status)?;
        self.api
            .push_erp_status(document.document_type, &document.barcode, status.trim())
            .await?;
        info!(
            "Pushed status '{}' for {} document {}",
            status.trim(),
            document.document_type,
            document.barcode
        );
        Ok(())
    }
}

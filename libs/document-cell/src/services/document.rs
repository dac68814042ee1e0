use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_database::AppointmentStore;
use shared_models::appointment::{Document, DocumentType, UploaderRole};
use shared_models::error::AppError;

use crate::models::{resource_kind_for, storage_key, validate_batch, UploadedFile};
use crate::services::storage::DocumentStorage;
use crate::DocumentCellState;

/// Upload gateway and registry delete path for appointment documents.
///
/// Both operations follow the same shape: validate, call the provider, then
/// mutate the registry, compensating the provider side when the later step
/// fails so registry and provider never diverge silently.
pub struct DocumentService {
    store: Arc<dyn AppointmentStore>,
    storage: Arc<dyn DocumentStorage>,
    timeout: Duration,
}

impl DocumentService {
    pub fn new(state: &DocumentCellState) -> Self {
        Self {
            store: state.store.clone(),
            storage: state.storage.clone(),
            timeout: state.upload_timeout(),
        }
    }

    pub fn with_parts(
        store: Arc<dyn AppointmentStore>,
        storage: Arc<dyn DocumentStorage>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            storage,
            timeout,
        }
    }

    /// Stores a validated batch at the provider and appends one registry
    /// entry per stored file. All-or-nothing: any validation failure rejects
    /// the batch before provider I/O, and a mid-batch provider failure rolls
    /// back the objects already stored.
    ///
    /// The whole pipeline runs under a wall-clock timeout; expiry drops the
    /// in-flight provider future, cancelling the upload rather than letting
    /// it keep running after the client has been answered.
    pub async fn upload_documents(
        &self,
        appointment_id: Uuid,
        files: Vec<UploadedFile>,
        auth_token: &str,
    ) -> Result<Vec<Document>, AppError> {
        validate_batch(&files)?;

        let appointment = self
            .store
            .find_appointment(appointment_id, auth_token)
            .await
            .map_err(|e| {
                error!("Appointment lookup failed: {}", e);
                AppError::Database("Failed to load appointment".to_string())
            })?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

        debug!(
            "Uploading {} documents to appointment {}",
            files.len(),
            appointment.id
        );

        match tokio::time::timeout(
            self.timeout,
            self.store_and_record(appointment.id, &files, auth_token),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Upload to appointment {} exceeded {:?}",
                    appointment.id, self.timeout
                );
                Err(AppError::Timeout(
                    "Upload timed out. Please try again.".to_string(),
                ))
            }
        }
    }

    async fn store_and_record(
        &self,
        appointment_id: Uuid,
        files: &[UploadedFile],
        auth_token: &str,
    ) -> Result<Vec<Document>, AppError> {
        let mut stored: Vec<Document> = Vec::with_capacity(files.len());

        for file in files {
            let key = storage_key(&file.filename);
            let kind = resource_kind_for(&file.content_type);

            match self.storage.store(file.bytes.clone(), &key, kind).await {
                Ok(object) => stored.push(Document {
                    url: object.url,
                    storage_key: object.key,
                    doc_type: DocumentType::Other,
                    uploaded_by: UploaderRole::Doctor,
                    resource_kind: kind,
                }),
                Err(e) => {
                    error!("Provider store failed for {}: {}", file.filename, e);
                    self.compensate(&stored).await;
                    return Err(AppError::ExternalService(
                        "Failed to store uploaded file".to_string(),
                    ));
                }
            }
        }

        match self
            .store
            .append_documents(appointment_id, &stored, auth_token)
            .await
        {
            Ok(created) => {
                info!(
                    "Recorded {} documents on appointment {}",
                    created.len(),
                    appointment_id
                );
                Ok(created)
            }
            Err(e) => {
                error!(
                    "Failed to record documents on appointment {}: {}",
                    appointment_id, e
                );
                self.compensate(&stored).await;
                Err(AppError::Database(
                    "Failed to record uploaded documents".to_string(),
                ))
            }
        }
    }

    /// Best-effort removal of provider objects stored before a failure.
    async fn compensate(&self, stored: &[Document]) {
        for doc in stored {
            if let Err(e) = self.storage.delete(&doc.storage_key, doc.resource_kind).await {
                warn!(
                    "Compensation delete failed for {}; orphaned provider object: {}",
                    doc.storage_key, e
                );
            }
        }
    }

    /// Deletes a document: provider object first, registry entry second.
    /// A provider failure surfaces as an error and leaves the registry row
    /// in place, so a failed provider delete can never masquerade as
    /// success.
    pub async fn delete_document(
        &self,
        appointment_id: Uuid,
        storage_key: &str,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let appointment = self
            .store
            .find_appointment(appointment_id, auth_token)
            .await
            .map_err(|e| {
                error!("Appointment lookup failed: {}", e);
                AppError::Database("Failed to load appointment".to_string())
            })?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

        let document = appointment
            .document_by_key(storage_key)
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        self.storage
            .delete(&document.storage_key, document.resource_kind)
            .await
            .map_err(|e| {
                error!("Provider delete failed for {}: {}", storage_key, e);
                AppError::ExternalService("Failed to delete stored document".to_string())
            })?;

        let removed = self
            .store
            .remove_document(appointment_id, storage_key, auth_token)
            .await
            .map_err(|e| {
                error!(
                    "Registry removal failed for {} on appointment {}: {}",
                    storage_key, appointment_id, e
                );
                AppError::Database("Failed to remove document record".to_string())
            })?;

        if removed == 0 {
            warn!(
                "Document {} vanished from appointment {} between lookup and removal",
                storage_key, appointment_id
            );
        }

        info!(
            "Deleted document {} from appointment {}",
            storage_key, appointment_id
        );

        Ok(())
    }
}

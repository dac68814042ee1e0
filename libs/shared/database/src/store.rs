use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use shared_models::appointment::{Appointment, Document, PaymentReceipt};

/// Capability interface over the primary data store's appointment records.
///
/// Injected into the cells as a trait object so tests can substitute
/// in-memory fakes. Calls carry the caller's bearer token through to the
/// store, which enforces row-level access on its side.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_appointment(&self, id: Uuid, auth_token: &str) -> Result<Option<Appointment>>;

    /// Appends document records to an appointment's registry. Appends are
    /// row inserts, so two concurrent uploads to the same appointment cannot
    /// overwrite each other's entries.
    async fn append_documents(
        &self,
        appointment_id: Uuid,
        documents: &[Document],
        auth_token: &str,
    ) -> Result<Vec<Document>>;

    /// Removes the registry entry with the given storage key. Returns the
    /// number of rows removed (0 when the key was absent).
    async fn remove_document(
        &self,
        appointment_id: Uuid,
        storage_key: &str,
        auth_token: &str,
    ) -> Result<u64>;

    /// Records a verified payment and transitions the appointment to Paid.
    async fn mark_paid(
        &self,
        appointment_id: Uuid,
        receipt: &PaymentReceipt,
        auth_token: &str,
    ) -> Result<Appointment>;
}

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use shared_config::AppConfig;
use shared_database::{AppointmentStore, RestAppointmentStore};

use services::storage::{CloudinaryStorage, DocumentStorage};

pub use models::UploadedFile;
pub use router::document_routes;

/// Shared state for the document cell: the injected capability interfaces
/// plus the application config.
#[derive(Clone)]
pub struct DocumentCellState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
    pub storage: Arc<dyn DocumentStorage>,
}

impl DocumentCellState {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(RestAppointmentStore::new(&config));
        let storage = Arc::new(CloudinaryStorage::new(&config));
        Self {
            config,
            store,
            storage,
        }
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.config.upload_timeout_secs)
    }
}

pub mod api {
    pub use crate::services::document::DocumentService;
    pub use crate::services::storage::{CloudinaryStorage, DocumentStorage, StoredObject};
}

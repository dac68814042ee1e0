pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::{AppointmentStore, RestAppointmentStore};

use services::gateway::{PaymentGateway, RazorpayGateway};

pub use models::{CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest};
pub use router::payment_routes;

/// Shared state for the payment cell.
#[derive(Clone)]
pub struct PaymentCellState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl PaymentCellState {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(RestAppointmentStore::new(&config));
        let gateway = Arc::new(RazorpayGateway::new(&config));
        Self {
            config,
            store,
            gateway,
        }
    }
}

pub mod api {
    pub use crate::services::gateway::{GatewayOrder, PaymentGateway, RazorpayGateway};
    pub use crate::services::orchestrator::PaymentService;
    pub use crate::services::signature::{compute_signature, verify_signature};
}

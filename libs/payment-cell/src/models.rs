use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "appointmentId")]
    pub appointment_id: Uuid,
}

/// Wire names follow the gateway's checkout callback payload.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "appointmentId")]
    pub appointment_id: Uuid,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: String,
    /// Order amount in the smallest currency unit (paise).
    pub amount: i64,
    pub currency: String,
    /// The gateway's public key id, needed by the checkout widget.
    pub key: String,
}

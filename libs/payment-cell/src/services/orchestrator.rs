use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use shared_database::AppointmentStore;
use shared_models::appointment::{Appointment, PartyInfo, PaymentReceipt, PaymentStatus};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateOrderResponse, VerifyPaymentRequest};
use crate::services::gateway::PaymentGateway;
use crate::services::signature::verify_signature;
use crate::PaymentCellState;

/// Creates gateway orders and verifies signed payment confirmations.
///
/// Order creation persists nothing locally: a created-but-never-confirmed
/// order simply leaves the appointment Pending. The Pending -> Paid
/// transition happens only in `verify_payment`, after the signature check.
pub struct PaymentService {
    store: Arc<dyn AppointmentStore>,
    gateway: Arc<dyn PaymentGateway>,
    key_id: String,
    key_secret: String,
}

impl PaymentService {
    pub fn new(state: &PaymentCellState) -> Self {
        Self {
            store: state.store.clone(),
            gateway: state.gateway.clone(),
            key_id: state.config.razorpay_key_id.clone(),
            key_secret: state.config.razorpay_key_secret.clone(),
        }
    }

    pub fn with_parts(
        store: Arc<dyn AppointmentStore>,
        gateway: Arc<dyn PaymentGateway>,
        key_id: String,
        key_secret: String,
    ) -> Self {
        Self {
            store,
            gateway,
            key_id,
            key_secret,
        }
    }

    pub async fn create_order(
        &self,
        appointment_id: Uuid,
        caller: &User,
        auth_token: &str,
    ) -> Result<CreateOrderResponse, AppError> {
        let appointment = self
            .load_for_patient(appointment_id, caller, auth_token)
            .await?;

        if appointment.payment_status == PaymentStatus::Paid {
            return Err(AppError::Conflict("Payment already completed".to_string()));
        }

        let notes = json!({
            "appointmentId": appointment.id,
            "doctorName": party_name(&appointment.doctor),
            "patientName": party_name(&appointment.patient),
            "consultationType": appointment.consultation_type,
            "date": appointment.date,
            "slotStart": appointment.slot_start,
            "slotEnd": appointment.slot_end,
        });

        let order = self
            .gateway
            .create_order(
                appointment.total_amount * 100,
                "INR",
                &format!("appointment_{}", appointment.id),
                notes,
            )
            .await
            .map_err(|e| {
                error!(
                    "Gateway order creation failed for appointment {}: {}",
                    appointment.id, e
                );
                AppError::ExternalService("Failed to create payment order".to_string())
            })?;

        info!(
            "Created order {} for appointment {} ({} paise)",
            order.id, appointment.id, order.amount
        );

        Ok(CreateOrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key: self.key_id.clone(),
        })
    }

    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
        caller: &User,
        auth_token: &str,
    ) -> Result<Appointment, AppError> {
        let appointment = self
            .load_for_patient(request.appointment_id, caller, auth_token)
            .await?;

        match appointment.payment_status {
            PaymentStatus::Paid => {
                // A duplicate legitimate confirmation is a no-op, not a
                // second side effect.
                return if appointment.razorpay_payment_id.as_deref()
                    == Some(request.razorpay_payment_id.as_str())
                {
                    info!(
                        "Duplicate confirmation for appointment {} ignored",
                        appointment.id
                    );
                    Ok(appointment)
                } else {
                    Err(AppError::Conflict("Payment already completed".to_string()))
                };
            }
            status if !status.can_transition_to(PaymentStatus::Paid) => {
                return Err(AppError::Conflict(format!(
                    "Appointment payment is {} and cannot be paid",
                    status
                )));
            }
            _ => {}
        }

        if !verify_signature(
            &request.razorpay_order_id,
            &request.razorpay_payment_id,
            &request.razorpay_signature,
            &self.key_secret,
        ) {
            warn!(
                "Signature mismatch for appointment {} (order {})",
                appointment.id, request.razorpay_order_id
            );
            return Err(AppError::BadRequest(
                "Payment verification failed".to_string(),
            ));
        }

        let receipt = PaymentReceipt {
            order_id: request.razorpay_order_id.clone(),
            payment_id: request.razorpay_payment_id.clone(),
            signature: request.razorpay_signature.clone(),
            paid_at: Utc::now(),
        };

        let updated = self
            .store
            .mark_paid(appointment.id, &receipt, auth_token)
            .await
            .map_err(|e| {
                error!(
                    "Failed to record payment on appointment {}: {}",
                    appointment.id, e
                );
                AppError::Database("Failed to record payment".to_string())
            })?;

        info!(
            "Appointment {} paid via order {}",
            updated.id, receipt.order_id
        );

        Ok(updated)
    }

    async fn load_for_patient(
        &self,
        appointment_id: Uuid,
        caller: &User,
        auth_token: &str,
    ) -> Result<Appointment, AppError> {
        let appointment = self
            .store
            .find_appointment(appointment_id, auth_token)
            .await
            .map_err(|e| {
                error!("Appointment lookup failed: {}", e);
                AppError::Database("Failed to load appointment".to_string())
            })?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

        if appointment.patient_id.to_string() != caller.id {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        Ok(appointment)
    }
}

fn party_name(party: &Option<PartyInfo>) -> String {
    party.as_ref().map(|p| p.full_name.clone()).unwrap_or_default()
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

/// A scheduled consultation between a doctor and a patient.
///
/// The primary store enforces uniqueness over (doctor_id, date, slot_start),
/// so a doctor's slot can never be double-booked. This segment of the backend
/// never inserts appointments, only mutates documents and payment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// Embedded party info, present when the store query embeds the
    /// doctors/patients relations. Used for payment-gateway audit notes.
    #[serde(default)]
    pub doctor: Option<PartyInfo>,
    #[serde(default)]
    pub patient: Option<PartyInfo>,
    pub date: NaiveDate,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub consultation_type: ConsultationType,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub prescription_text: String,
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Fee breakdown in whole rupees. The gateway order is issued in paise.
    pub consultation_fee: i64,
    pub platform_fee: i64,
    pub total_amount: i64,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn document_by_key(&self, storage_key: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.storage_key == storage_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyInfo {
    pub full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    Video,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// PAYMENT STATE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Legal transitions: Pending -> Paid -> Refunded. Refunded is terminal
    /// and only reachable from Paid; nothing ever returns to Pending.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

/// The gateway confirmation recorded on an appointment when it becomes Paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub paid_at: DateTime<Utc>,
}

// ==============================================================================
// DOCUMENT MODELS
// ==============================================================================

/// A reference to externally stored content, owned by its appointment.
/// `resource_kind` records the provider category used at upload time; the
/// delete path must reuse it, since deleting under the wrong category
/// silently no-ops at the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub storage_key: String,
    pub doc_type: DocumentType,
    pub uploaded_by: UploaderRole,
    pub resource_kind: ResourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    LabReport,
    Prescription,
    Other,
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploaderRole {
    Doctor,
}

/// Storage-provider resource category. PDFs are stored as raw objects,
/// everything else as images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Raw,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Raw => "raw",
        }
    }
}

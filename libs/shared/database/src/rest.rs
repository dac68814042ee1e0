use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::appointment::{Appointment, Document, PaymentReceipt, PaymentStatus};

use crate::store::AppointmentStore;

const APPOINTMENT_SELECT: &str =
    "*,documents:appointment_documents(*),doctor:doctors(full_name),patient:patients(full_name)";

/// Appointment store backed by the primary store's PostgREST-style API.
pub struct RestAppointmentStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn headers(&self, auth_token: &str, prefer_representation: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", auth_token)) {
            headers.insert(AUTHORIZATION, value);
        }
        if prefer_representation {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
        prefer_representation: bool,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store request {} {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(auth_token, prefer_representation));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, error_text);
            return Err(anyhow!("Store error ({}): {}", status, error_text));
        }

        let data = response.json::<Value>().await?;
        Ok(data)
    }
}

#[async_trait]
impl AppointmentStore for RestAppointmentStore {
    async fn find_appointment(&self, id: Uuid, auth_token: &str) -> Result<Option<Appointment>> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select={}",
            id, APPOINTMENT_SELECT
        );

        let result = self
            .request(Method::GET, &path, auth_token, None, false)
            .await?;

        let rows: Vec<Appointment> = serde_json::from_value(result)?;
        Ok(rows.into_iter().next())
    }

    async fn append_documents(
        &self,
        appointment_id: Uuid,
        documents: &[Document],
        auth_token: &str,
    ) -> Result<Vec<Document>> {
        let rows: Vec<Value> = documents
            .iter()
            .map(|doc| {
                json!({
                    "appointment_id": appointment_id,
                    "url": doc.url,
                    "storage_key": doc.storage_key,
                    "doc_type": doc.doc_type,
                    "uploaded_by": doc.uploaded_by,
                    "resource_kind": doc.resource_kind,
                })
            })
            .collect();

        let result = self
            .request(
                Method::POST,
                "/rest/v1/appointment_documents",
                auth_token,
                Some(Value::Array(rows)),
                true,
            )
            .await?;

        let created: Vec<Document> = serde_json::from_value(result)?;
        if created.len() != documents.len() {
            return Err(anyhow!(
                "Store created {} document records, expected {}",
                created.len(),
                documents.len()
            ));
        }

        Ok(created)
    }

    async fn remove_document(
        &self,
        appointment_id: Uuid,
        storage_key: &str,
        auth_token: &str,
    ) -> Result<u64> {
        let path = format!(
            "/rest/v1/appointment_documents?appointment_id=eq.{}&storage_key=eq.{}",
            appointment_id, storage_key
        );

        let result = self
            .request(Method::DELETE, &path, auth_token, None, true)
            .await?;

        let removed: Vec<Value> = serde_json::from_value(result)?;
        Ok(removed.len() as u64)
    }

    async fn mark_paid(
        &self,
        appointment_id: Uuid,
        receipt: &PaymentReceipt,
        auth_token: &str,
    ) -> Result<Appointment> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let body = json!({
            "payment_status": PaymentStatus::Paid,
            "razorpay_order_id": receipt.order_id,
            "razorpay_payment_id": receipt.payment_id,
            "razorpay_signature": receipt.signature,
            "payment_date": receipt.paid_at.to_rfc3339(),
        });

        let result = self
            .request(Method::PATCH, &path, auth_token, Some(body), true)
            .await?;

        let rows: Vec<Appointment> = serde_json::from_value(result)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Appointment {} not found while recording payment", appointment_id))
    }
}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_models::appointment::ResourceKind;

/// Capability interface over the external media host.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Stores the bytes under the given key and category, returning the
    /// provider-assigned identifier and retrieval URL.
    async fn store(&self, bytes: Bytes, key: &str, kind: ResourceKind) -> Result<StoredObject>;

    /// Deletes the object stored under the key. The category must match the
    /// one used at store time; the provider silently no-ops on a mismatch,
    /// which is why callers persist the kind alongside the key.
    async fn delete(&self, key: &str, kind: ResourceKind) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

/// Cloudinary-backed storage client.
///
/// Uploads go through the signed upload REST endpoint with the file inlined
/// as a base64 data URI; deletes go through `destroy` with `invalidate` set
/// so CDN copies are purged too.
pub struct CloudinaryStorage {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl CloudinaryStorage {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            base_url: config.cloudinary_base_url.clone(),
        }
    }

    fn endpoint(&self, kind: ResourceKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.cloud_name,
            kind.as_str(),
            action
        )
    }

    /// SHA-256 request signature over the sorted parameter string, per the
    /// provider's signed-upload scheme.
    fn sign(&self, params_to_sign: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(params_to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    async fn post_form(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self.client.post(url).form(params).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Storage provider error ({}): {}", status, body);
            return Err(anyhow!("Storage provider error ({}): {}", status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DocumentStorage for CloudinaryStorage {
    async fn store(&self, bytes: Bytes, key: &str, kind: ResourceKind) -> Result<StoredObject> {
        let url = self.endpoint(kind, "upload");
        debug!("Storing {} bytes under key {} at {}", bytes.len(), key, url);

        let timestamp = Utc::now().timestamp();
        let signature = self.sign(&format!("public_id={}&timestamp={}", key, timestamp));

        let data_uri = format!(
            "data:application/octet-stream;base64,{}",
            BASE64.encode(&bytes)
        );

        let params = [
            ("file", data_uri),
            ("public_id", key.to_string()),
            ("timestamp", timestamp.to_string()),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
        ];

        let result = self.post_form(&url, &params).await?;

        let stored_key = result["public_id"]
            .as_str()
            .ok_or_else(|| anyhow!("Storage provider response missing public_id"))?
            .to_string();
        let stored_url = result["secure_url"]
            .as_str()
            .ok_or_else(|| anyhow!("Storage provider response missing secure_url"))?
            .to_string();

        info!("Stored object {} ({})", stored_key, kind.as_str());

        Ok(StoredObject {
            url: stored_url,
            key: stored_key,
        })
    }

    async fn delete(&self, key: &str, kind: ResourceKind) -> Result<()> {
        let url = self.endpoint(kind, "destroy");
        debug!("Deleting object {} ({}) at {}", key, kind.as_str(), url);

        let timestamp = Utc::now().timestamp();
        let signature = self.sign(&format!(
            "invalidate=true&public_id={}&timestamp={}",
            key, timestamp
        ));

        let params = [
            ("public_id", key.to_string()),
            ("invalidate", "true".to_string()),
            ("timestamp", timestamp.to_string()),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
        ];

        let result = self.post_form(&url, &params).await?;

        match result["result"].as_str() {
            Some("ok") => {
                info!("Deleted object {} ({})", key, kind.as_str());
                Ok(())
            }
            Some(other) => Err(anyhow!("Storage provider refused deletion of {}: {}", key, other)),
            None => Err(anyhow!("Storage provider returned no deletion result for {}", key)),
        }
    }
}

use std::env;
use tracing::warn;

pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub jwt_secret: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_base_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_base_url: String,
    /// Wall-clock bound on the whole upload pipeline, in seconds.
    pub upload_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: env::var("STORE_URL").unwrap_or_else(|_| {
                warn!("STORE_URL not set, using empty value");
                String::new()
            }),
            store_api_key: env::var("STORE_API_KEY").unwrap_or_else(|_| {
                warn!("STORE_API_KEY not set, using empty value");
                String::new()
            }),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_else(|_| {
                warn!("CLOUDINARY_CLOUD_NAME not set, using empty value");
                String::new()
            }),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_else(|_| {
                warn!("CLOUDINARY_API_KEY not set, using empty value");
                String::new()
            }),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_else(|_| {
                warn!("CLOUDINARY_API_SECRET not set, using empty value");
                String::new()
            }),
            cloudinary_base_url: env::var("CLOUDINARY_BASE_URL").unwrap_or_else(|_| {
                warn!("CLOUDINARY_BASE_URL not set, using default");
                "https://api.cloudinary.com/v1_1".to_string()
            }),
            razorpay_key_id: env::var("RAZORPAY_KEY_ID").unwrap_or_else(|_| {
                warn!("RAZORPAY_KEY_ID not set, using empty value");
                String::new()
            }),
            razorpay_key_secret: env::var("RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
                warn!("RAZORPAY_KEY_SECRET not set, using empty value");
                String::new()
            }),
            razorpay_base_url: env::var("RAZORPAY_BASE_URL").unwrap_or_else(|_| {
                warn!("RAZORPAY_BASE_URL not set, using default");
                "https://api.razorpay.com".to_string()
            }),
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty() && !self.store_api_key.is_empty() && !self.jwt_secret.is_empty()
    }

    pub fn is_storage_configured(&self) -> bool {
        !self.cloudinary_cloud_name.is_empty()
            && !self.cloudinary_api_key.is_empty()
            && !self.cloudinary_api_secret.is_empty()
            && !self.cloudinary_base_url.is_empty()
    }

    pub fn is_payments_configured(&self) -> bool {
        !self.razorpay_key_id.is_empty()
            && !self.razorpay_key_secret.is_empty()
            && !self.razorpay_base_url.is_empty()
    }
}

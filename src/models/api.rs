use serde::{Deserialize, Serialize};

use crate::models::product::{ProductRecord, ProductStatus};

/// Response after accepting a spreadsheet upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub request_ids: Vec<String>,
}

/// One product in a status lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductStatusEntry {
    pub product_name: String,
    pub input_image_urls: String,
    pub output_image_urls: Option<String>,
    pub status: ProductStatus,
}

impl From<ProductRecord> for ProductStatusEntry {
    fn from(record: ProductRecord) -> Self {
        Self {
            product_name: record.product_name,
            input_image_urls: record.input_image_urls,
            output_image_urls: record.output_image_urls,
            status: record.status,
        }
    }
}

/// Response for querying a request's status.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub products: Vec<ProductStatusEntry>,
}

/// Notification body posted to a record's webhook once processing ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub request_id: String,
    pub product_name: String,
    pub status: ProductStatus,
    pub output_image_urls: Option<String>,
}

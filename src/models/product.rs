use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Processing status of a product record.
///
/// Records start `Pending` and are moved to `Completed` or `Failed` exactly
/// once by the image-processing job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
pub enum ProductStatus {
    Pending,
    Completed,
    Failed,
}

/// A product row from the `products` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub request_id: String,
    pub product_name: String,
    pub input_image_urls: String,
    pub output_image_urls: Option<String>,
    pub status: ProductStatus,
    pub webhook_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Input URLs split on commas, trimmed, empty entries dropped.
    pub fn input_urls(&self) -> Vec<&str> {
        split_urls(&self.input_image_urls)
    }
}

/// A row staged for insertion during ingestion.
#[derive(Debug, Clone, Validate)]
pub struct NewProduct {
    #[garde(length(min = 1, max = 36))]
    pub request_id: String,

    #[garde(length(min = 1))]
    pub product_name: String,

    #[garde(length(min = 1))]
    pub input_image_urls: String,

    #[garde(skip)]
    pub webhook_url: Option<String>,
}

/// Final state computed by the processing job for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub id: i64,
    pub status: ProductStatus,
    pub output_image_urls: Option<String>,
}

pub fn split_urls(joined: &str) -> Vec<&str> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .collect()
}

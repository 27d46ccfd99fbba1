//! Product Image Processor
//!
//! Accepts CSV uploads of products and their image URLs, records one pending
//! row per product, and hands each row to a queue-fed worker that downloads,
//! halves and stores the images. Status and a CSV export are served per
//! request ID.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod worker;

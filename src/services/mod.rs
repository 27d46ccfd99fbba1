pub mod fetcher;
pub mod images;
pub mod ingest;
pub mod processor;
pub mod queue;
pub mod spreadsheet;
pub mod webhook;

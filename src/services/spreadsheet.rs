//! CSV handling for uploads and exports.
//!
//! Uploads must carry the `Product Name` and `Input Image Urls` columns; a
//! `Webhook Url` column is optional. Exports always render one record.

use crate::models::product::ProductRecord;

pub const PRODUCT_NAME_COLUMN: &str = "Product Name";
pub const INPUT_URLS_COLUMN: &str = "Input Image Urls";
pub const WEBHOOK_URL_COLUMN: &str = "Webhook Url";

const EXPORT_HEADER: [&str; 4] = [
    "Serial Number",
    "Product Name",
    "Input Image Urls",
    "Output Image Urls",
];

/// One product line read from an uploaded spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetRow {
    pub product_name: String,
    pub input_image_urls: String,
    pub webhook_url: Option<String>,
}

/// Parse an uploaded CSV into product rows.
///
/// Rows without their own webhook inherit `default_webhook`.
pub fn parse_products(
    data: &[u8],
    default_webhook: Option<&str>,
) -> Result<Vec<SpreadsheetRow>, SpreadsheetError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(SpreadsheetError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| headers.iter().position(|h| h == name);
    let name_idx = column(PRODUCT_NAME_COLUMN)
        .ok_or(SpreadsheetError::MissingColumn(PRODUCT_NAME_COLUMN))?;
    let urls_idx =
        column(INPUT_URLS_COLUMN).ok_or(SpreadsheetError::MissingColumn(INPUT_URLS_COLUMN))?;
    let webhook_idx = column(WEBHOOK_URL_COLUMN);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();

        let webhook_url = webhook_idx
            .map(field)
            .filter(|url| !url.is_empty())
            .or_else(|| default_webhook.map(str::to_string));

        rows.push(SpreadsheetRow {
            product_name: field(name_idx),
            input_image_urls: field(urls_idx),
            webhook_url,
        });
    }

    if rows.is_empty() {
        return Err(SpreadsheetError::Empty);
    }

    Ok(rows)
}

/// Render a single record as an export CSV (header plus one data row).
pub fn render_export(record: &ProductRecord) -> Result<Vec<u8>, SpreadsheetError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    writer.write_record([
        record.id.to_string().as_str(),
        record.product_name.as_str(),
        record.input_image_urls.as_str(),
        record.output_image_urls.as_deref().unwrap_or_default(),
    ])?;

    writer
        .into_inner()
        .map_err(|e| SpreadsheetError::Write(e.into_error()))
}

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("Empty CSV file")]
    Empty,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write CSV: {0}")]
    Write(std::io::Error),
}

//! Tab-delimited export for the local-file destination.
//!
//! One file per run, named `{filter}-export-{YYYYmmdd_HHMMSS}.tsv`, with a
//! header row followed by one row per record. Write failures propagate and
//! abort the run; a partially written file is left as is.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use clap::ValueEnum;
use pimsync_core::product::format_price;
use pimsync_core::text::decode_html_entities;
use pimsync_core::{ProductRecord, STAGING_TITLE_MAX};

const GRAMS_PER_POUND: f64 = 453.592;

/// Column layout of the export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportSchema {
    /// Storefront bulk-import staging sheet.
    Staging,
    /// Legacy invoicing system.
    Invoice,
}

const STAGING_HEADERS: [&str; 16] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Type",
    "Tags",
    "Variant SKU",
    "Variant Price",
    "Variant Barcode",
    "Variant Inventory Policy",
    "Variant Grams",
    "Cost per item",
    "MPN",
    "In the Box",
    "Source URL",
    "Status",
];

const INVOICE_HEADERS: [&str; 10] = [
    "PartCode",
    "Description",
    "Vendor",
    "VendorPartNumber",
    "UPC",
    "Cost",
    "Price",
    "Retail",
    "Weight",
    "Category",
];

impl ExportSchema {
    #[must_use]
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Staging => &STAGING_HEADERS,
            Self::Invoice => &INVOICE_HEADERS,
        }
    }

    /// Cells of one row, in header order.
    #[must_use]
    pub fn row(self, record: &ProductRecord) -> Vec<String> {
        match self {
            Self::Staging => staging_row(record),
            Self::Invoice => invoice_row(record),
        }
    }
}

fn staging_row(record: &ProductRecord) -> Vec<String> {
    vec![
        record.handle(),
        record.title(STAGING_TITLE_MAX),
        record.sanitized_html(),
        record.brand_name.clone(),
        record.product_type.clone(),
        record.part_prefix.clone(),
        record.sku.clone(),
        record.selected_price(),
        record.barcode().unwrap_or_default().to_string(),
        "continue".to_string(),
        grams(record.weight),
        positive_price(record.cost),
        record.mpn().unwrap_or_default().to_string(),
        decode_html_entities(&record.contents_html).into_owned(),
        record.product_url.clone(),
        "active".to_string(),
    ]
}

fn invoice_row(record: &ProductRecord) -> Vec<String> {
    vec![
        record.legacy_part_code(),
        record.export_description(),
        record.brand_name.clone(),
        record.vendor_part_number.clone(),
        record.upc.trim().to_string(),
        positive_price(record.cost),
        record.selected_price(),
        positive_price(record.retail_price),
        if record.weight > 0.0 {
            format!("{:.2}", record.weight)
        } else {
            String::new()
        },
        record.product_type.clone(),
    ]
}

fn positive_price(value: f64) -> String {
    if value > 0.0 {
        format_price(value)
    } else {
        String::new()
    }
}

fn grams(pounds: f64) -> String {
    if pounds > 0.0 {
        format!("{:.0}", pounds * GRAMS_PER_POUND)
    } else {
        "0".to_string()
    }
}

/// `{filter}-export-{timestamp}.tsv` with path separators in the filter
/// replaced by `_`.
pub fn export_file_name<Tz>(filter: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let safe: String = filter
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}-export-{}.tsv", now.format("%Y%m%d_%H%M%S"))
}

/// An open export file with its header already written.
pub struct TsvExport {
    writer: csv::Writer<File>,
    schema: ExportSchema,
    path: PathBuf,
    rows: usize,
}

impl TsvExport {
    /// Creates `dir/file_name` and writes the header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened or written.
    pub fn create(dir: &Path, file_name: &str, schema: ExportSchema) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("cannot create output dir {}: {e}", dir.display()))?;
        let path = dir.join(file_name);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", path.display()))?;
        writer
            .write_record(schema.headers())
            .map_err(|e| anyhow::anyhow!("cannot write header to {}: {e}", path.display()))?;
        tracing::info!(path = %path.display(), ?schema, "export file opened");
        Ok(Self {
            writer,
            schema,
            path,
            rows: 0,
        })
    }

    /// Appends one record as a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn write(&mut self, record: &ProductRecord) -> anyhow::Result<()> {
        self.writer
            .write_record(self.schema.row(record))
            .map_err(|e| anyhow::anyhow!("cannot write row to {}: {e}", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes buffered rows and returns the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> anyhow::Result<PathBuf> {
        self.writer
            .flush()
            .map_err(|e| anyhow::anyhow!("cannot flush {}: {e}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), rows = self.rows, "export file written");
        Ok(self.path)
    }
}

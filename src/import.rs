//! Apple Health Import
//!
//! Reads an Apple Health export (`export.zip` or the `export.xml` inside it)
//! into `HealthRecord`s locally, so sleep can be analysed without a backend.
//!
//! Apple Health XML format:
//!
//! ```text
//! <Record type="HKCategoryTypeIdentifierSleepAnalysis" sourceName="Apple Watch"
//!         startDate="2024-01-15 23:10:00 -0500" endDate="2024-01-16 06:40:00 -0500"
//!         value="HKCategoryValueSleepAnalysisAsleepCore"/>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::records::{HealthRecord, RecordValue};

const TYPE_PREFIXES: &[&str] = &[
    "HKQuantityTypeIdentifier",
    "HKCategoryTypeIdentifier",
    "HKDataType",
];

/// Records read from an export
#[derive(Debug, Default)]
pub struct ImportResult {
    pub records: Vec<HealthRecord>,
    /// `<Record>` elements that could not be read
    pub skipped: usize,
}

/// Import an Apple Health export from a `.zip` or `.xml` file
pub fn import_export(path: &Path) -> Result<ImportResult, ImportError> {
    let is_zip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    let xml = if is_zip {
        read_export_from_zip(path)?
    } else {
        std::fs::read_to_string(path)?
    };

    let result = parse_export_xml(&xml)?;
    tracing::info!(
        path = %path.display(),
        records = result.records.len(),
        skipped = result.skipped,
        "Imported Apple Health export"
    );
    Ok(result)
}

/// Find `export.xml` in an export archive and read it
fn read_export_from_zip(path: &Path) -> Result<String, ImportError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.name().to_ascii_lowercase().ends_with("export.xml") {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            return Ok(xml);
        }
    }

    Err(ImportError::MissingExport)
}

/// Parse Apple Health export XML content
pub fn parse_export_xml(xml: &str) -> Result<ImportResult, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut result = ImportResult::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element))
                if element.name().as_ref() == b"Record" =>
            {
                match record_from_element(&element) {
                    Some(record) => result.records.push(record),
                    None => result.skipped += 1,
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ImportError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(result)
}

fn record_from_element(element: &BytesStart<'_>) -> Option<HealthRecord> {
    let mut record = HealthRecord::new(String::new());
    let mut has_type = false;

    for attr in element.attributes() {
        let attr = attr.ok()?;
        let value = attr.unescape_value().ok()?.into_owned();

        match attr.key.as_ref() {
            b"type" => {
                record.record_type = convert_health_type(&value);
                has_type = true;
            }
            b"value" => record.value = Some(parse_value(value)),
            b"startDate" => record.start_date = Some(value),
            b"endDate" => record.end_date = Some(value),
            key @ (b"unit" | b"sourceName") => {
                let key = String::from_utf8_lossy(key).into_owned();
                record.extra.insert(key, value.into());
            }
            _ => {}
        }
    }

    has_type.then_some(record)
}

fn parse_value(value: String) -> RecordValue {
    match value.parse::<f64>() {
        Ok(n) => RecordValue::Number(n),
        Err(_) => RecordValue::Text(value),
    }
}

/// `HKCategoryTypeIdentifierSleepAnalysis` → `SleepAnalysis`
fn convert_health_type(health_type: &str) -> String {
    TYPE_PREFIXES
        .iter()
        .find_map(|prefix| health_type.strip_prefix(prefix))
        .unwrap_or(health_type)
        .to_string()
}

/// Errors that can occur while importing an export
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ZIP file: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("No export.xml found in ZIP file")]
    MissingExport,

    #[error("Invalid export XML {0}")]
    Xml(String),
}

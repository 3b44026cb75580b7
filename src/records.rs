use std::path::Path;

use crate::error::Error;
use crate::layout::check_unique_indices;
use crate::model::Record;

/// Replace line breaks with spaces, collapse whitespace runs and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a JSON array of `{"index", "title", "body"}` objects, normalising both texts.
pub fn parse_records(json: &str) -> Result<Vec<Record>, Error> {
    let raw: Vec<Record> = serde_json::from_str(json)?;
    let records: Vec<Record> = raw
        .into_iter()
        .map(|r| Record::new(r.index, normalize_text(&r.title), normalize_text(&r.body)))
        .collect();
    check_unique_indices(&records)?;
    Ok(records)
}

pub fn load_records(path: &Path) -> Result<Vec<Record>, Error> {
    let json = std::fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
    let records = parse_records(&json)?;
    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

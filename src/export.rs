//! CSV export of labeled tokens.
//!
//! Two columns, `word` and `label`, one row per token in text order. The
//! file name and MIME type are fixed so download tooling and the serving
//! side agree without coordination.

use std::io::Write;
use std::path::Path;

use crate::bio::LabeledToken;
use crate::error::{Error, Result};

/// Default file name for the exported CSV.
pub const EXPORT_FILE_NAME: &str = "ner_labeled_text.csv";

/// MIME type for serving the exported CSV.
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Write labeled tokens as CSV to any writer.
///
/// Header first, then one `word,label` record per token. Fields are quoted
/// only when they need to be.
pub fn write_csv<W: Write>(tokens: &[LabeledToken], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["word", "label"])?;
    for token in tokens {
        let label = token.tag.label();
        csv_writer.write_record([token.text.as_str(), label.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render labeled tokens as an in-memory CSV string.
pub fn to_csv_string(tokens: &[LabeledToken]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(tokens, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| Error::invalid_input(format!("CSV output is not UTF-8: {e}")))
}

/// Write labeled tokens to a CSV file at `path`.
pub fn write_csv_file(tokens: &[LabeledToken], path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(tokens, file)
}

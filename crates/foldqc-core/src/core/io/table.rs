use crate::core::models::qc::ScoredRecord;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ScoredRow<'a> {
    path: String,
    model_id: &'a str,
    ptm: Option<f64>,
    iptm: Option<f64>,
}

/// Writes scanned records as CSV with a `path,model_id,ptm,iptm` header.
///
/// Scores that are missing or not numeric are written as empty cells.
pub fn write_scored_records_csv<'a, W, I>(writer: W, records: I) -> Result<usize, csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a ScoredRecord>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for record in records {
        csv_writer.serialize(ScoredRow {
            path: record.path.to_string_lossy().into_owned(),
            model_id: &record.model_id,
            ptm: record.ptm_score(),
            iptm: record.iptm_score(),
        })?;
        rows += 1;
    }
    if rows == 0 {
        csv_writer.write_record(["path", "model_id", "ptm", "iptm"])?;
    }
    csv_writer.flush()?;
    Ok(rows)
}

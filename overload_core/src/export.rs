//! CSV export of per-session exercise progress.

use crate::history::ProgressRecord;
use crate::streak::local_day;
use crate::Result;
use chrono::TimeZone;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    session_id: String,
    date: String,
    weight: f64,
    reps: u32,
    one_rep_max: i64,
}

impl CsvRow {
    fn new<Tz: TimeZone>(record: &ProgressRecord, tz: &Tz) -> Self {
        CsvRow {
            session_id: record.session_id.clone(),
            date: local_day(record.date, tz)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            weight: record.weight,
            reps: record.reps,
            one_rep_max: record.one_rep_max,
        }
    }
}

/// Write progress records to `csv_path`, replacing any existing file
///
/// Dates are written as local calendar days in `tz`. Returns the number of
/// rows written.
pub fn export_progress_csv<Tz: TimeZone>(
    records: &[ProgressRecord],
    csv_path: &Path,
    tz: &Tz,
) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);

    for record in records {
        writer.serialize(CsvRow::new(record, tz))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} progress records to {:?}", records.len(), csv_path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, date: i64, weight: f64, reps: u32, orm: i64) -> ProgressRecord {
        ProgressRecord {
            session_id: id.into(),
            date,
            weight,
            reps,
            one_rep_max: orm,
        }
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("out").join("bench.csv");

        // 2024-05-10T12:00:00Z
        let records = vec![
            record("a", 1_715_342_400_000, 80.0, 8, 101),
            record("b", 1_715_428_800_000, 82.5, 8, 104),
        ];
        let count = export_progress_csv(&records, &csv_path, &Utc).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["session_id", "date", "weight", "reps", "one_rep_max"]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "2024-05-10");
        assert_eq!(&rows[1][0], "b");
        assert_eq!(&rows[1][4], "104");
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("bench.csv");

        export_progress_csv(&[record("a", 0, 60.0, 5, 70)], &csv_path, &Utc).unwrap();
        export_progress_csv(&[], &csv_path, &Utc).unwrap();

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(!contents.contains("60"));
    }
}

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::records::{RecordCollection, Schema};

/// Destination for finished record collections.
pub trait RecordSink {
    fn write(&mut self, collection: &RecordCollection) -> Result<()>;
}

/// One CSV file per schema under `dir`, overwritten each run.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path_for(&self, schema: &Schema) -> PathBuf {
        self.dir.join(format!("{}.csv", schema.file_stem))
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, collection: &RecordCollection) -> Result<()> {
        let path = self.path_for(collection.schema);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(file, collection)?;
        info!("Wrote {} rows to {}", collection.records.len(), path.display());
        Ok(())
    }
}

/// Header row of field names, then one row per record. The header is written even when
/// the collection is empty.
pub fn write_csv<W: Write>(writer: W, collection: &RecordCollection) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(collection.schema.columns())?;
    for record in &collection.records {
        w.write_record(record.row())?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchStats;
    use crate::records::schemas::{MATCH, TEAM};
    use crate::records::PageRecord;

    fn team_record(name: &str, partnerships: &str) -> PageRecord {
        let values = ["Team Name", "Win Rate", "Loss Rate", "Partnerships", "Historical Performance"]
            .into_iter()
            .zip([name, "50%", "40%", partnerships, "Champions, twice"])
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        PageRecord {
            url: format!("https://a.com/team/{}", name),
            values,
        }
    }

    #[test]
    fn header_then_rows_in_order() {
        let collection = RecordCollection {
            schema: &TEAM,
            records: vec![team_record("India", "Strong"), team_record("Nepal", "Weak")],
            stats: BatchStats::default(),
        };
        let mut out = Vec::new();
        write_csv(&mut out, &collection).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Team Name,Win Rate,Loss Rate,Partnerships,Historical Performance"
        );
        assert_eq!(lines[1], "India,50%,40%,Strong,\"Champions, twice\"");
        assert!(lines[2].starts_with("Nepal,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_collection_writes_header_only() {
        let collection = RecordCollection {
            schema: &MATCH,
            records: Vec::new(),
            stats: BatchStats::default(),
        };
        let mut out = Vec::new();
        write_csv(&mut out, &collection).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Match ID,Team1,Team2,Toss Winner,Toss Decision,Pitch Type,Weather,Match Type,Outcome\n"
        );
    }

    #[test]
    fn file_names_follow_schema() {
        let sink = CsvSink {
            dir: PathBuf::from("out"),
        };
        assert_eq!(sink.path_for(&MATCH), PathBuf::from("out/match_data.csv"));
    }
}

//! Local record of analysis runs: a JSON-lines history file and CSV export.

use crate::error::Result;
use crate::model::{AnalysisOutcome, FashionInsight, VisionResult};
use crate::search::SimilarItems;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One persisted analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    /// URI or short description of the analyzed image.
    pub image: String,
    pub analyzed_at: DateTime<Utc>,
    pub analysis: VisionResult,
    pub fashion_insights: FashionInsight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar: Option<SimilarItems>,
}

impl AnalysisRecord {
    pub fn new(image: impl Into<String>, outcome: AnalysisOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: image.into(),
            analyzed_at: Utc::now(),
            analysis: outcome.analysis,
            fashion_insights: outcome.fashion_insights,
            similar: None,
        }
    }

    pub fn with_similar(mut self, similar: SimilarItems) -> Self {
        self.similar = Some(similar);
        self
    }
}

/// Append-only JSON-lines store.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &AnalysisRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// All readable records, oldest first. A missing file is an empty
    /// history; unparsable lines are skipped with a warning.
    pub fn load(&self) -> Result<Vec<AnalysisRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AnalysisRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "skipping history line {} in {}: {e}",
                        idx + 1,
                        self.path.display()
                    );
                }
            }
        }
        Ok(records)
    }

    /// The `limit` most recent records, newest first.
    pub fn latest(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let mut records = self.load()?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

fn join<T>(values: &[T], f: impl Fn(&T) -> &str) -> String {
    values.iter().map(f).collect::<Vec<_>>().join(";")
}

/// Export the provided records to CSV with headers:
/// image,analyzed_at,category,confidence,style,occasions,materials,colors
pub fn export_csv(records: &[AnalysisRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "image",
        "analyzed_at",
        "category",
        "confidence",
        "style",
        "occasions",
        "materials",
        "colors",
    ])?;

    for record in records {
        let insight = &record.fashion_insights;
        wtr.write_record([
            record.image.as_str(),
            record.analyzed_at.to_rfc3339().as_str(),
            insight.category.as_str(),
            format!("{}", insight.confidence).as_str(),
            join(&insight.style, |s| s.as_str()).as_str(),
            join(&insight.occasions, |o| o.as_str()).as_str(),
            join(&insight.materials, String::as_str).as_str(),
            join(&insight.colors, String::as_str).as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

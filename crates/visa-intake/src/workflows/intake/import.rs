//! Ingests the CSV export handed off by the catalog collection process.
//!
//! The collection pipeline itself lives outside this service; this module
//! only understands its export format and turns rows into catalog entries.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::catalog::{
    CatalogError, VisaCatalog, VisaCode, VisaPurpose, VisaStatus, VisaType,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read catalog export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {problem}")]
    Row { row: usize, problem: RowProblem },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Row-level reasons an export line cannot become a catalog entry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RowProblem {
    #[error("visa code is empty")]
    MissingCode,
    #[error("unknown purpose '{0}'")]
    UnknownPurpose(String),
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("confidence '{0}' is not a decimal in 0.0..=1.0")]
    InvalidConfidence(String),
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<VisaCatalog, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Duplicate codes keep the first row seen, matching how the export is
    /// produced (newest snapshot first).
    pub fn from_reader<R: Read>(reader: R) -> Result<VisaCatalog, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        let mut seen: BTreeSet<VisaCode> = BTreeSet::new();

        for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            // Header occupies line one.
            let row = index + 2;
            let parsed = record?;
            let entry = parsed
                .into_entry()
                .map_err(|problem| CatalogImportError::Row { row, problem })?;

            if seen.insert(entry.code.clone()) {
                entries.push(entry);
            }
        }

        Ok(VisaCatalog::new(entries)?)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Purpose")]
    purpose: String,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "Confidence")]
    confidence: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Question 1", default, deserialize_with = "empty_string_as_none")]
    question_1: Option<String>,
    #[serde(rename = "Question 2", default, deserialize_with = "empty_string_as_none")]
    question_2: Option<String>,
    #[serde(rename = "Question 3", default, deserialize_with = "empty_string_as_none")]
    question_3: Option<String>,
}

impl CatalogRow {
    fn into_entry(self) -> Result<VisaType, RowProblem> {
        let code = normalize(&self.code);
        if code.is_empty() {
            return Err(RowProblem::MissingCode);
        }

        let purpose = VisaPurpose::parse(&self.purpose)
            .ok_or_else(|| RowProblem::UnknownPurpose(self.purpose.clone()))?;

        let status = match self.status.as_deref().map(normalize) {
            None => VisaStatus::Active,
            Some(value) if value.eq_ignore_ascii_case("active") => VisaStatus::Active,
            Some(value) if value.eq_ignore_ascii_case("inactive") => VisaStatus::Inactive,
            Some(other) => return Err(RowProblem::UnknownStatus(other)),
        };

        let confidence = self
            .confidence
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|value| (0.0..=1.0).contains(value))
            .ok_or_else(|| RowProblem::InvalidConfidence(self.confidence.clone()))?;

        let qualifying_questions = [self.question_1, self.question_2, self.question_3]
            .into_iter()
            .flatten()
            .map(|question| normalize(&question))
            .filter(|question| !question.is_empty())
            .collect();

        Ok(VisaType {
            code: VisaCode::new(code),
            name: normalize(&self.name),
            description: self.description.trim().to_string(),
            status,
            purpose,
            confidence_score: confidence,
            qualifying_questions,
        })
    }
}

/// Strip a UTF-8 BOM and collapse surrounding whitespace; exports produced
/// on Windows routinely lead with one.
fn normalize(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

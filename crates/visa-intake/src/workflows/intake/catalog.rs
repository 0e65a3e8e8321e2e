use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog visa classifications (e.g. "H-1B").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisaCode(pub String);

impl VisaCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication state of a catalog entry. Only active entries narrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaStatus {
    Active,
    Inactive,
}

/// High-level travel intent used to seed a narrowing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaPurpose {
    Work,
    Study,
    Family,
    Humanitarian,
    Visit,
    Investment,
}

impl VisaPurpose {
    pub const ALL: [VisaPurpose; 6] = [
        VisaPurpose::Work,
        VisaPurpose::Study,
        VisaPurpose::Family,
        VisaPurpose::Humanitarian,
        VisaPurpose::Visit,
        VisaPurpose::Investment,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            VisaPurpose::Work => "work",
            VisaPurpose::Study => "study",
            VisaPurpose::Family => "family",
            VisaPurpose::Humanitarian => "humanitarian",
            VisaPurpose::Visit => "visit",
            VisaPurpose::Investment => "investment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" | "employment" => Some(VisaPurpose::Work),
            "study" | "education" => Some(VisaPurpose::Study),
            "family" => Some(VisaPurpose::Family),
            "humanitarian" | "asylum" => Some(VisaPurpose::Humanitarian),
            "visit" | "tourism" | "business" => Some(VisaPurpose::Visit),
            "investment" | "invest" => Some(VisaPurpose::Investment),
            _ => None,
        }
    }
}

/// Number of qualifying-question slots a catalog entry may carry.
pub const QUESTION_SLOTS: usize = 3;

/// One visa classification as published by the catalog collection process.
///
/// The description is informational only; eligibility is decided by the typed
/// rule table, never by inspecting this text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaType {
    pub code: VisaCode,
    pub name: String,
    pub description: String,
    pub status: VisaStatus,
    pub purpose: VisaPurpose,
    pub confidence_score: f32,
    pub qualifying_questions: Vec<String>,
}

impl VisaType {
    pub fn is_active(&self) -> bool {
        self.status == VisaStatus::Active
    }

    pub fn carries_question(&self, question: &str) -> bool {
        self.qualifying_questions
            .iter()
            .any(|candidate| candidate == question)
    }
}

/// Validation and lookup failures for catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate visa code {0}")]
    DuplicateCode(VisaCode),
    #[error("visa {code} declares {found} qualifying questions (limit {QUESTION_SLOTS})")]
    TooManyQuestions { code: VisaCode, found: usize },
    #[error("visa {code} confidence score {found} outside 0.0..=1.0")]
    ConfidenceOutOfRange { code: VisaCode, found: f32 },
    #[error("unknown visa code {0}")]
    UnknownCode(VisaCode),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only, in-memory view of the visa catalog.
///
/// Entries keep their insertion order; that order is what breaks ties during
/// question selection and confidence resolution, so it must stay stable for a
/// session to replay deterministically.
#[derive(Debug, Clone, Default)]
pub struct VisaCatalog {
    entries: Vec<VisaType>,
}

impl VisaCatalog {
    pub fn new(entries: Vec<VisaType>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.code.clone()) {
                return Err(CatalogError::DuplicateCode(entry.code.clone()));
            }
            if entry.qualifying_questions.len() > QUESTION_SLOTS {
                return Err(CatalogError::TooManyQuestions {
                    code: entry.code.clone(),
                    found: entry.qualifying_questions.len(),
                });
            }
            if !(0.0..=1.0).contains(&entry.confidence_score) {
                return Err(CatalogError::ConfidenceOutOfRange {
                    code: entry.code.clone(),
                    found: entry.confidence_score,
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn find(&self, code: &VisaCode) -> Option<&VisaType> {
        self.entries.iter().find(|entry| &entry.code == code)
    }

    pub fn active(&self) -> impl Iterator<Item = &VisaType> {
        self.entries.iter().filter(|entry| entry.is_active())
    }

    pub fn active_for_purpose(&self, purpose: VisaPurpose) -> Vec<&VisaType> {
        self.active()
            .filter(|entry| entry.purpose == purpose)
            .collect()
    }

    pub fn entries(&self) -> &[VisaType] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Built-in catalog mirroring the classifications the collection process
    /// publishes today. Used by demos, tests, and as the serve-time fallback
    /// when no CSV export is configured.
    pub fn standard() -> Self {
        Self {
            entries: standard_entries(),
        }
    }
}

/// Read-only catalog access so the engine can run against any backing store.
pub trait CatalogProvider: Send + Sync {
    fn list_active(&self, purpose: Option<VisaPurpose>) -> Result<Vec<VisaType>, CatalogError>;
    fn find(&self, code: &VisaCode) -> Result<Option<VisaType>, CatalogError>;
}

impl CatalogProvider for VisaCatalog {
    fn list_active(&self, purpose: Option<VisaPurpose>) -> Result<Vec<VisaType>, CatalogError> {
        Ok(self
            .active()
            .filter(|entry| purpose.map_or(true, |wanted| entry.purpose == wanted))
            .cloned()
            .collect())
    }

    fn find(&self, code: &VisaCode) -> Result<Option<VisaType>, CatalogError> {
        Ok(VisaCatalog::find(self, code).cloned())
    }
}

fn entry(
    code: &str,
    name: &str,
    description: &str,
    purpose: VisaPurpose,
    confidence_score: f32,
    questions: &[&str],
) -> VisaType {
    VisaType {
        code: VisaCode::new(code),
        name: name.to_string(),
        description: description.to_string(),
        status: VisaStatus::Active,
        purpose,
        confidence_score,
        qualifying_questions: questions.iter().map(|q| q.to_string()).collect(),
    }
}

fn standard_entries() -> Vec<VisaType> {
    vec![
        entry(
            "H-1B",
            "Specialty Occupation Worker",
            "Temporary employment in a specialty occupation requiring a bachelor's degree or higher.",
            VisaPurpose::Work,
            0.72,
            &[
                "Does your job require at least a bachelor's degree?",
                "Will your employer sponsor your petition?",
            ],
        ),
        entry(
            "L-1",
            "Intracompany Transferee",
            "Transfer within a multinational company to a managerial, executive, or specialized role.",
            VisaPurpose::Work,
            0.58,
            &[
                "Have you worked for your employer abroad for at least one year?",
                "Will your employer sponsor your petition?",
            ],
        ),
        entry(
            "O-1",
            "Individual of Extraordinary Ability",
            "Temporary work for individuals with extraordinary ability or achievement.",
            VisaPurpose::Work,
            0.41,
            &[
                "Have you received major national or international awards?",
                "Will your employer sponsor your petition?",
            ],
        ),
        entry(
            "TN",
            "USMCA Professional",
            "Professional employment for citizens of Canada and Mexico under the USMCA.",
            VisaPurpose::Work,
            0.66,
            &["Does your job require at least a bachelor's degree?"],
        ),
        entry(
            "EB-2",
            "Advanced Degree Professional",
            "Employment-based permanent residence for advanced degree holders or exceptional ability.",
            VisaPurpose::Work,
            0.54,
            &[
                "Do you intend to live in the United States permanently?",
                "Will your employer sponsor your petition?",
            ],
        ),
        entry(
            "EB-3",
            "Skilled Worker",
            "Employment-based permanent residence for skilled workers and professionals.",
            VisaPurpose::Work,
            0.49,
            &["Do you intend to live in the United States permanently?"],
        ),
        entry(
            "F-1",
            "Academic Student",
            "Full-time academic study at an accredited college, university, or language program.",
            VisaPurpose::Study,
            0.78,
            &[
                "Have you been accepted by a school that issues Form I-20?",
                "Will you study full time?",
            ],
        ),
        entry(
            "M-1",
            "Vocational Student",
            "Full-time enrollment in a vocational or other recognized nonacademic program.",
            VisaPurpose::Study,
            0.52,
            &["Will you study full time?"],
        ),
        entry(
            "J-1",
            "Exchange Visitor",
            "Participation in an approved exchange visitor program, including scholars and au pairs.",
            VisaPurpose::Study,
            0.61,
            &["Are you participating in a sponsored exchange program?"],
        ),
        entry(
            "IR-1",
            "Spouse of U.S. Citizen",
            "Immediate relative immigration for the spouse of a U.S. citizen.",
            VisaPurpose::Family,
            0.8,
            &[
                "Is your petitioning relative a U.S. citizen?",
                "Have you been married for at least two years?",
            ],
        ),
        entry(
            "CR-1",
            "Conditional Resident Spouse",
            "Conditional residence for a spouse married to a U.S. citizen for under two years.",
            VisaPurpose::Family,
            0.62,
            &["Is your petitioning relative a U.S. citizen?"],
        ),
        entry(
            "K-1",
            "Fiance of U.S. Citizen",
            "Entry to marry a U.S. citizen petitioner within ninety days of admission.",
            VisaPurpose::Family,
            0.67,
            &["Do you plan to marry within ninety days of arrival?"],
        ),
        entry(
            "F2A",
            "Spouse or Child of Permanent Resident",
            "Family preference immigration for spouses and minor children of permanent residents.",
            VisaPurpose::Family,
            0.55,
            &["Is your petitioning relative a lawful permanent resident?"],
        ),
        entry(
            "ASY",
            "Asylum",
            "Protection for individuals unable to return home due to persecution.",
            VisaPurpose::Humanitarian,
            0.7,
            &["Are you already inside the United States?"],
        ),
        entry(
            "REF",
            "Refugee Admission",
            "Resettlement processing for individuals outside the United States fleeing persecution.",
            VisaPurpose::Humanitarian,
            0.6,
            &["Have you registered with a resettlement agency abroad?"],
        ),
        entry(
            "B-1",
            "Business Visitor",
            "Short business trips such as meetings, negotiations, and conferences.",
            VisaPurpose::Visit,
            0.64,
            &["Is the primary purpose of your trip business?"],
        ),
        entry(
            "B-2",
            "Tourist Visitor",
            "Tourism, visiting family and friends, or medical treatment.",
            VisaPurpose::Visit,
            0.76,
            &["Is the primary purpose of your trip tourism or a family visit?"],
        ),
        entry(
            "VWP",
            "Visa Waiver Traveler",
            "Visa-free entry for up to ninety days for nationals of participating countries.",
            VisaPurpose::Visit,
            0.5,
            &["Is your stay ninety days or shorter?"],
        ),
        entry(
            "E-2",
            "Treaty Investor",
            "Direction of a substantial investment in a U.S. enterprise by a treaty national.",
            VisaPurpose::Investment,
            0.57,
            &["Will you direct the day-to-day operations of the business?"],
        ),
        entry(
            "EB-5",
            "Immigrant Investor",
            "Permanent residence through qualifying investment and job creation.",
            VisaPurpose::Investment,
            0.48,
            &["Do you intend to live in the United States permanently?"],
        ),
    ]
}

mod filter;
mod selector;

pub use filter::{AnswerFilter, ConfidenceResolver};
pub use selector::{BisectingSelector, QuestionSelector};

use serde::{Deserialize, Serialize};

use super::catalog::VisaCode;

/// Yes/no reply to a screening or qualifying question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Unsure,
}

impl Answer {
    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Unsure => "unsure",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Some(Answer::Yes),
            "no" | "n" | "false" => Some(Answer::No),
            "unsure" | "unknown" | "skip" => Some(Answer::Unsure),
            _ => None,
        }
    }
}

/// One qualifying question together with the answer that was applied to the
/// candidate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: Answer,
}

/// The mutable state of one in-progress narrowing: the visa codes still
/// under consideration, in catalog order, plus the filters already applied.
///
/// The set only ever shrinks or stays the same size from turn to turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    codes: Vec<VisaCode>,
    history: Vec<AnsweredQuestion>,
}

impl CandidateSet {
    pub fn new(codes: Vec<VisaCode>) -> Self {
        let mut deduped: Vec<VisaCode> = Vec::with_capacity(codes.len());
        for code in codes {
            if !deduped.contains(&code) {
                deduped.push(code);
            }
        }

        Self {
            codes: deduped,
            history: Vec::new(),
        }
    }

    pub fn codes(&self) -> &[VisaCode] {
        &self.codes
    }

    pub fn history(&self) -> &[AnsweredQuestion] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, code: &VisaCode) -> bool {
        self.codes.contains(code)
    }

    /// The one remaining candidate, when the set has narrowed to a single
    /// visa.
    pub fn sole_candidate(&self) -> Option<&VisaCode> {
        match self.codes.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Keep only candidates whose code starts with one of `prefixes`.
    /// History carries over unchanged; prefix restriction is a structural
    /// narrowing, not an answered question.
    pub fn restricted_to_prefixes(&self, prefixes: &[&str]) -> Self {
        Self {
            codes: self
                .codes
                .iter()
                .filter(|code| prefixes.iter().any(|prefix| code.as_str().starts_with(prefix)))
                .cloned()
                .collect(),
            history: self.history.clone(),
        }
    }

    pub(crate) fn filtered(
        &self,
        keep: impl Fn(&VisaCode) -> bool,
        answered: AnsweredQuestion,
    ) -> Self {
        let mut history = self.history.clone();
        history.push(answered);

        Self {
            codes: self.codes.iter().filter(|code| keep(code)).cloned().collect(),
            history,
        }
    }
}

use super::super::catalog::{VisaCatalog, VisaCode, VisaType};
use super::{Answer, AnsweredQuestion, CandidateSet};

/// Applies a user's answer to the candidate set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerFilter;

impl AnswerFilter {
    /// Yes keeps candidates that carry `question`, no keeps those that do
    /// not, and unsure leaves the set untouched so a user is never forced to
    /// guess. The result is always a subset of the input.
    pub fn apply(
        catalog: &VisaCatalog,
        candidates: &CandidateSet,
        question: &str,
        answer: Answer,
    ) -> CandidateSet {
        if answer == Answer::Unsure {
            return candidates.clone();
        }

        let carries = |code: &VisaCode| {
            catalog
                .find(code)
                .map(|visa| visa.carries_question(question))
                .unwrap_or(false)
        };

        candidates.filtered(
            |code| match answer {
                Answer::Yes => carries(code),
                Answer::No => !carries(code),
                Answer::Unsure => true,
            },
            AnsweredQuestion {
                question: question.to_string(),
                answer,
            },
        )
    }
}

/// Breaks ties when no remaining question can split the candidate set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceResolver;

impl ConfidenceResolver {
    /// The candidate with the highest confidence score; equal scores resolve
    /// to the candidate seen first in set (catalog) order. `None` only when
    /// no candidate code resolves against the catalog.
    pub fn resolve<'a>(
        catalog: &'a VisaCatalog,
        candidates: &CandidateSet,
    ) -> Option<&'a VisaType> {
        let mut best: Option<&VisaType> = None;

        for code in candidates.codes() {
            let Some(visa) = catalog.find(code) else {
                continue;
            };
            let improves = match best {
                None => true,
                Some(current) => visa.confidence_score > current.confidence_score,
            };
            if improves {
                best = Some(visa);
            }
        }

        best
    }
}

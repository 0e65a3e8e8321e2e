mod screens;

pub use screens::{ScreeningBlueprint, ScreeningQuestion, Subcategory};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{VisaCatalog, VisaCode, VisaPurpose, VisaType};
use super::eligibility::EligibilityFilter;
use super::narrowing::{
    Answer, AnswerFilter, CandidateSet, ConfidenceResolver, QuestionSelector,
};
use super::profile::UserProfile;

/// Step names accepted on the wire. Parsed leniently from the raw request so
/// an unrecognized name surfaces as a session error rather than a transport
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    PurposeClassification,
    DisqualifyingCheck,
    SubcategorySelection,
    QualifyingLoop,
    Complete,
}

impl SessionStep {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStep::PurposeClassification => "purpose_classification",
            SessionStep::DisqualifyingCheck => "disqualifying_check",
            SessionStep::SubcategorySelection => "subcategory_selection",
            SessionStep::QualifyingLoop => "qualifying_loop",
            SessionStep::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "purpose_classification" => Some(SessionStep::PurposeClassification),
            "disqualifying_check" => Some(SessionStep::DisqualifyingCheck),
            "subcategory_selection" => Some(SessionStep::SubcategorySelection),
            "qualifying_loop" => Some(SessionStep::QualifyingLoop),
            "complete" => Some(SessionStep::Complete),
            _ => None,
        }
    }
}

/// Terminal or per-turn result of the narrowing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrowingOutcome {
    Recommendation { code: VisaCode },
    NoMatch,
    NeedsQuestion { question: String },
}

/// Typed session state carried by the caller between stateless turns.
///
/// Each variant names exactly the fields its transition needs, so a missing
/// field is a type error instead of a runtime key miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionState {
    PurposeClassification,
    DisqualifyingCheck {
        purpose: VisaPurpose,
        screen_index: usize,
        candidates: CandidateSet,
    },
    SubcategorySelection {
        purpose: VisaPurpose,
        candidates: CandidateSet,
    },
    QualifyingLoop {
        candidates: CandidateSet,
        asked: Vec<String>,
        pending_question: Option<String>,
    },
    Complete {
        outcome: NarrowingOutcome,
    },
}

impl SessionState {
    /// The step a caller must send to advance this state.
    pub const fn expected_step(&self) -> SessionStep {
        match self {
            SessionState::PurposeClassification => SessionStep::PurposeClassification,
            SessionState::DisqualifyingCheck { .. } => SessionStep::DisqualifyingCheck,
            SessionState::SubcategorySelection { .. } => SessionStep::SubcategorySelection,
            SessionState::QualifyingLoop { .. } => SessionStep::QualifyingLoop,
            SessionState::Complete { .. } => SessionStep::Complete,
        }
    }
}

/// What kind of input the caller should render next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Purpose,
    Screening,
    Subcategory,
    Qualifying,
    Terminal,
}

/// One turn of the intake conversation, as submitted by the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TurnRequest {
    pub step: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub state: Option<SessionState>,
}

/// Recommendation payload for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationView {
    pub code: VisaCode,
    pub name: String,
    pub description: String,
    pub confidence: f32,
}

impl RecommendationView {
    fn from_visa(visa: &VisaType) -> Self {
        Self {
            code: visa.code.clone(),
            name: visa.name.clone(),
            description: visa.description.clone(),
            confidence: visa.confidence_score,
        }
    }
}

/// The engine's reply for one turn. The caller renders the prompt and sends
/// the state back verbatim with the next answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationView>,
    pub next_step: SessionStep,
    pub state: SessionState,
}

/// Fatal input errors for a turn. An empty candidate set is never an error;
/// it terminates the session as a no-match outcome.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unrecognized session step '{0}'")]
    InvalidStep(String),
    #[error("step '{step}' does not match the session phase expecting '{expected}'")]
    StepMismatch { step: String, expected: &'static str },
    #[error("unrecognized purpose '{0}'")]
    InvalidPurpose(String),
    #[error("unrecognized subcategory '{0}'")]
    InvalidSubcategory(String),
    #[error("answer '{0}' is not yes, no, or unsure")]
    InvalidAnswer(String),
    #[error("session step '{0}' requires an answer")]
    MissingAnswer(&'static str),
    #[error("recommended visa {0} is not in the catalog")]
    UnknownVisaCode(VisaCode),
}

const PURPOSE_PROMPT: &str = "What is the primary purpose of your travel to the United States?";
const ALTERNATIVE_PURPOSE_PROMPT: &str =
    "Based on your answer, that path is not available. Which other purpose fits your situation?";
const SUBCATEGORY_PROMPT: &str = "Which of these best matches your situation?";

/// Sequences eligibility filtering, screening, and the qualifying loop into
/// one conversation.
///
/// The session holds no mutable state: each turn is a pure function of the
/// submitted state, the profile, and the new answer, so identical inputs
/// replay to identical outcomes.
pub struct NarrowingSession<'a> {
    catalog: &'a VisaCatalog,
    filter: &'a EligibilityFilter,
    selector: &'a dyn QuestionSelector,
    screens: &'a ScreeningBlueprint,
    evaluated_on: NaiveDate,
}

impl<'a> NarrowingSession<'a> {
    pub fn new(
        catalog: &'a VisaCatalog,
        filter: &'a EligibilityFilter,
        selector: &'a dyn QuestionSelector,
        screens: &'a ScreeningBlueprint,
        evaluated_on: NaiveDate,
    ) -> Self {
        Self {
            catalog,
            filter,
            selector,
            screens,
            evaluated_on,
        }
    }

    /// The opening turn: ask for the travel purpose. Depends on nothing but
    /// the fixed purpose list, so no session data is required.
    pub fn begin() -> TurnResponse {
        TurnResponse {
            question_type: QuestionType::Purpose,
            question: Some(PURPOSE_PROMPT.to_string()),
            options: purpose_labels(&VisaPurpose::ALL),
            recommendation: None,
            next_step: SessionStep::PurposeClassification,
            state: SessionState::PurposeClassification,
        }
    }

    /// Apply one answer and produce the next prompt or a terminal outcome.
    pub fn advance(
        &self,
        profile: &UserProfile,
        request: TurnRequest,
    ) -> Result<TurnResponse, SessionError> {
        let step = SessionStep::parse(&request.step)
            .ok_or_else(|| SessionError::InvalidStep(request.step.clone()))?;
        let state = request.state.unwrap_or(SessionState::PurposeClassification);

        if step != state.expected_step() {
            return Err(SessionError::StepMismatch {
                step: request.step,
                expected: state.expected_step().label(),
            });
        }

        match state {
            SessionState::PurposeClassification => {
                self.classify_purpose(profile, request.answer.as_deref())
            }
            SessionState::DisqualifyingCheck {
                purpose,
                screen_index,
                candidates,
            } => self.apply_screen(purpose, screen_index, candidates, request.answer.as_deref()),
            SessionState::SubcategorySelection {
                purpose,
                candidates,
            } => self.select_subcategory(purpose, candidates, request.answer.as_deref()),
            SessionState::QualifyingLoop {
                candidates,
                asked,
                pending_question,
            } => self.apply_qualifying_answer(
                candidates,
                asked,
                pending_question,
                request.answer.as_deref(),
            ),
            // Terminal turns are idempotent: replaying the completed state
            // returns the same outcome.
            SessionState::Complete { outcome } => self.completed_response(outcome),
        }
    }

    fn classify_purpose(
        &self,
        profile: &UserProfile,
        answer: Option<&str>,
    ) -> Result<TurnResponse, SessionError> {
        let raw = answer.ok_or(SessionError::MissingAnswer("purpose_classification"))?;
        let purpose =
            VisaPurpose::parse(raw).ok_or_else(|| SessionError::InvalidPurpose(raw.to_string()))?;

        let candidates =
            self.filter
                .initial_candidates(self.catalog, purpose, profile, self.evaluated_on);
        debug!(
            purpose = purpose.label(),
            candidates = candidates.len(),
            "eligibility filtering complete"
        );

        if candidates.is_empty() {
            return Ok(no_match_response());
        }

        match self.screens.screens_for(purpose).first() {
            Some(first) => Ok(screening_response(purpose, 0, first, candidates)),
            None => Ok(self.subcategory_response(purpose, candidates)),
        }
    }

    fn apply_screen(
        &self,
        purpose: VisaPurpose,
        screen_index: usize,
        candidates: CandidateSet,
        answer: Option<&str>,
    ) -> Result<TurnResponse, SessionError> {
        let raw = answer.ok_or(SessionError::MissingAnswer("disqualifying_check"))?;
        let answer =
            Answer::parse(raw).ok_or_else(|| SessionError::InvalidAnswer(raw.to_string()))?;

        let screens = self.screens.screens_for(purpose);
        let Some(screen) = screens.get(screen_index) else {
            return Ok(self.subcategory_response(purpose, candidates));
        };

        if answer == screen.disqualifying_answer {
            debug!(
                purpose = purpose.label(),
                screen = screen.key,
                "purpose screened out"
            );
            let alternatives = self.screens.alternatives_to(purpose);
            return Ok(TurnResponse {
                question_type: QuestionType::Purpose,
                question: Some(ALTERNATIVE_PURPOSE_PROMPT.to_string()),
                options: purpose_labels(&alternatives),
                recommendation: None,
                next_step: SessionStep::PurposeClassification,
                state: SessionState::PurposeClassification,
            });
        }

        let next_index = screen_index + 1;
        match screens.get(next_index) {
            Some(next) => Ok(screening_response(purpose, next_index, next, candidates)),
            None => Ok(self.subcategory_response(purpose, candidates)),
        }
    }

    fn select_subcategory(
        &self,
        purpose: VisaPurpose,
        candidates: CandidateSet,
        answer: Option<&str>,
    ) -> Result<TurnResponse, SessionError> {
        let raw = answer.ok_or(SessionError::MissingAnswer("subcategory_selection"))?;
        let subcategory = self
            .screens
            .find_subcategory(purpose, raw)
            .ok_or_else(|| SessionError::InvalidSubcategory(raw.to_string()))?;

        let restricted = candidates.restricted_to_prefixes(subcategory.code_prefixes);
        self.qualifying_step(restricted, Vec::new())
    }

    fn apply_qualifying_answer(
        &self,
        candidates: CandidateSet,
        mut asked: Vec<String>,
        pending_question: Option<String>,
        answer: Option<&str>,
    ) -> Result<TurnResponse, SessionError> {
        let Some(question) = pending_question else {
            return self.qualifying_step(candidates, asked);
        };

        let raw = answer.ok_or(SessionError::MissingAnswer("qualifying_loop"))?;
        let answer =
            Answer::parse(raw).ok_or_else(|| SessionError::InvalidAnswer(raw.to_string()))?;

        let filtered = AnswerFilter::apply(self.catalog, &candidates, &question, answer);
        asked.push(question);

        self.qualifying_step(filtered, asked)
    }

    /// One pass of the narrowing loop over the current candidate set:
    /// terminal at zero or one candidate, otherwise the most discriminating
    /// remaining question, falling back to confidence resolution when
    /// nothing discriminates. Exactly one outcome per turn.
    pub fn narrow_once(
        &self,
        candidates: &CandidateSet,
        asked: &[String],
    ) -> Result<NarrowingOutcome, SessionError> {
        if candidates.is_empty() {
            return Ok(NarrowingOutcome::NoMatch);
        }

        if let Some(code) = candidates.sole_candidate() {
            if self.catalog.find(code).is_none() {
                return Err(SessionError::UnknownVisaCode(code.clone()));
            }
            return Ok(NarrowingOutcome::Recommendation { code: code.clone() });
        }

        match self.selector.select(candidates, self.catalog, asked) {
            Some(question) => Ok(NarrowingOutcome::NeedsQuestion { question }),
            None => {
                let visa = ConfidenceResolver::resolve(self.catalog, candidates).ok_or_else(
                    || SessionError::UnknownVisaCode(candidates.codes()[0].clone()),
                )?;
                debug!(code = %visa.code, "tie resolved by confidence score");
                Ok(NarrowingOutcome::Recommendation {
                    code: visa.code.clone(),
                })
            }
        }
    }

    fn qualifying_step(
        &self,
        candidates: CandidateSet,
        asked: Vec<String>,
    ) -> Result<TurnResponse, SessionError> {
        match self.narrow_once(&candidates, &asked)? {
            NarrowingOutcome::NoMatch => Ok(no_match_response()),
            NarrowingOutcome::Recommendation { code } => {
                let visa = self
                    .catalog
                    .find(&code)
                    .ok_or_else(|| SessionError::UnknownVisaCode(code.clone()))?;
                Ok(recommendation_response(visa))
            }
            NarrowingOutcome::NeedsQuestion { question } => Ok(TurnResponse {
                question_type: QuestionType::Qualifying,
                question: Some(question.clone()),
                options: answer_labels(),
                recommendation: None,
                next_step: SessionStep::QualifyingLoop,
                state: SessionState::QualifyingLoop {
                    candidates,
                    asked,
                    pending_question: Some(question),
                },
            }),
        }
    }

    fn subcategory_response(&self, purpose: VisaPurpose, candidates: CandidateSet) -> TurnResponse {
        let options = self
            .screens
            .subcategories_for(purpose)
            .iter()
            .map(|subcategory| subcategory.label.to_string())
            .collect();

        TurnResponse {
            question_type: QuestionType::Subcategory,
            question: Some(SUBCATEGORY_PROMPT.to_string()),
            options,
            recommendation: None,
            next_step: SessionStep::SubcategorySelection,
            state: SessionState::SubcategorySelection {
                purpose,
                candidates,
            },
        }
    }

    fn completed_response(&self, outcome: NarrowingOutcome) -> Result<TurnResponse, SessionError> {
        let recommendation = match &outcome {
            NarrowingOutcome::Recommendation { code } => {
                let visa = self
                    .catalog
                    .find(code)
                    .ok_or_else(|| SessionError::UnknownVisaCode(code.clone()))?;
                Some(RecommendationView::from_visa(visa))
            }
            _ => None,
        };

        Ok(TurnResponse {
            question_type: QuestionType::Terminal,
            question: None,
            options: Vec::new(),
            recommendation,
            next_step: SessionStep::Complete,
            state: SessionState::Complete { outcome },
        })
    }
}

fn purpose_labels(purposes: &[VisaPurpose]) -> Vec<String> {
    purposes
        .iter()
        .map(|purpose| purpose.label().to_string())
        .collect()
}

fn answer_labels() -> Vec<String> {
    vec![
        Answer::Yes.label().to_string(),
        Answer::No.label().to_string(),
        Answer::Unsure.label().to_string(),
    ]
}

fn screening_response(
    purpose: VisaPurpose,
    screen_index: usize,
    screen: &ScreeningQuestion,
    candidates: CandidateSet,
) -> TurnResponse {
    TurnResponse {
        question_type: QuestionType::Screening,
        question: Some(screen.text.to_string()),
        options: vec![
            Answer::Yes.label().to_string(),
            Answer::No.label().to_string(),
        ],
        recommendation: None,
        next_step: SessionStep::DisqualifyingCheck,
        state: SessionState::DisqualifyingCheck {
            purpose,
            screen_index,
            candidates,
        },
    }
}

fn no_match_response() -> TurnResponse {
    TurnResponse {
        question_type: QuestionType::Terminal,
        question: None,
        options: Vec::new(),
        recommendation: None,
        next_step: SessionStep::Complete,
        state: SessionState::Complete {
            outcome: NarrowingOutcome::NoMatch,
        },
    }
}

fn recommendation_response(visa: &VisaType) -> TurnResponse {
    TurnResponse {
        question_type: QuestionType::Terminal,
        question: None,
        options: Vec::new(),
        recommendation: Some(RecommendationView::from_visa(visa)),
        next_step: SessionStep::Complete,
        state: SessionState::Complete {
            outcome: NarrowingOutcome::Recommendation {
                code: visa.code.clone(),
            },
        },
    }
}

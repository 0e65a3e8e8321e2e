//! Visa intake narrowing workflow.
//!
//! Given an applicant profile and a stated travel purpose, the workflow
//! prunes the visa catalog with hard eligibility rules, screens out whole
//! purposes with knockout questions, then repeatedly asks the qualifying
//! question that best splits the remaining candidates until exactly one
//! recommendation (or none) is left.

pub mod catalog;
pub mod eligibility;
pub mod import;
pub mod narrowing;
pub mod profile;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{
    CatalogError, CatalogProvider, VisaCatalog, VisaCode, VisaPurpose, VisaStatus, VisaType,
    QUESTION_SLOTS,
};
pub use eligibility::{
    EligibilityFilter, EligibilityRule, EligibilityTable, MaritalRequirement, RuleSpec,
    RuleSpecError,
};
pub use import::{CatalogImportError, CatalogImporter};
pub use narrowing::{
    Answer, AnswerFilter, AnsweredQuestion, BisectingSelector, CandidateSet, ConfidenceResolver,
    QuestionSelector,
};
pub use profile::{EducationLevel, MaritalStatus, ProfileError, ProfileProvider, UserProfile};
pub use router::intake_router;
pub use service::{IntakeService, IntakeServiceError};
pub use session::{
    NarrowingOutcome, NarrowingSession, QuestionType, RecommendationView, ScreeningBlueprint,
    ScreeningQuestion, SessionError, SessionState, SessionStep, Subcategory, TurnRequest,
    TurnResponse,
};

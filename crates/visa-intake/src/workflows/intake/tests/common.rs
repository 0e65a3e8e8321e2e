use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::intake::catalog::{
    VisaCatalog, VisaCode, VisaPurpose, VisaStatus, VisaType,
};
use crate::workflows::intake::eligibility::{EligibilityFilter, EligibilityTable};
use crate::workflows::intake::narrowing::{BisectingSelector, CandidateSet};
use crate::workflows::intake::profile::{ProfileError, ProfileProvider, UserProfile};
use crate::workflows::intake::router::intake_router;
use crate::workflows::intake::service::IntakeService;
use crate::workflows::intake::session::{
    NarrowingSession, ScreeningBlueprint, SessionState, TurnRequest, TurnResponse,
};

pub(super) fn eval_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
}

pub(super) fn visa(
    code: &str,
    purpose: VisaPurpose,
    confidence: f32,
    questions: &[&str],
) -> VisaType {
    VisaType {
        code: VisaCode::new(code),
        name: format!("{code} classification"),
        description: format!("Synthetic catalog entry for {code}."),
        status: VisaStatus::Active,
        purpose,
        confidence_score: confidence,
        qualifying_questions: questions.iter().map(|q| q.to_string()).collect(),
    }
}

pub(super) fn candidate_set(codes: &[&str]) -> CandidateSet {
    CandidateSet::new(codes.iter().map(|code| VisaCode::new(*code)).collect())
}

pub(super) fn empty_profile() -> UserProfile {
    UserProfile::default()
}

pub(super) fn work_profile() -> UserProfile {
    UserProfile {
        citizenship_country: Some("Mexico".to_string()),
        has_job_offer: Some(true),
        ..UserProfile::default()
    }
}

/// Owns everything a `NarrowingSession` borrows so tests can build sessions
/// without wrestling lifetimes.
pub(super) struct Harness {
    pub(super) catalog: VisaCatalog,
    pub(super) filter: EligibilityFilter,
    selector: BisectingSelector,
    screens: ScreeningBlueprint,
}

impl Harness {
    pub(super) fn standard() -> Self {
        Self::with_catalog(VisaCatalog::standard(), EligibilityTable::standard())
    }

    pub(super) fn with_catalog(catalog: VisaCatalog, table: EligibilityTable) -> Self {
        Self {
            catalog,
            filter: EligibilityFilter::new(table),
            selector: BisectingSelector,
            screens: ScreeningBlueprint::standard(),
        }
    }

    pub(super) fn session(&self) -> NarrowingSession<'_> {
        NarrowingSession::new(
            &self.catalog,
            &self.filter,
            &self.selector,
            &self.screens,
            eval_date(),
        )
    }
}

pub(super) fn turn(step: &str, answer: &str, state: SessionState) -> TurnRequest {
    TurnRequest {
        step: step.to_string(),
        answer: Some(answer.to_string()),
        state: Some(state),
    }
}

/// Drive a session from its opening turn through the supplied answers,
/// returning the final response.
pub(super) fn drive(
    session: &NarrowingSession<'_>,
    profile: &UserProfile,
    answers: &[&str],
) -> TurnResponse {
    let mut response = NarrowingSession::begin();
    for answer in answers.iter().copied() {
        response = session
            .advance(
                profile,
                turn(response.next_step.label(), answer, response.state.clone()),
            )
            .expect("turn advances");
    }
    response
}

#[derive(Default, Clone)]
pub(super) struct MemoryProfiles {
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
}

impl MemoryProfiles {
    pub(super) fn insert(&self, user_id: &str, profile: UserProfile) {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .insert(user_id.to_string(), profile);
    }
}

impl ProfileProvider for MemoryProfiles {
    fn profile(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .get(user_id)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
    }
}

pub(super) fn build_service() -> (
    IntakeService<VisaCatalog, MemoryProfiles>,
    Arc<MemoryProfiles>,
) {
    let profiles = Arc::new(MemoryProfiles::default());
    let service = IntakeService::new(
        Arc::new(VisaCatalog::standard()),
        profiles.clone(),
        EligibilityTable::standard(),
    );
    (service, profiles)
}

pub(super) fn intake_router_with_service(
    service: IntakeService<VisaCatalog, MemoryProfiles>,
) -> axum::Router {
    intake_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

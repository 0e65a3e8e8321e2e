use std::sync::Arc;

use super::common::*;
use crate::workflows::intake::catalog::{CatalogError, CatalogProvider, VisaPurpose, VisaType};
use crate::workflows::intake::eligibility::EligibilityTable;
use crate::workflows::intake::profile::ProfileError;
use crate::workflows::intake::service::{IntakeService, IntakeServiceError};
use crate::workflows::intake::session::{QuestionType, SessionStep, TurnRequest};

fn advance_through(
    service: &IntakeService<crate::workflows::intake::catalog::VisaCatalog, MemoryProfiles>,
    user_id: &str,
    answers: &[&str],
) -> crate::workflows::intake::session::TurnResponse {
    let mut response = service.start();
    for answer in answers {
        response = service
            .turn(
                user_id,
                TurnRequest {
                    step: response.next_step.label().to_string(),
                    answer: Some(answer.to_string()),
                    state: Some(response.state.clone()),
                },
                eval_date(),
            )
            .expect("turn advances");
    }
    response
}

#[test]
fn service_runs_a_conversation_end_to_end() {
    let (service, profiles) = build_service();
    profiles.insert("user-1", work_profile());

    let response = advance_through(&service, "user-1", &["work", "no", "no", "temporary", "yes"]);

    assert_eq!(response.question_type, QuestionType::Terminal);
    assert_eq!(response.next_step, SessionStep::Complete);
    let recommendation = response.recommendation.expect("recommendation present");
    assert_eq!(recommendation.code.as_str(), "H-1B");
    assert!(!recommendation.description.is_empty());
}

#[test]
fn missing_profile_surfaces_as_not_found() {
    let (service, _profiles) = build_service();

    let error = service
        .turn(
            "stranger",
            TurnRequest {
                step: "purpose_classification".to_string(),
                answer: Some("work".to_string()),
                state: None,
            },
            eval_date(),
        )
        .expect_err("unknown user should fail");

    assert!(matches!(
        error,
        IntakeServiceError::Profile(ProfileError::NotFound(user)) if user == "stranger"
    ));
}

#[test]
fn session_errors_pass_through_untouched() {
    let (service, profiles) = build_service();
    profiles.insert("user-2", empty_profile());

    let error = service
        .turn(
            "user-2",
            TurnRequest {
                step: "moonwalk".to_string(),
                answer: None,
                state: None,
            },
            eval_date(),
        )
        .expect_err("bad step should fail");

    assert!(matches!(error, IntakeServiceError::Session(_)));
}

struct BrokenCatalog;

impl CatalogProvider for BrokenCatalog {
    fn list_active(&self, _purpose: Option<VisaPurpose>) -> Result<Vec<VisaType>, CatalogError> {
        Err(CatalogError::Unavailable("catalog store offline".to_string()))
    }

    fn find(&self, code: &crate::workflows::intake::catalog::VisaCode) -> Result<Option<VisaType>, CatalogError> {
        Err(CatalogError::UnknownCode(code.clone()))
    }
}

#[test]
fn catalog_outage_surfaces_as_catalog_error() {
    let profiles = Arc::new(MemoryProfiles::default());
    profiles.insert("user-3", work_profile());
    let service = IntakeService::new(
        Arc::new(BrokenCatalog),
        profiles,
        EligibilityTable::standard(),
    );

    let error = service
        .turn(
            "user-3",
            TurnRequest {
                step: "purpose_classification".to_string(),
                answer: Some("work".to_string()),
                state: None,
            },
            eval_date(),
        )
        .expect_err("outage should fail");

    assert!(matches!(
        error,
        IntakeServiceError::Catalog(CatalogError::Unavailable(_))
    ));
}

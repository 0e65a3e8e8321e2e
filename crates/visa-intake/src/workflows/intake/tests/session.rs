use super::common::*;
use crate::workflows::intake::catalog::{VisaCatalog, VisaPurpose};
use crate::workflows::intake::eligibility::EligibilityTable;
use crate::workflows::intake::narrowing::Answer;
use crate::workflows::intake::profile::{MaritalStatus, UserProfile};
use crate::workflows::intake::session::{
    NarrowingOutcome, NarrowingSession, QuestionType, SessionError, SessionState, SessionStep,
    TurnRequest,
};

#[test]
fn begin_asks_for_a_purpose_with_every_option() {
    let response = NarrowingSession::begin();

    assert_eq!(response.question_type, QuestionType::Purpose);
    assert_eq!(response.next_step, SessionStep::PurposeClassification);
    assert_eq!(response.state, SessionState::PurposeClassification);
    assert_eq!(
        response.options,
        vec![
            "work",
            "study",
            "family",
            "humanitarian",
            "visit",
            "investment"
        ]
    );
}

#[test]
fn work_conversation_narrows_to_a_single_recommendation() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let response = drive(&session, &profile, &["work", "no", "no", "temporary", "yes"]);

    assert_eq!(response.question_type, QuestionType::Terminal);
    let recommendation = response.recommendation.expect("recommendation present");
    assert_eq!(recommendation.code.as_str(), "H-1B");
    assert!(matches!(
        response.state,
        SessionState::Complete {
            outcome: NarrowingOutcome::Recommendation { .. }
        }
    ));
}

#[test]
fn answering_no_steers_to_the_other_half_of_the_split() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let response = drive(
        &session,
        &profile,
        &["work", "no", "no", "temporary", "no", "yes"],
    );

    let recommendation = response.recommendation.expect("recommendation present");
    assert_eq!(recommendation.code.as_str(), "L-1");
}

#[test]
fn unsure_leaves_the_set_intact_and_moves_to_the_next_question() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let after_unsure = drive(
        &session,
        &profile,
        &["work", "no", "no", "temporary", "unsure"],
    );

    assert_eq!(after_unsure.question_type, QuestionType::Qualifying);
    assert_eq!(
        after_unsure.question.as_deref(),
        Some("Will your employer sponsor your petition?")
    );
    match &after_unsure.state {
        SessionState::QualifyingLoop {
            candidates, asked, ..
        } => {
            assert_eq!(candidates.len(), 4, "unsure must not shrink the set");
            assert_eq!(asked.len(), 1);
        }
        other => panic!("expected qualifying loop, got {other:?}"),
    }

    let finished = drive(
        &session,
        &profile,
        &["work", "no", "no", "temporary", "unsure", "no"],
    );
    let recommendation = finished.recommendation.expect("recommendation present");
    assert_eq!(recommendation.code.as_str(), "TN");
}

#[test]
fn disqualifying_screen_returns_to_purpose_with_alternatives() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let response = drive(&session, &profile, &["work", "yes"]);

    assert_eq!(response.question_type, QuestionType::Purpose);
    assert_eq!(response.next_step, SessionStep::PurposeClassification);
    assert_eq!(response.options.len(), 5);
    assert!(!response.options.iter().any(|option| option == "work"));
}

#[test]
fn eligibility_wipeout_terminates_with_no_match() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = UserProfile {
        has_job_offer: Some(false),
        ..UserProfile::default()
    };

    let response = drive(&session, &profile, &["work"]);

    assert_eq!(response.question_type, QuestionType::Terminal);
    assert!(response.recommendation.is_none());
    assert_eq!(
        response.state,
        SessionState::Complete {
            outcome: NarrowingOutcome::NoMatch
        }
    );
}

#[test]
fn single_candidate_short_circuits_without_questions() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = UserProfile {
        marital_status: Some(MaritalStatus::Married),
        has_relatives_in_us: Some(true),
        ..UserProfile::default()
    };

    // The preference subcategory leaves exactly one candidate, so the
    // session must recommend it without entering the qualifying loop.
    let response = drive(&session, &profile, &["family", "yes", "preference"]);

    assert_eq!(response.question_type, QuestionType::Terminal);
    let recommendation = response.recommendation.expect("recommendation present");
    assert_eq!(recommendation.code.as_str(), "F2A");
}

#[test]
fn answer_filtering_can_empty_the_set_into_no_match() {
    const Q: &str = "Is your petition already approved?";
    let catalog = VisaCatalog::new(vec![
        visa("H-8", VisaPurpose::Work, 0.5, &[Q]),
        visa("H-9", VisaPurpose::Work, 0.6, &[Q]),
    ])
    .expect("valid catalog");
    let harness = Harness::with_catalog(catalog, EligibilityTable::default());
    let session = harness.session();

    let response = drive(
        &session,
        &empty_profile(),
        &["work", "no", "no", "temporary", "no"],
    );

    assert_eq!(
        response.state,
        SessionState::Complete {
            outcome: NarrowingOutcome::NoMatch
        }
    );
}

#[test]
fn identical_inputs_replay_to_identical_outcomes() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();
    let answers = ["work", "no", "no", "temporary", "unsure", "no"];

    let first = drive(&session, &profile, &answers);
    let second = drive(&session, &profile, &answers);

    assert_eq!(first, second);
}

#[test]
fn terminal_state_replays_idempotently() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let done = drive(&session, &profile, &["work", "no", "no", "temporary", "yes"]);
    let replayed = session
        .advance(
            &profile,
            TurnRequest {
                step: "complete".to_string(),
                answer: None,
                state: Some(done.state.clone()),
            },
        )
        .expect("terminal replay succeeds");

    assert_eq!(done, replayed);
}

#[test]
fn unrecognized_step_is_a_fatal_error() {
    let harness = Harness::standard();
    let session = harness.session();

    let error = session
        .advance(
            &empty_profile(),
            TurnRequest {
                step: "warp_drive".to_string(),
                answer: Some("work".to_string()),
                state: None,
            },
        )
        .expect_err("step should be rejected");

    assert!(matches!(error, SessionError::InvalidStep(step) if step == "warp_drive"));
}

#[test]
fn step_must_match_the_session_phase() {
    let harness = Harness::standard();
    let session = harness.session();

    let error = session
        .advance(
            &empty_profile(),
            TurnRequest {
                step: "qualifying_loop".to_string(),
                answer: Some("yes".to_string()),
                state: Some(SessionState::PurposeClassification),
            },
        )
        .expect_err("mismatched step should be rejected");

    assert!(matches!(
        error,
        SessionError::StepMismatch { expected, .. } if expected == "purpose_classification"
    ));
}

#[test]
fn unrecognized_purpose_is_a_fatal_error() {
    let harness = Harness::standard();
    let session = harness.session();

    let error = session
        .advance(
            &empty_profile(),
            turn(
                "purpose_classification",
                "retirement",
                SessionState::PurposeClassification,
            ),
        )
        .expect_err("purpose should be rejected");

    assert!(matches!(error, SessionError::InvalidPurpose(purpose) if purpose == "retirement"));
}

#[test]
fn screening_rejects_answers_outside_the_vocabulary() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let at_screen = drive(&session, &profile, &["work"]);
    let error = session
        .advance(
            &profile,
            turn("disqualifying_check", "maybe", at_screen.state),
        )
        .expect_err("answer should be rejected");

    assert!(matches!(error, SessionError::InvalidAnswer(answer) if answer == "maybe"));
}

#[test]
fn missing_answer_is_reported_with_the_step_name() {
    let harness = Harness::standard();
    let session = harness.session();

    let error = session
        .advance(
            &empty_profile(),
            TurnRequest {
                step: "purpose_classification".to_string(),
                answer: None,
                state: None,
            },
        )
        .expect_err("missing answer should be rejected");

    assert!(matches!(
        error,
        SessionError::MissingAnswer("purpose_classification")
    ));
}

#[test]
fn unknown_subcategory_is_a_fatal_error() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let at_subcategory = drive(&session, &profile, &["work", "no", "no"]);
    let error = session
        .advance(
            &profile,
            turn("subcategory_selection", "seasonal", at_subcategory.state),
        )
        .expect_err("subcategory should be rejected");

    assert!(matches!(error, SessionError::InvalidSubcategory(choice) if choice == "seasonal"));
}

#[test]
fn recommending_a_code_missing_from_the_catalog_fails() {
    let harness = Harness::standard();
    let session = harness.session();

    let error = session
        .advance(
            &empty_profile(),
            TurnRequest {
                step: "qualifying_loop".to_string(),
                answer: None,
                state: Some(SessionState::QualifyingLoop {
                    candidates: candidate_set(&["GHOST"]),
                    asked: Vec::new(),
                    pending_question: None,
                }),
            },
        )
        .expect_err("unknown code should be rejected");

    assert!(matches!(error, SessionError::UnknownVisaCode(code) if code.as_str() == "GHOST"));
}

#[test]
fn session_state_round_trips_through_json() {
    let state = SessionState::QualifyingLoop {
        candidates: candidate_set(&["H-1B", "TN"]),
        asked: vec!["Does your job require at least a bachelor's degree?".to_string()],
        pending_question: Some("Will your employer sponsor your petition?".to_string()),
    };

    let encoded = serde_json::to_string(&state).expect("state serializes");
    let decoded: SessionState = serde_json::from_str(&encoded).expect("state deserializes");

    assert_eq!(decoded, state);
}

#[test]
fn screening_answers_use_the_yes_no_vocabulary() {
    let harness = Harness::standard();
    let session = harness.session();
    let profile = work_profile();

    let at_screen = drive(&session, &profile, &["work"]);
    assert_eq!(at_screen.question_type, QuestionType::Screening);
    assert_eq!(
        at_screen.options,
        vec![Answer::Yes.label(), Answer::No.label()]
    );

    let at_question = drive(&session, &profile, &["work", "no", "no", "temporary"]);
    assert_eq!(at_question.question_type, QuestionType::Qualifying);
    assert_eq!(
        at_question.options,
        vec![
            Answer::Yes.label(),
            Answer::No.label(),
            Answer::Unsure.label()
        ]
    );
}

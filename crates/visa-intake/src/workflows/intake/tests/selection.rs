use super::common::*;
use crate::workflows::intake::catalog::{VisaCatalog, VisaPurpose};
use crate::workflows::intake::narrowing::{BisectingSelector, QuestionSelector};

const Q_SHARED: &str = "Do you have an approved petition?";
const Q_SPONSOR: &str = "Will your employer sponsor your petition?";
const Q_LONE: &str = "Have you won a major international award?";

fn catalog_of(questions_per_code: &[(&str, &[&str])]) -> VisaCatalog {
    let entries = questions_per_code
        .iter()
        .map(|(code, questions)| visa(code, VisaPurpose::Work, 0.5, questions))
        .collect();
    VisaCatalog::new(entries).expect("valid catalog")
}

#[test]
fn picks_the_question_closest_to_half_the_set() {
    let catalog = catalog_of(&[
        ("A-1", &[Q_SHARED, Q_SPONSOR]),
        ("A-2", &[Q_SHARED, Q_SPONSOR]),
        ("A-3", &[Q_SPONSOR]),
        ("A-4", &[Q_LONE]),
    ]);
    let candidates = candidate_set(&["A-1", "A-2", "A-3", "A-4"]);

    // Q_SHARED covers 2 of 4 (perfect split); Q_SPONSOR covers 3 of 4.
    let selected = BisectingSelector.select(&candidates, &catalog, &[]);
    assert_eq!(selected.as_deref(), Some(Q_SHARED));
}

#[test]
fn questions_on_a_single_candidate_cannot_discriminate() {
    let catalog = catalog_of(&[("A-1", &[Q_LONE]), ("A-2", &[Q_SHARED])]);
    let candidates = candidate_set(&["A-1", "A-2"]);

    assert_eq!(BisectingSelector.select(&candidates, &catalog, &[]), None);
}

#[test]
fn equal_distances_resolve_to_the_first_question_seen() {
    let first = "Shared question seen first?";
    let second = "Shared question seen second?";
    let catalog = catalog_of(&[
        ("A-1", &[first, second]),
        ("A-2", &[first, second]),
        ("A-3", &[]),
        ("A-4", &[]),
    ]);
    let candidates = candidate_set(&["A-1", "A-2", "A-3", "A-4"]);

    let selected = BisectingSelector.select(&candidates, &catalog, &[]);
    assert_eq!(selected.as_deref(), Some(first));
}

#[test]
fn already_asked_questions_are_skipped() {
    let catalog = catalog_of(&[
        ("A-1", &[Q_SHARED, Q_SPONSOR]),
        ("A-2", &[Q_SHARED, Q_SPONSOR]),
        ("A-3", &[Q_SPONSOR]),
        ("A-4", &[]),
    ]);
    let candidates = candidate_set(&["A-1", "A-2", "A-3", "A-4"]);

    let selected =
        BisectingSelector.select(&candidates, &catalog, &[Q_SHARED.to_string()]);
    assert_eq!(selected.as_deref(), Some(Q_SPONSOR));

    let exhausted = BisectingSelector.select(
        &candidates,
        &catalog,
        &[Q_SHARED.to_string(), Q_SPONSOR.to_string()],
    );
    assert_eq!(exhausted, None);
}

#[test]
fn prefers_the_balanced_split_over_a_lopsided_one() {
    let catalog = catalog_of(&[
        ("A-1", &[Q_SPONSOR, Q_SHARED]),
        ("A-2", &[Q_SPONSOR, Q_SHARED]),
        ("A-3", &[Q_SPONSOR, Q_SHARED]),
        ("A-4", &[Q_SPONSOR]),
        ("A-5", &[Q_SPONSOR]),
        ("A-6", &[Q_SPONSOR]),
    ]);
    let candidates = candidate_set(&["A-1", "A-2", "A-3", "A-4", "A-5", "A-6"]);

    // Q_SPONSOR covers all six; Q_SHARED covers exactly half.
    let selected = BisectingSelector.select(&candidates, &catalog, &[]);
    assert_eq!(selected.as_deref(), Some(Q_SHARED));
}

#[test]
fn candidates_missing_from_the_catalog_are_ignored() {
    let catalog = catalog_of(&[("A-1", &[Q_SHARED]), ("A-2", &[Q_SHARED])]);
    let candidates = candidate_set(&["A-1", "A-2", "GHOST"]);

    let selected = BisectingSelector.select(&candidates, &catalog, &[]);
    assert_eq!(selected.as_deref(), Some(Q_SHARED));
}

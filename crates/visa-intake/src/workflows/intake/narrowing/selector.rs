use std::collections::HashMap;

use super::super::catalog::VisaCatalog;
use super::CandidateSet;

/// Chooses the next qualifying question for a candidate set, or `None` when
/// no remaining question can split it.
///
/// Kept behind a trait so the greedy heuristic can be swapped for an
/// entropy-based selector without touching the session machinery.
pub trait QuestionSelector: Send + Sync {
    fn select(
        &self,
        candidates: &CandidateSet,
        catalog: &VisaCatalog,
        exclude: &[String],
    ) -> Option<String>;
}

/// Greedy binary-split heuristic.
///
/// Counts how many candidates carry each question, discards questions carried
/// by at most one candidate (they cannot discriminate) and questions already
/// asked, then picks the question whose carrier count is closest to half the
/// set, maximizing the worst-case reduction for either answer. Equal
/// distances resolve to the question encountered first walking candidates in
/// set order and slots in declaration order, which keeps replay
/// deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct BisectingSelector;

impl QuestionSelector for BisectingSelector {
    fn select(
        &self,
        candidates: &CandidateSet,
        catalog: &VisaCatalog,
        exclude: &[String],
    ) -> Option<String> {
        let mut first_seen: Vec<String> = Vec::new();
        let mut frequency: HashMap<String, usize> = HashMap::new();

        for code in candidates.codes() {
            let Some(visa) = catalog.find(code) else {
                continue;
            };
            for question in &visa.qualifying_questions {
                if exclude.iter().any(|asked| asked == question) {
                    continue;
                }
                if !frequency.contains_key(question) {
                    first_seen.push(question.clone());
                }
                *frequency.entry(question.clone()).or_insert(0) += 1;
            }
        }

        let total = candidates.len();
        let mut best: Option<(String, usize)> = None;

        for question in first_seen {
            let carriers = frequency[&question];
            if carriers <= 1 {
                continue;
            }

            // |carriers - total/2| without leaving integer arithmetic.
            let distance = (2 * carriers).abs_diff(total);
            let improves = match &best {
                None => true,
                Some((_, best_distance)) => distance < *best_distance,
            };
            if improves {
                best = Some((question, distance));
            }
        }

        best.map(|(question, _)| question)
    }
}

mod rules;
mod table;

pub use rules::{EligibilityRule, MaritalRequirement};
pub use table::{EligibilityTable, RuleSpec, RuleSpecError};

use chrono::NaiveDate;

use super::catalog::{VisaCatalog, VisaPurpose, VisaType};
use super::narrowing::CandidateSet;
use super::profile::UserProfile;

/// Stateless predicate evaluator that prunes the catalog to an initial
/// candidate set for one applicant.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    table: EligibilityTable,
}

impl EligibilityFilter {
    pub fn new(table: EligibilityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &EligibilityTable {
        &self.table
    }

    /// Whether `visa` survives every rule attached to its code. Rules are
    /// independent; the first failure short-circuits but the combination is
    /// commutative.
    pub fn is_eligible(&self, visa: &VisaType, profile: &UserProfile, on: NaiveDate) -> bool {
        if !visa.is_active() || self.table.is_quarantined(&visa.code) {
            return false;
        }

        self.table
            .rules_for(&visa.code)
            .iter()
            .all(|rule| rule.admits(profile, on))
    }

    /// Prune the active per-purpose listing down to the initial candidate
    /// set, preserving catalog order.
    pub fn initial_candidates(
        &self,
        catalog: &VisaCatalog,
        purpose: VisaPurpose,
        profile: &UserProfile,
        on: NaiveDate,
    ) -> CandidateSet {
        let codes = catalog
            .active_for_purpose(purpose)
            .into_iter()
            .filter(|visa| self.is_eligible(visa, profile, on))
            .map(|visa| visa.code.clone())
            .collect();

        CandidateSet::new(codes)
    }
}

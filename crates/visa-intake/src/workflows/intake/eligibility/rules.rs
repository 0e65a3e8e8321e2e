use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::profile::UserProfile;

/// Marital requirement carried by fiance- and spouse-track programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalRequirement {
    Unmarried,
    Married,
}

/// Typed eligibility predicate evaluated against the applicant profile.
///
/// Missing-data policy, held invariant across the table:
/// - `CitizenshipIn` rejects when citizenship is undeclared (fail-closed; a
///   country-gated program cannot be confirmed without knowing citizenship);
/// - every other rule passes when its governing attribute is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityRule {
    CitizenshipIn { countries: Vec<String> },
    MinimumAge { years: u8 },
    MaximumAge { years: u8 },
    RequiresMaritalStatus { requirement: MaritalRequirement },
    RequiresAdvancedDegree,
    RequiresJobOffer,
    RequiresRelativesInUs,
    RequiresFearOfPersecution,
    RequiresCleanVisaRecord,
}

impl EligibilityRule {
    pub fn admits(&self, profile: &UserProfile, on: NaiveDate) -> bool {
        match self {
            EligibilityRule::CitizenshipIn { countries } => {
                profile.citizenship_in(countries).unwrap_or(false)
            }
            EligibilityRule::MinimumAge { years } => {
                profile.age_on(on).map(|age| age >= *years).unwrap_or(true)
            }
            EligibilityRule::MaximumAge { years } => {
                profile.age_on(on).map(|age| age <= *years).unwrap_or(true)
            }
            EligibilityRule::RequiresMaritalStatus { requirement } => {
                match (requirement, profile.marital_status) {
                    (_, None) => true,
                    (MaritalRequirement::Unmarried, Some(status)) => !status.is_married(),
                    (MaritalRequirement::Married, Some(status)) => status.is_married(),
                }
            }
            EligibilityRule::RequiresAdvancedDegree => profile
                .education_level
                .map(|level| level.is_advanced_degree())
                .unwrap_or(true),
            EligibilityRule::RequiresJobOffer => profile.has_job_offer.unwrap_or(true),
            EligibilityRule::RequiresRelativesInUs => profile.has_relatives_in_us.unwrap_or(true),
            EligibilityRule::RequiresFearOfPersecution => {
                profile.fear_of_persecution.unwrap_or(true)
            }
            EligibilityRule::RequiresCleanVisaRecord => {
                !profile.has_past_visa_denials.unwrap_or(false)
            }
        }
    }
}

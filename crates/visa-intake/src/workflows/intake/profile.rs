use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Declared marital status. Fiance-track programs require "not married";
/// spouse-track programs require "married".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub const fn is_married(self) -> bool {
        matches!(self, MaritalStatus::Married)
    }
}

/// Highest education credential the applicant declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelors,
    Masters,
    Doctorate,
    Professional,
}

impl EducationLevel {
    /// Graduate or professional credential, as required by advanced-degree
    /// programs.
    pub const fn is_advanced_degree(self) -> bool {
        matches!(
            self,
            EducationLevel::Masters | EducationLevel::Doctorate | EducationLevel::Professional
        )
    }
}

/// The applicant's declared facts, supplied once per session by the profile
/// store and read-only to the engine.
///
/// Every attribute is optional. An absent attribute means "unknown" and never
/// disqualifies a candidate on its own; only a present, disqualifying value
/// rejects. Citizenship-gated programs are the documented exception; see the
/// eligibility rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub citizenship_country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub marital_status: Option<MaritalStatus>,
    pub education_level: Option<EducationLevel>,
    pub has_job_offer: Option<bool>,
    pub has_relatives_in_us: Option<bool>,
    pub fear_of_persecution: Option<bool>,
    pub has_past_visa_denials: Option<bool>,
    pub has_status_violations: Option<bool>,
}

impl UserProfile {
    /// Whole years completed as of `on`; `None` when the birth date is
    /// unknown or lies in the future of `on`.
    pub fn age_on(&self, on: NaiveDate) -> Option<u8> {
        let born = self.date_of_birth?;
        if born > on {
            return None;
        }

        let mut years = on.year() - born.year();
        if (on.month(), on.day()) < (born.month(), born.day()) {
            years -= 1;
        }

        u8::try_from(years).ok()
    }

    /// Whether the declared citizenship is one of `countries`, compared
    /// case-insensitively. `None` when citizenship is undeclared.
    pub fn citizenship_in(&self, countries: &[String]) -> Option<bool> {
        self.citizenship_country.as_deref().map(|declared| {
            countries
                .iter()
                .any(|country| country.trim().eq_ignore_ascii_case(declared.trim()))
        })
    }
}

/// Read-only profile access so the engine can run against any profile store.
pub trait ProfileProvider: Send + Sync {
    fn profile(&self, user_id: &str) -> Result<UserProfile, ProfileError>;
}

/// Error enumeration for profile store failures.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("no profile found for user {0}")]
    NotFound(String),
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

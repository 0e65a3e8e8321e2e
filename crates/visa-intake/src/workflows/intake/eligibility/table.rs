use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::catalog::VisaCode;
use super::rules::{EligibilityRule, MaritalRequirement};

/// Externally supplied rule description.
///
/// Kept separate from the typed enum so a single malformed entry can be
/// quarantined instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub visa_code: String,
    pub rule: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub years: Option<u8>,
    #[serde(default)]
    pub requirement: Option<String>,
}

/// Why a rule specification could not be understood.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuleSpecError {
    #[error("unknown rule kind '{0}'")]
    UnknownKind(String),
    #[error("citizenship rule lists no countries")]
    EmptyCountryList,
    #[error("age rule is missing a year bound")]
    MissingYears,
    #[error("marital rule requirement '{0}' not recognized")]
    UnknownRequirement(String),
}

fn parse_spec(spec: &RuleSpec) -> Result<EligibilityRule, RuleSpecError> {
    match spec.rule.trim().to_ascii_lowercase().as_str() {
        "citizenship_in" => {
            if spec.countries.is_empty() {
                return Err(RuleSpecError::EmptyCountryList);
            }
            Ok(EligibilityRule::CitizenshipIn {
                countries: spec.countries.clone(),
            })
        }
        "minimum_age" => spec
            .years
            .map(|years| EligibilityRule::MinimumAge { years })
            .ok_or(RuleSpecError::MissingYears),
        "maximum_age" => spec
            .years
            .map(|years| EligibilityRule::MaximumAge { years })
            .ok_or(RuleSpecError::MissingYears),
        "marital_status" => match spec.requirement.as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("married") => {
                Ok(EligibilityRule::RequiresMaritalStatus {
                    requirement: MaritalRequirement::Married,
                })
            }
            Some(value) if value.eq_ignore_ascii_case("unmarried") => {
                Ok(EligibilityRule::RequiresMaritalStatus {
                    requirement: MaritalRequirement::Unmarried,
                })
            }
            Some(other) => Err(RuleSpecError::UnknownRequirement(other.to_string())),
            None => Err(RuleSpecError::UnknownRequirement(String::new())),
        },
        "advanced_degree" => Ok(EligibilityRule::RequiresAdvancedDegree),
        "job_offer" => Ok(EligibilityRule::RequiresJobOffer),
        "relatives_in_us" => Ok(EligibilityRule::RequiresRelativesInUs),
        "fear_of_persecution" => Ok(EligibilityRule::RequiresFearOfPersecution),
        "clean_visa_record" => Ok(EligibilityRule::RequiresCleanVisaRecord),
        other => Err(RuleSpecError::UnknownKind(other.to_string())),
    }
}

/// Per-visa eligibility rules plus the set of codes whose external rule
/// specifications could not be understood.
///
/// Quarantined codes are excluded from narrowing entirely: admitting an
/// applicant to a program whose requirements we failed to parse is the worse
/// failure mode, so ambiguity resolves to rejection.
#[derive(Debug, Clone, Default)]
pub struct EligibilityTable {
    rules: BTreeMap<VisaCode, Vec<EligibilityRule>>,
    quarantined: BTreeSet<VisaCode>,
}

impl EligibilityTable {
    pub fn rules_for(&self, code: &VisaCode) -> &[EligibilityRule] {
        self.rules.get(code).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_quarantined(&self, code: &VisaCode) -> bool {
        self.quarantined.contains(code)
    }

    pub fn quarantined(&self) -> impl Iterator<Item = &VisaCode> {
        self.quarantined.iter()
    }

    pub fn insert(&mut self, code: VisaCode, rule: EligibilityRule) {
        self.rules.entry(code).or_default().push(rule);
    }

    /// Build a table from externally supplied specifications. A spec that
    /// fails to parse quarantines its visa code and discards any rules
    /// already collected for it.
    pub fn from_specs(specs: &[RuleSpec]) -> Self {
        let mut table = Self::default();

        for spec in specs {
            let code = VisaCode::new(spec.visa_code.trim());
            if table.quarantined.contains(&code) {
                continue;
            }

            match parse_spec(spec) {
                Ok(rule) => table.insert(code, rule),
                Err(reason) => {
                    warn!(visa = %code, %reason, "quarantining visa with unparseable rule");
                    table.rules.remove(&code);
                    table.quarantined.insert(code);
                }
            }
        }

        table
    }

    /// Built-in rule set for the standard catalog.
    pub fn standard() -> Self {
        let mut table = Self::default();

        for code in ["H-1B", "L-1", "O-1", "TN", "EB-2", "EB-3"] {
            table.insert(VisaCode::new(code), EligibilityRule::RequiresJobOffer);
        }
        table.insert(
            VisaCode::new("TN"),
            EligibilityRule::CitizenshipIn {
                countries: vec!["Canada".to_string(), "Mexico".to_string()],
            },
        );
        table.insert(
            VisaCode::new("EB-2"),
            EligibilityRule::RequiresAdvancedDegree,
        );

        table.insert(
            VisaCode::new("K-1"),
            EligibilityRule::RequiresMaritalStatus {
                requirement: MaritalRequirement::Unmarried,
            },
        );
        table.insert(VisaCode::new("K-1"), EligibilityRule::MinimumAge { years: 18 });
        for code in ["IR-1", "CR-1", "F2A"] {
            table.insert(
                VisaCode::new(code),
                EligibilityRule::RequiresMaritalStatus {
                    requirement: MaritalRequirement::Married,
                },
            );
            table.insert(VisaCode::new(code), EligibilityRule::RequiresRelativesInUs);
        }
        table.insert(VisaCode::new("K-1"), EligibilityRule::RequiresRelativesInUs);

        for code in ["ASY", "REF"] {
            table.insert(
                VisaCode::new(code),
                EligibilityRule::RequiresFearOfPersecution,
            );
        }

        table.insert(
            VisaCode::new("VWP"),
            EligibilityRule::RequiresCleanVisaRecord,
        );

        for code in ["E-2", "EB-5"] {
            table.insert(VisaCode::new(code), EligibilityRule::MinimumAge { years: 18 });
        }

        table
    }
}

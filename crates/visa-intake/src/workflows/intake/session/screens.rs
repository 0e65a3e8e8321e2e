use serde::Serialize;

use super::super::catalog::VisaPurpose;
use super::super::narrowing::Answer;

/// One purpose-level knockout question. Answering with the disqualifying
/// answer removes the whole purpose from consideration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreeningQuestion {
    pub key: &'static str,
    pub text: &'static str,
    pub disqualifying_answer: Answer,
}

/// Subcategory choice offered after screening, matched against visa code
/// prefixes within the purpose's candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Subcategory {
    pub key: &'static str,
    pub label: &'static str,
    pub code_prefixes: &'static [&'static str],
}

#[derive(Debug)]
struct PurposeTrack {
    purpose: VisaPurpose,
    screens: Vec<ScreeningQuestion>,
    subcategories: Vec<Subcategory>,
}

/// Fixed per-purpose screening questions and subcategory choices.
#[derive(Debug)]
pub struct ScreeningBlueprint {
    tracks: Vec<PurposeTrack>,
}

impl ScreeningBlueprint {
    pub fn standard() -> Self {
        Self {
            tracks: standard_tracks(),
        }
    }

    pub fn screens_for(&self, purpose: VisaPurpose) -> &[ScreeningQuestion] {
        self.track(purpose)
            .map(|track| track.screens.as_slice())
            .unwrap_or_default()
    }

    pub fn subcategories_for(&self, purpose: VisaPurpose) -> &[Subcategory] {
        self.track(purpose)
            .map(|track| track.subcategories.as_slice())
            .unwrap_or_default()
    }

    /// Look up a subcategory by key or label, case-insensitively.
    pub fn find_subcategory(&self, purpose: VisaPurpose, choice: &str) -> Option<&Subcategory> {
        let wanted = choice.trim();
        self.subcategories_for(purpose).iter().find(|subcategory| {
            subcategory.key.eq_ignore_ascii_case(wanted)
                || subcategory.label.eq_ignore_ascii_case(wanted)
        })
    }

    /// The purposes to suggest after `failed` is screened out, in the fixed
    /// classification order.
    pub fn alternatives_to(&self, failed: VisaPurpose) -> Vec<VisaPurpose> {
        VisaPurpose::ALL
            .into_iter()
            .filter(|purpose| *purpose != failed)
            .collect()
    }

    fn track(&self, purpose: VisaPurpose) -> Option<&PurposeTrack> {
        self.tracks.iter().find(|track| track.purpose == purpose)
    }
}

fn standard_tracks() -> Vec<PurposeTrack> {
    vec![
        PurposeTrack {
            purpose: VisaPurpose::Work,
            screens: vec![
                ScreeningQuestion {
                    key: "work_status_violation",
                    text: "Have you ever violated the terms of a U.S. visa or overstayed a period of admission?",
                    disqualifying_answer: Answer::Yes,
                },
                ScreeningQuestion {
                    key: "work_admission_bar",
                    text: "Are you currently subject to a bar on admission to the United States?",
                    disqualifying_answer: Answer::Yes,
                },
            ],
            subcategories: vec![
                Subcategory {
                    key: "temporary",
                    label: "Temporary worker (H, L, O, TN)",
                    code_prefixes: &["H", "L", "O", "TN"],
                },
                Subcategory {
                    key: "permanent",
                    label: "Employment-based permanent residence (EB)",
                    code_prefixes: &["EB"],
                },
            ],
        },
        PurposeTrack {
            purpose: VisaPurpose::Study,
            screens: vec![
                ScreeningQuestion {
                    key: "study_return_intent",
                    text: "Do you intend to return to your home country when your program ends?",
                    disqualifying_answer: Answer::No,
                },
                ScreeningQuestion {
                    key: "study_status_violation",
                    text: "Have you ever violated the terms of a U.S. student visa?",
                    disqualifying_answer: Answer::Yes,
                },
            ],
            subcategories: vec![
                Subcategory {
                    key: "academic",
                    label: "Academic study (F)",
                    code_prefixes: &["F"],
                },
                Subcategory {
                    key: "vocational",
                    label: "Vocational training (M)",
                    code_prefixes: &["M"],
                },
                Subcategory {
                    key: "exchange",
                    label: "Exchange program (J)",
                    code_prefixes: &["J"],
                },
            ],
        },
        PurposeTrack {
            purpose: VisaPurpose::Family,
            screens: vec![ScreeningQuestion {
                key: "family_petitioner",
                text: "Is a relative who is a U.S. citizen or lawful permanent resident willing to petition for you?",
                disqualifying_answer: Answer::No,
            }],
            subcategories: vec![
                Subcategory {
                    key: "immediate",
                    label: "Spouse or fiance of a U.S. citizen (IR, CR, K)",
                    code_prefixes: &["IR", "CR", "K"],
                },
                Subcategory {
                    key: "preference",
                    label: "Relative of a permanent resident (F2)",
                    code_prefixes: &["F2"],
                },
            ],
        },
        PurposeTrack {
            purpose: VisaPurpose::Humanitarian,
            screens: vec![ScreeningQuestion {
                key: "humanitarian_persecution",
                text: "Do you fear persecution in your home country on account of race, religion, nationality, political opinion, or membership in a particular social group?",
                disqualifying_answer: Answer::No,
            }],
            subcategories: vec![Subcategory {
                key: "protection",
                label: "Asylum or refugee protection",
                code_prefixes: &["ASY", "REF"],
            }],
        },
        PurposeTrack {
            purpose: VisaPurpose::Visit,
            screens: vec![ScreeningQuestion {
                key: "visit_immigrant_intent",
                text: "Do you intend to remain in the United States permanently?",
                disqualifying_answer: Answer::Yes,
            }],
            subcategories: vec![
                Subcategory {
                    key: "business",
                    label: "Business trip (B-1)",
                    code_prefixes: &["B-1"],
                },
                Subcategory {
                    key: "tourism",
                    label: "Tourism or family visit (B-2, visa waiver)",
                    code_prefixes: &["B-2", "VWP"],
                },
            ],
        },
        PurposeTrack {
            purpose: VisaPurpose::Investment,
            screens: vec![ScreeningQuestion {
                key: "investment_lawful_funds",
                text: "Do you have lawfully obtained funds available to invest in a U.S. business?",
                disqualifying_answer: Answer::No,
            }],
            subcategories: vec![
                Subcategory {
                    key: "treaty",
                    label: "Treaty investor (E-2)",
                    code_prefixes: &["E-2"],
                },
                Subcategory {
                    key: "immigrant",
                    label: "Immigrant investor (EB-5)",
                    code_prefixes: &["EB-5"],
                },
            ],
        },
    ]
}

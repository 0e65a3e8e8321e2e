use crate::infra::{parse_date, InMemoryProfileStore};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use visa_intake::error::AppError;
use visa_intake::workflows::intake::{
    CatalogImporter, EducationLevel, EligibilityTable, IntakeService, MaritalStatus,
    QuestionType, SessionState, TurnRequest, TurnResponse, UserProfile, VisaCatalog,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional catalog CSV export to narrow against instead of the built-in
    /// catalog.
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Travel purpose to classify under (work, study, family, humanitarian,
    /// visit, investment)
    #[arg(long)]
    pub(crate) purpose: String,
    /// Subcategory choice; defaults to the first offered option
    #[arg(long)]
    pub(crate) subcategory: Option<String>,
    /// Answers consumed in order by screening and qualifying questions;
    /// missing answers default to "unsure"
    #[arg(long = "answer")]
    pub(crate) answers: Vec<String>,
    /// Citizenship country
    #[arg(long)]
    pub(crate) citizenship: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date_of_birth: Option<NaiveDate>,
    /// Marital status (single, married, divorced, widowed)
    #[arg(long, value_parser = parse_marital)]
    pub(crate) marital_status: Option<MaritalStatus>,
    /// Highest education level (high_school, associate, bachelors, masters,
    /// doctorate, professional)
    #[arg(long, value_parser = parse_education)]
    pub(crate) education: Option<EducationLevel>,
    /// Whether a U.S. employer has extended a job offer
    #[arg(long)]
    pub(crate) job_offer: Option<bool>,
    /// Whether qualifying relatives live in the United States
    #[arg(long)]
    pub(crate) relatives_in_us: Option<bool>,
    /// Whether the applicant fears persecution at home
    #[arg(long)]
    pub(crate) fear_of_persecution: Option<bool>,
    /// Whether the applicant has past visa denials
    #[arg(long)]
    pub(crate) past_visa_denials: Option<bool>,
    /// Whether the applicant has violated visa status before
    #[arg(long)]
    pub(crate) status_violations: Option<bool>,
    /// Optional catalog CSV export
    #[arg(long)]
    pub(crate) catalog_csv: Option<PathBuf>,
}

fn parse_marital(raw: &str) -> Result<MaritalStatus, String> {
    serde_json::from_value(serde_json::Value::String(
        raw.trim().to_ascii_lowercase(),
    ))
    .map_err(|_| format!("unknown marital status '{raw}'"))
}

fn parse_education(raw: &str) -> Result<EducationLevel, String> {
    serde_json::from_value(serde_json::Value::String(
        raw.trim().to_ascii_lowercase(),
    ))
    .map_err(|_| format!("unknown education level '{raw}'"))
}

fn load_catalog(path: &Option<PathBuf>) -> Result<VisaCatalog, AppError> {
    match path {
        Some(path) => Ok(CatalogImporter::from_path(path)?),
        None => Ok(VisaCatalog::standard()),
    }
}

fn build_service(
    catalog: VisaCatalog,
    profile: UserProfile,
) -> IntakeService<VisaCatalog, InMemoryProfileStore> {
    let profiles = Arc::new(InMemoryProfileStore::default());
    profiles.upsert("applicant", profile);
    IntakeService::new(Arc::new(catalog), profiles, EligibilityTable::standard())
}

/// Feed `purpose`, then screening/qualifying answers, into the service until
/// the conversation terminates, narrating each exchange.
fn converse(
    service: &IntakeService<VisaCatalog, InMemoryProfileStore>,
    purpose: &str,
    subcategory: Option<&str>,
    answers: &[String],
) -> Result<TurnResponse, AppError> {
    let today = Local::now().date_naive();
    let mut remaining = answers.iter();

    let mut response = service.start();
    let mut next_answer = Some(purpose.to_string());

    // A conversation over a finite catalog cannot need more turns than the
    // question pool allows; the cap is a backstop against a bad catalog.
    for _ in 0..64 {
        let Some(answer) = next_answer.take() else {
            break;
        };
        if let Some(question) = &response.question {
            println!("? {question}");
        }
        println!("> {answer}");

        response = service.turn(
            "applicant",
            TurnRequest {
                step: response.next_step.label().to_string(),
                answer: Some(answer),
                state: Some(response.state.clone()),
            },
            today,
        )?;

        next_answer = match response.question_type {
            QuestionType::Terminal => None,
            // The purpose was screened out; stop and show the alternatives.
            QuestionType::Purpose => None,
            QuestionType::Subcategory => Some(
                subcategory
                    .map(str::to_string)
                    .or_else(|| response.options.first().cloned())
                    .unwrap_or_default(),
            ),
            QuestionType::Screening | QuestionType::Qualifying => Some(
                remaining
                    .next()
                    .cloned()
                    .unwrap_or_else(|| "unsure".to_string()),
            ),
        };
    }

    Ok(response)
}

fn report(response: &TurnResponse) {
    match &response.state {
        SessionState::Complete { .. } => match &response.recommendation {
            Some(recommendation) => {
                println!();
                println!(
                    "Recommended visa: {} ({})",
                    recommendation.code, recommendation.name
                );
                println!("Confidence: {:.2}", recommendation.confidence);
                println!("{}", recommendation.description);
            }
            None => {
                println!();
                println!("No visa classification matches the supplied answers.");
            }
        },
        _ => {
            println!();
            println!("Conversation stopped before a terminal outcome.");
            if !response.options.is_empty() {
                println!("Suggested alternatives: {}", response.options.join(", "));
            }
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = load_catalog(&args.catalog_csv)?;
    let profile = UserProfile {
        citizenship_country: Some("Mexico".to_string()),
        has_job_offer: Some(true),
        ..UserProfile::default()
    };
    let service = build_service(catalog, profile);

    println!("Demo applicant: Mexican citizen with a U.S. job offer, seeking work.");
    println!();

    let answers: Vec<String> = ["no", "no", "yes"]
        .iter()
        .map(|answer| answer.to_string())
        .collect();
    let response = converse(&service, "work", Some("temporary"), &answers)?;

    report(&response);
    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let catalog = load_catalog(&args.catalog_csv)?;
    let profile = UserProfile {
        citizenship_country: args.citizenship.clone(),
        date_of_birth: args.date_of_birth,
        marital_status: args.marital_status,
        education_level: args.education,
        has_job_offer: args.job_offer,
        has_relatives_in_us: args.relatives_in_us,
        fear_of_persecution: args.fear_of_persecution,
        has_past_visa_denials: args.past_visa_denials,
        has_status_violations: args.status_violations,
    };
    let service = build_service(catalog, profile);

    let response = converse(
        &service,
        &args.purpose,
        args.subcategory.as_deref(),
        &args.answers,
    )?;

    report(&response);
    Ok(())
}

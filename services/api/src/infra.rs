use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use visa_intake::config::CatalogConfig;
use visa_intake::error::AppError;
use visa_intake::workflows::intake::{
    CatalogImporter, ProfileError, ProfileProvider, SessionState, UserProfile, VisaCatalog,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Profile store backing the demo deployment. Production hangs a real
/// profile service behind the same trait.
#[derive(Default)]
pub(crate) struct InMemoryProfileStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub(crate) fn upsert(&self, user_id: &str, profile: UserProfile) {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .insert(user_id.to_string(), profile);
    }
}

impl ProfileProvider for InMemoryProfileStore {
    fn profile(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .get(user_id)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
    }
}

/// Server-side session state for thin clients that only send answers. The
/// engine itself stays stateless; this is purely a convenience cache keyed
/// by user id.
#[derive(Default)]
pub(crate) struct InMemorySessionStore {
    states: Mutex<HashMap<String, SessionState>>,
}

impl InMemorySessionStore {
    pub(crate) fn load(&self, user_id: &str) -> Option<SessionState> {
        self.states
            .lock()
            .expect("session mutex poisoned")
            .get(user_id)
            .cloned()
    }

    pub(crate) fn save(&self, user_id: &str, state: SessionState) {
        self.states
            .lock()
            .expect("session mutex poisoned")
            .insert(user_id.to_string(), state);
    }

    pub(crate) fn clear(&self, user_id: &str) {
        self.states
            .lock()
            .expect("session mutex poisoned")
            .remove(user_id);
    }
}

/// Source the catalog from the configured CSV export, falling back to the
/// built-in catalog.
pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<VisaCatalog, AppError> {
    match &config.csv_export {
        Some(path) => Ok(CatalogImporter::from_path(path)?),
        None => Ok(VisaCatalog::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

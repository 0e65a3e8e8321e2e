use std::sync::Arc;

use chrono::NaiveDate;

use super::catalog::{CatalogError, CatalogProvider, VisaCatalog};
use super::eligibility::{EligibilityFilter, EligibilityTable};
use super::narrowing::{BisectingSelector, QuestionSelector};
use super::profile::{ProfileError, ProfileProvider};
use super::session::{
    NarrowingSession, ScreeningBlueprint, SessionError, TurnRequest, TurnResponse,
};

/// Service composing the catalog and profile collaborators with the
/// narrowing engine.
///
/// Holds no per-session state; every turn re-reads the collaborators, so the
/// service is safe to share across any number of concurrent sessions.
pub struct IntakeService<C, P> {
    catalog: Arc<C>,
    profiles: Arc<P>,
    filter: EligibilityFilter,
    selector: Arc<dyn QuestionSelector>,
    screens: ScreeningBlueprint,
}

impl<C, P> IntakeService<C, P>
where
    C: CatalogProvider + 'static,
    P: ProfileProvider + 'static,
{
    pub fn new(catalog: Arc<C>, profiles: Arc<P>, table: EligibilityTable) -> Self {
        Self::with_selector(catalog, profiles, table, Arc::new(BisectingSelector))
    }

    pub fn with_selector(
        catalog: Arc<C>,
        profiles: Arc<P>,
        table: EligibilityTable,
        selector: Arc<dyn QuestionSelector>,
    ) -> Self {
        Self {
            catalog,
            profiles,
            filter: EligibilityFilter::new(table),
            selector,
            screens: ScreeningBlueprint::standard(),
        }
    }

    /// Opening turn of a new conversation.
    pub fn start(&self) -> TurnResponse {
        NarrowingSession::begin()
    }

    /// Apply one answer for `user_id` and return the next prompt or the
    /// terminal outcome. `evaluated_on` anchors age computation so a replay
    /// of the same inputs stays deterministic.
    pub fn turn(
        &self,
        user_id: &str,
        request: TurnRequest,
        evaluated_on: NaiveDate,
    ) -> Result<TurnResponse, IntakeServiceError> {
        let profile = self.profiles.profile(user_id)?;
        let entries = self.catalog.list_active(None)?;
        let catalog = VisaCatalog::new(entries)?;

        let session = NarrowingSession::new(
            &catalog,
            &self.filter,
            self.selector.as_ref(),
            &self.screens,
            evaluated_on,
        );

        Ok(session.advance(&profile, request)?)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

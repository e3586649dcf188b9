//! Page controllers
//!
//! Each method loads the session, talks to the gateway if it must, and
//! returns a view-model. Rendering is left to `crate::view`.

use std::cmp::Reverse;
use std::path::Path;

use super::error::{PageError, PageResult};
use super::route::Route;
use crate::client::{ClientError, HealthGateway, HEART_HEALTH};
use crate::records::{paginate, HealthRecord, Page, DEFAULT_PER_PAGE, HEART_RATE, RESTING_HEART_RATE};
use crate::sleep::NightAggregator;
use crate::store::{require_auth, RecordStore, Session};
use crate::view::{DashboardView, HeartView, SleepView};

/// Options for the raw-data page
#[derive(Debug, Clone)]
pub struct RecordsQuery {
    pub page: usize,
    pub per_page: usize,
    /// Only records of this type
    pub record_type: Option<String>,
}

impl Default for RecordsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            record_type: None,
        }
    }
}

/// Everything a page needs: the session store, a gateway and the
/// aggregator settings
pub struct PageContext<G> {
    store: RecordStore,
    gateway: G,
    aggregator: NightAggregator,
}

impl<G: HealthGateway> PageContext<G> {
    pub fn new(store: RecordStore, gateway: G, aggregator: NightAggregator) -> Self {
        Self {
            store,
            gateway,
            aggregator,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn aggregator(&self) -> &NightAggregator {
        &self.aggregator
    }

    /// Load the session, enforcing auth for `route`
    pub fn guard(&self, route: Route) -> PageResult<Session> {
        let session = self.store.load()?;
        if route.requires_auth() {
            require_auth(&session)?;
        }
        Ok(session)
    }

    /// Upload an export and start a new session
    ///
    /// On failure the stored session is left as it was.
    pub async fn upload(&self, path: &Path) -> PageResult<DashboardView> {
        let summary = self.gateway.upload(path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Upload failed");
            PageError::Upload(e)
        })?;

        let session = Session::from_upload(summary);
        self.store.save(&session)?;

        tracing::info!(session_id = %session.id, "Session started");
        Ok(DashboardView::from_session(&session))
    }

    pub fn dashboard(&self) -> PageResult<DashboardView> {
        let session = self.guard(Route::Dashboard)?;
        Ok(DashboardView::from_session(&session))
    }

    /// Insights and both timeseries charts, fetched concurrently
    ///
    /// Each request settles on its own; the page fails with the first
    /// error in request order.
    pub async fn heart_health(&self) -> PageResult<HeartView> {
        self.guard(Route::HeartHealth)?;

        let (insights, heart_rate, resting) = tokio::join!(
            self.gateway.insights(HEART_HEALTH),
            self.gateway.timeseries(HEART_RATE, false),
            self.gateway.timeseries(RESTING_HEART_RATE, false),
        );

        let insights = settle("insights", insights);
        let heart_rate = settle(HEART_RATE, heart_rate);
        let resting = settle(RESTING_HEART_RATE, resting);

        match (insights, heart_rate, resting) {
            (Ok(insights), Ok(heart_rate), Ok(resting)) => Ok(HeartView::build(
                insights,
                heart_rate,
                resting,
                self.aggregator.zone(),
            )),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                Err(PageError::HeartHealth(e.to_string()))
            }
        }
    }

    /// Nightly totals from the session's records
    pub async fn sleep_health(&self) -> PageResult<SleepView> {
        let mut session = self.guard(Route::SleepHealth)?;
        self.ensure_records(&mut session).await.map_err(PageError::Sleep)?;
        Ok(self.sleep_view(&session.records))
    }

    /// Nightly totals from records already in hand
    pub fn sleep_view(&self, records: &[HealthRecord]) -> SleepView {
        SleepView::new(&self.aggregator.aggregate(records))
    }

    /// One page of the raw-data table, newest first
    pub async fn records(&self, query: &RecordsQuery) -> PageResult<Page<HealthRecord>> {
        let mut session = self.guard(Route::Records)?;
        self.ensure_records(&mut session).await.map_err(PageError::Records)?;

        let zone = self.aggregator.zone();
        let mut records: Vec<HealthRecord> = session
            .records
            .into_iter()
            .filter(|r| {
                query
                    .record_type
                    .as_deref()
                    .map_or(true, |t| r.record_type == t)
            })
            .collect();
        records.sort_by_cached_key(|r| Reverse(r.timestamp(zone)));

        Ok(paginate(records, query.page, query.per_page))
    }

    /// End the session
    pub fn logout(&self) -> PageResult<()> {
        self.store.clear()?;
        Ok(())
    }

    /// Fill the session cache from the backend when empty
    async fn ensure_records(&self, session: &mut Session) -> Result<(), ClientError> {
        if !session.records.is_empty() {
            return Ok(());
        }

        session.records = self.gateway.records(None).await?;
        tracing::debug!(count = session.records.len(), "Cached records for session");

        if let Err(e) = self.store.save(session) {
            tracing::warn!(error = %e, "Could not cache records");
        }
        Ok(())
    }
}

fn settle<T>(what: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
    if let Err(e) = &result {
        tracing::warn!(request = what, error = %e, "Heart health request failed");
    }
    result
}

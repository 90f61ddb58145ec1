use crate::analytics::AnalyticsModel;
use crate::costs::CostsModel;
use crate::overview::OverviewModel;
use crate::posts::PostsSession;
use crate::surface::{RenderSurface, Screen};
use crate::view::{View, ViewState};
use chrono::{DateTime, Local, TimeZone};
use dashboard_core::{
    ContentRecord, CoreError, CostRecord, DashboardConfig, ErrorExt, ErrorRecovery,
    ErrorReporter, RecoveryResult, RetryPolicy,
};
use store_client::{Fetcher, Record};
use tracing::{info, warn};

pub const DEFAULT_TOP_POSTS: usize = 10;

/// Loads each view from a fresh snapshot and hands it to a surface.
///
/// Views share nothing: every activation refetches. A failed fetch is
/// reported and the view degrades to an empty state carrying a notice.
pub struct DashboardShell {
    fetcher: Fetcher,
    reporter: ErrorReporter,
    policy: RetryPolicy,
    top_posts: usize,
}

impl DashboardShell {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            reporter: ErrorReporter::new(),
            policy: RetryPolicy::no_retry(),
            top_posts: DEFAULT_TOP_POSTS,
        }
    }

    pub fn from_config(fetcher: Fetcher, config: &DashboardConfig) -> Self {
        Self::new(fetcher)
            .with_retry_policy(config.recovery.retry_policy())
            .with_top_posts(config.display.top_posts)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_top_posts(mut self, top_posts: usize) -> Self {
        self.top_posts = top_posts;
        self
    }

    pub fn with_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    async fn snapshot<R: Record>(&self, view: View) -> ViewState<Vec<R>> {
        let plan = view.fetch_spec();
        let fetcher = &self.fetcher;

        let outcome = ErrorRecovery::recover(&self.policy, || async move {
            fetcher
                .fetch_all::<R>(plan.order_by, plan.ascending)
                .await
                .map_err(CoreError::from)
        })
        .await;

        match outcome {
            RecoveryResult::Recovered(rows) if rows.is_empty() => {
                info!("{} has no records", view);
                ViewState::empty(view.empty_message())
            }
            RecoveryResult::Recovered(rows) => ViewState::Ready(rows),
            RecoveryResult::Degraded(error) | RecoveryResult::Failed(error) => {
                self.reporter.report_error(&error);
                warn!("{} degraded to empty state", view);
                ViewState::failed(view.empty_message(), error.user_friendly_message())
            }
        }
    }

    pub async fn load_overview<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ViewState<OverviewModel> {
        self.snapshot::<ContentRecord>(View::Overview)
            .await
            .map(|records| OverviewModel::build(&records, now, self.top_posts))
    }

    pub async fn open_posts(&self) -> ViewState<PostsSession> {
        self.snapshot::<ContentRecord>(View::Posts)
            .await
            .map(PostsSession::new)
    }

    pub async fn load_analytics<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> ViewState<AnalyticsModel> {
        self.snapshot::<ContentRecord>(View::Analytics)
            .await
            .map(|records| AnalyticsModel::build(&records, now))
    }

    pub async fn load_costs<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ViewState<CostsModel> {
        let today = now.date_naive();
        self.snapshot::<CostRecord>(View::Costs)
            .await
            .map(|records| CostsModel::build(&records, today))
    }

    /// Activates `view` at `now`, producing its screen.
    pub async fn activate<Tz: TimeZone>(&self, view: View, now: &DateTime<Tz>) -> Screen {
        match view {
            View::Overview => Screen::Overview(self.load_overview(now).await),
            View::Posts => Screen::Posts(self.open_posts().await.map(|session| session.model())),
            View::Analytics => Screen::Analytics(self.load_analytics(now).await),
            View::Costs => Screen::Costs(self.load_costs(now).await),
        }
    }

    pub async fn show<S: RenderSurface>(&self, view: View, surface: &mut S) -> Result<(), CoreError> {
        self.show_at(view, &Local::now(), surface).await
    }

    pub async fn show_at<S: RenderSurface, Tz: TimeZone>(
        &self,
        view: View,
        now: &DateTime<Tz>,
        surface: &mut S,
    ) -> Result<(), CoreError> {
        surface.loading(view)?;
        let screen = self.activate(view, now).await;
        surface.render(&screen)
    }

    /// Shows every view once, in navigation order.
    pub async fn show_all<S: RenderSurface>(&self, surface: &mut S) -> Result<(), CoreError> {
        for view in View::ALL {
            self.show(view, surface).await?;
        }
        Ok(())
    }
}

//! Session state and the rating → processing → results wizard.
//!
//! Every user action maps to one method on [`ViewController`]; view updates
//! are broadcast as [`ViewEvent`]s so any front-end (or a test) can render
//! them.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use shared::{
    domain::{ClusterCount, ClusterId, Rating, RatingMap},
    error::DomainError,
    protocol::{Cluster, ReclusterOutcome, RecommendationResult, SystemStats},
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::{
    export::ExportArtifact,
    inflight::{Action, InflightActions, InflightGuard},
    notifications::{Notification, NotificationBoard, NotificationKind, DEFAULT_NOTIFICATION_TTL},
    ClientError, RecommendationApi,
};

pub const DEFAULT_DISPLAY_DELAY: Duration = Duration::from_millis(2_000);
const VIEW_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Rating,
    Processing,
    Results,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Pause between entering `Processing` and issuing the recommendation
    /// request.
    pub display_delay: Duration,
    pub notification_ttl: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            display_delay: DEFAULT_DISPLAY_DELAY,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    StatsRendered(SystemStats),
    ClustersRendered {
        clusters: Vec<Cluster>,
        ratings: RatingMap,
    },
    RatingChanged {
        cluster_id: ClusterId,
        rating: Rating,
    },
    RatingsReset(RatingMap),
    StepChanged(WizardStep),
    ProcessingMessage(Option<String>),
    RecommendationsRendered(RecommendationResult),
    Notified(Notification),
    ExportReady(ExportArtifact),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load,
    Rate { cluster_id: ClusterId, value: u8 },
    Recluster { num_clusters: u32 },
    Generate,
    Reset,
    Export,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::Rate { .. } => "rate",
            Command::Recluster { .. } => "recluster",
            Command::Generate => "generate",
            Command::Reset => "reset",
            Command::Export => "export",
        }
    }

    /// Remote action this command occupies while it runs, if any.
    pub fn action(&self) -> Option<Action> {
        match self {
            Command::Load => Some(Action::Load),
            Command::Recluster { .. } => Some(Action::Recluster),
            Command::Generate => Some(Action::Generate),
            Command::Export => Some(Action::Export),
            Command::Rate { .. } | Command::Reset => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    Reclustered(ReclusterOutcome),
    Exported(ExportArtifact),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no results to export")]
    NoResult,
    #[error("{0} is already in progress")]
    Busy(Action),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{action} failed: {source}")]
    Api {
        action: Action,
        #[source]
        source: ClientError,
    },
    #[error("failed to encode export payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Ratings captured when the wizard entered `Processing`.
#[derive(Debug)]
pub struct PendingGeneration {
    ratings: RatingMap,
    _guard: InflightGuard,
}

impl PendingGeneration {
    pub fn ratings(&self) -> &RatingMap {
        &self.ratings
    }
}

pub struct ViewController {
    api: Arc<dyn RecommendationApi>,
    options: ControllerOptions,
    inflight: InflightActions,
    events: broadcast::Sender<ViewEvent>,
    stats: Option<SystemStats>,
    clusters: Vec<Cluster>,
    ratings: RatingMap,
    step: WizardStep,
    last_result: Option<RecommendationResult>,
    processing_message: Option<String>,
    notifications: NotificationBoard,
    /// Busy mark taken by whoever queued the running command.
    claim: Option<InflightGuard>,
}

impl ViewController {
    pub fn new(api: Arc<dyn RecommendationApi>, options: ControllerOptions) -> Self {
        Self::with_inflight(api, options, InflightActions::new())
    }

    pub fn with_inflight(
        api: Arc<dyn RecommendationApi>,
        options: ControllerOptions,
        inflight: InflightActions,
    ) -> Self {
        let (events, _) = broadcast::channel(VIEW_EVENT_CAPACITY);
        let notifications = NotificationBoard::new(options.notification_ttl);
        Self {
            api,
            options,
            inflight,
            events,
            stats: None,
            clusters: Vec::new(),
            ratings: RatingMap::default(),
            step: WizardStep::Rating,
            last_result: None,
            processing_message: None,
            notifications,
            claim: None,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn inflight(&self) -> InflightActions {
        self.inflight.clone()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn stats(&self) -> Option<&SystemStats> {
        self.stats.as_ref()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn ratings(&self) -> &RatingMap {
        &self.ratings
    }

    pub fn last_result(&self) -> Option<&RecommendationResult> {
        self.last_result.as_ref()
    }

    pub fn processing_message(&self) -> Option<&str> {
        self.processing_message.as_deref()
    }

    pub fn notifications(&self, now: Instant) -> Vec<Notification> {
        self.notifications.active(now)
    }

    pub fn dismiss_notification(&self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn notification_board(&self) -> NotificationBoard {
        self.notifications.clone()
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, ControllerError> {
        self.dispatch_claimed(command, None).await
    }

    /// Runs `command` under a busy mark the caller already holds, so the
    /// action stays busy from the moment it was queued.
    pub async fn dispatch_claimed(
        &mut self,
        command: Command,
        claim: Option<InflightGuard>,
    ) -> Result<CommandOutcome, ControllerError> {
        self.claim = claim;
        let outcome = self.run_command(command).await;
        self.claim = None;
        outcome
    }

    async fn run_command(&mut self, command: Command) -> Result<CommandOutcome, ControllerError> {
        match command {
            Command::Load => self.load().await.map(|()| CommandOutcome::Done),
            Command::Rate { cluster_id, value } => {
                self.rate(cluster_id, value).map(|_| CommandOutcome::Done)
            }
            Command::Recluster { num_clusters } => self
                .recluster(num_clusters)
                .await
                .map(CommandOutcome::Reclustered),
            Command::Generate => self.generate().await.map(|()| CommandOutcome::Done),
            Command::Reset => {
                self.reset();
                Ok(CommandOutcome::Done)
            }
            Command::Export => self.export().await.map(CommandOutcome::Exported),
        }
    }

    /// Loads stats (non-fatal) and clusters, seeds every cluster's rating
    /// with the default and shows the rating step.
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        let _guard = self.begin(Action::Load)?;
        info!("initializing blog recommendation session");

        self.load_stats().await;
        self.load_clusters(Action::Load).await?;
        self.show_step(WizardStep::Rating);
        Ok(())
    }

    pub fn rate(&mut self, cluster_id: ClusterId, value: u8) -> Result<Rating, ControllerError> {
        let rating = match Rating::new(value).and_then(|rating| {
            self.ratings.set(cluster_id, rating)?;
            Ok(rating)
        }) {
            Ok(rating) => rating,
            Err(err) => {
                self.notify(NotificationKind::Error, err.to_string());
                return Err(err.into());
            }
        };

        info!(cluster_id = cluster_id.0, rating = rating.value(), "cluster rated");
        self.emit(ViewEvent::RatingChanged { cluster_id, rating });
        Ok(rating)
    }

    /// Recomputes clusters on the backend, regenerates their summaries and
    /// reloads them. Prior clusters stay in place if any required step fails.
    pub async fn recluster(
        &mut self,
        num_clusters: u32,
    ) -> Result<ReclusterOutcome, ControllerError> {
        let count = match ClusterCount::new(num_clusters) {
            Ok(count) => count,
            Err(err) => {
                self.notify(
                    NotificationKind::Error,
                    format!("Failed to re-cluster data: {err}"),
                );
                return Err(err.into());
            }
        };
        let _guard = self.begin(Action::Recluster)?;

        info!(num_clusters = count.get(), "re-clustering data");
        self.set_processing(Some("Re-clustering data with new parameters..."));

        let outcome = match self.api.recluster(count).await {
            Ok(outcome) => outcome,
            Err(source) => {
                error!(error = %source, "re-clustering failed");
                self.set_processing(None);
                self.notify(
                    NotificationKind::Error,
                    format!("Failed to re-cluster data: {source}"),
                );
                self.show_step(WizardStep::Rating);
                return Err(ControllerError::Api {
                    action: Action::Recluster,
                    source,
                });
            }
        };
        info!(
            num_clusters = outcome.num_clusters,
            groups = outcome.cluster_sizes.len(),
            "re-clustering completed"
        );

        self.set_processing(Some("Generating AI summaries for new clusters..."));
        match self.api.generate_summaries().await {
            Ok(summaries) => info!(
                generated = summaries.summaries_generated,
                total = summaries.total_clusters,
                "summaries generated"
            ),
            Err(err) => warn!(error = %err, "summary generation failed"),
        }

        if let Err(err) = self.load_clusters(Action::Recluster).await {
            self.set_processing(None);
            self.show_step(WizardStep::Rating);
            return Err(err);
        }
        self.load_stats().await;

        self.show_step(WizardStep::Rating);
        self.set_processing(None);
        self.notify(
            NotificationKind::Success,
            format!("Successfully re-clustered into {count} clusters!"),
        );
        Ok(outcome)
    }

    pub async fn generate(&mut self) -> Result<(), ControllerError> {
        let pending = self.begin_generate()?;
        self.finish_generate(pending).await
    }

    /// Enters `Processing` and snapshots the ratings to submit.
    pub fn begin_generate(&mut self) -> Result<PendingGeneration, ControllerError> {
        let guard = self.begin(Action::Generate)?;
        info!(ratings = ?self.ratings, "generating recommendations");
        self.show_step(WizardStep::Processing);
        Ok(PendingGeneration {
            ratings: self.ratings.clone(),
            _guard: guard,
        })
    }

    pub async fn finish_generate(
        &mut self,
        pending: PendingGeneration,
    ) -> Result<(), ControllerError> {
        if !self.options.display_delay.is_zero() {
            tokio::time::sleep(self.options.display_delay).await;
        }

        match self.api.recommendations(&pending.ratings).await {
            Ok(result) => {
                info!(
                    most = result.most_interesting.len(),
                    least = result.least_interesting.len(),
                    "recommendations generated"
                );
                self.last_result = Some(result.clone());
                self.emit(ViewEvent::RecommendationsRendered(result));
                self.show_step(WizardStep::Results);
                Ok(())
            }
            Err(source) => {
                error!(error = %source, "recommendation request failed");
                self.notify(
                    NotificationKind::Error,
                    "Failed to generate recommendations",
                );
                self.show_step(WizardStep::Rating);
                Err(ControllerError::Api {
                    action: Action::Generate,
                    source,
                })
            }
        }
    }

    /// Puts every rating back to the default and returns to the rating step.
    pub fn reset(&mut self) {
        self.ratings.reset_to_defaults();
        self.emit(ViewEvent::RatingsReset(self.ratings.clone()));
        self.show_step(WizardStep::Rating);
        info!("session reset");
    }

    pub async fn export(&mut self) -> Result<ExportArtifact, ControllerError> {
        let Some(result) = self.last_result.clone() else {
            self.notify(NotificationKind::Error, "No results to export");
            return Err(ControllerError::NoResult);
        };
        let _guard = self.begin(Action::Export)?;

        let payload = match self.api.export(&result).await {
            Ok(payload) => payload,
            Err(source) => {
                error!(error = %source, "export request failed");
                self.notify(NotificationKind::Error, "Failed to export results");
                return Err(ControllerError::Api {
                    action: Action::Export,
                    source,
                });
            }
        };

        let artifact = match ExportArtifact::for_date(Utc::now().date_naive(), &payload) {
            Ok(artifact) => artifact,
            Err(err) => {
                self.notify(NotificationKind::Error, "Failed to export results");
                return Err(err.into());
            }
        };
        info!(file = %artifact.file_name, "results exported");
        self.emit(ViewEvent::ExportReady(artifact.clone()));
        Ok(artifact)
    }

    async fn load_stats(&mut self) {
        match self.api.stats().await {
            Ok(stats) => {
                info!(
                    total_posts = stats.total_posts,
                    clusters = stats.num_clusters,
                    model = %stats.embedding_model,
                    "stats loaded"
                );
                self.stats = Some(stats.clone());
                self.emit(ViewEvent::StatsRendered(stats));
            }
            Err(err) => {
                error!(error = %err, "failed to load stats");
                self.notify(NotificationKind::Error, "Failed to load system statistics");
            }
        }
    }

    async fn load_clusters(&mut self, action: Action) -> Result<(), ControllerError> {
        let clusters = match self.api.clusters().await {
            Ok(clusters) => clusters,
            Err(source) => {
                error!(error = %source, "failed to load clusters");
                self.notify(NotificationKind::Error, "Failed to load content clusters");
                return Err(ControllerError::Api { action, source });
            }
        };

        info!(count = clusters.len(), "clusters loaded");
        self.ratings = RatingMap::with_defaults(clusters.iter().map(|c| c.cluster_id));
        self.clusters = clusters;
        self.emit(ViewEvent::ClustersRendered {
            clusters: self.clusters.clone(),
            ratings: self.ratings.clone(),
        });
        Ok(())
    }

    fn begin(&mut self, action: Action) -> Result<InflightGuard, ControllerError> {
        if let Some(claim) = self.claim.take() {
            if claim.action() == action {
                return Ok(claim);
            }
            self.claim = Some(claim);
        }
        match self.inflight.try_begin(action) {
            Some(guard) => Ok(guard),
            None => {
                warn!(action = %action, "action already in flight");
                self.notify(
                    NotificationKind::Error,
                    format!("{action} is already in progress"),
                );
                Err(ControllerError::Busy(action))
            }
        }
    }

    fn show_step(&mut self, step: WizardStep) {
        self.step = step;
        info!(step = ?step, "showing step");
        self.emit(ViewEvent::StepChanged(step));
    }

    fn set_processing(&mut self, message: Option<&str>) {
        self.processing_message = message.map(str::to_string);
        self.emit(ViewEvent::ProcessingMessage(self.processing_message.clone()));
    }

    fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let notification = self.notifications.push(kind, message, Instant::now());
        self.emit(ViewEvent::Notified(notification));
    }

    fn emit(&self, event: ViewEvent) {
        // No receivers is fine: headless callers read state directly.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

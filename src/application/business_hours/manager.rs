use super::{AvailabilityGate, AvailabilitySnapshot};
use crate::application::lifecycle::{BackgroundTask, LifecycleState};
use crate::domain::entities::{BusinessHour, BusinessHourScope, DEFAULT_BUSINESS_HOUR_ID};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::SystemEvent;
use crate::domain::ports::business_hour_repository::BusinessHourRepository;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// State shared between the manager and its tick loop
struct ScheduleEvaluator {
    repo: Arc<dyn BusinessHourRepository>,
    time: Arc<dyn TimeService>,
    event_bus: Arc<dyn EventBus>,
    snapshot: RwLock<Option<AvailabilitySnapshot>>,
    changed: Notify,
}

impl ScheduleEvaluator {
    async fn recompute(&self) -> DomainResult<AvailabilitySnapshot> {
        let windows = self.repo.list_business_hours().await?;
        let now = self.time.now();
        let next = AvailabilitySnapshot::compute(&windows, now)?;

        let changes = {
            let mut current = self.snapshot.write();
            let changes = match current.as_ref() {
                Some(previous) => next.changes_since(previous),
                None => Vec::new(),
            };
            *current = Some(next.clone());
            changes
        };

        for (scope, open) in changes {
            tracing::info!("Business hour scope {} is now {}", scope, if open { "open" } else { "closed" });
            let event = SystemEvent::ScopeAvailabilityChanged {
                scope,
                open,
                timestamp: now.to_rfc3339(),
            };
            if let Err(e) = self.event_bus.publish(event) {
                tracing::warn!("Failed to publish scope availability change: {}", e);
            }
        }

        Ok(next)
    }
}

/// Evaluates business hour windows on a fixed tick and answers whether a
/// scope is open. While stopped every scope reads as open.
pub struct BusinessHourManager {
    evaluator: Arc<ScheduleEvaluator>,
    spawner: Arc<dyn TaskSpawner>,
    tick_interval: Duration,
    state: RwLock<LifecycleState>,
    ticker: Mutex<Option<BackgroundTask>>,
}

impl BusinessHourManager {
    pub fn new(
        repo: Arc<dyn BusinessHourRepository>,
        time: Arc<dyn TimeService>,
        event_bus: Arc<dyn EventBus>,
        spawner: Arc<dyn TaskSpawner>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            evaluator: Arc::new(ScheduleEvaluator {
                repo,
                time,
                event_bus,
                snapshot: RwLock::new(None),
                changed: Notify::new(),
            }),
            spawner,
            tick_interval,
            state: RwLock::new(LifecycleState::Stopped),
            ticker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    /// Materialize the all-week default window when nothing is configured
    pub async fn ensure_default_business_hour(&self) -> DomainResult<()> {
        let windows = self.evaluator.repo.list_business_hours().await?;
        if windows.iter().any(BusinessHour::is_default) {
            return Ok(());
        }

        self.evaluator
            .repo
            .save_business_hour(&BusinessHour::default_all_week())
            .await?;
        tracing::info!("Created default business hour open all week");
        Ok(())
    }

    /// Idempotent; evaluates every window once, then keeps re-evaluating on each tick
    pub async fn start(&self) -> DomainResult<()> {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            tracing::debug!("Business hour manager already running");
            return Ok(());
        }

        *self.state.write() = LifecycleState::Starting;

        if let Err(e) = self.ensure_default_business_hour().await {
            *self.state.write() = LifecycleState::Stopped;
            return Err(e);
        }
        if let Err(e) = self.evaluator.recompute().await {
            tracing::error!("Initial business hour evaluation failed: {}", e);
        }

        let evaluator = self.evaluator.clone();
        let interval = self.tick_interval;
        *ticker = Some(BackgroundTask::spawn(
            self.spawner.as_ref(),
            "business-hour-ticker",
            move |cancel| async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = evaluator.changed.notified() => {}
                        _ = evaluator.time.sleep(interval) => {}
                    }

                    if let Err(e) = evaluator.recompute().await {
                        tracing::error!(
                            "Business hour evaluation failed, keeping previous availability: {}",
                            e
                        );
                    }
                }
            },
        ));

        *self.state.write() = LifecycleState::Running;
        tracing::info!("Business hour manager started");
        Ok(())
    }

    /// Idempotent; after it returns every scope reads as open again
    pub async fn stop(&self) {
        let mut ticker = self.ticker.lock().await;
        let Some(task) = ticker.take() else {
            tracing::debug!("Business hour manager already stopped");
            return;
        };

        task.stop().await;
        *self.evaluator.snapshot.write() = None;
        *self.state.write() = LifecycleState::Stopped;
        tracing::info!("Business hour manager stopped");
    }

    pub fn is_open(&self, scope: &BusinessHourScope) -> bool {
        if self.state() != LifecycleState::Running {
            return true;
        }
        // Running without a snapshot means the first evaluation failed
        self.evaluator
            .snapshot
            .read()
            .as_ref()
            .map(|snapshot| snapshot.is_open(scope))
            .unwrap_or(true)
    }

    /// Latest computed snapshot, if running
    pub fn snapshot(&self) -> Option<AvailabilitySnapshot> {
        self.evaluator.snapshot.read().clone()
    }

    /// Re-evaluate immediately instead of waiting for the next tick
    pub async fn refresh(&self) -> DomainResult<()> {
        if self.state() != LifecycleState::Running {
            return Ok(());
        }
        self.evaluator.recompute().await.map(|_| ())
    }

    pub async fn list_windows(&self) -> DomainResult<Vec<BusinessHour>> {
        self.evaluator.repo.list_business_hours().await
    }

    /// Validate and store a window; malformed windows are rejected untouched
    pub async fn save_window(&self, window: BusinessHour) -> DomainResult<()> {
        window.validate()?;
        if window.id == DEFAULT_BUSINESS_HOUR_ID && !window.is_default() {
            return Err(DomainError::Configuration(
                "The default business hour cannot become a custom one".to_string(),
            ));
        }

        self.evaluator.repo.save_business_hour(&window).await?;
        tracing::info!("Saved business hour {}", window.id);
        self.evaluator.changed.notify_one();
        Ok(())
    }

    pub async fn remove_window(&self, id: &str) -> DomainResult<()> {
        let window = self
            .evaluator
            .repo
            .find_business_hour(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Business hour {} not found", id)))?;

        if window.is_default() {
            return Err(DomainError::Configuration(
                "The default business hour cannot be removed".to_string(),
            ));
        }

        self.evaluator.repo.delete_business_hour(id).await?;
        tracing::info!("Removed business hour {}", id);
        self.evaluator.changed.notify_one();
        Ok(())
    }
}

impl AvailabilityGate for BusinessHourManager {
    fn is_open(&self, scope: &BusinessHourScope) -> bool {
        BusinessHourManager::is_open(self, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::memory::InMemoryDatabase;
    use crate::infrastructure::runtime::tokio::{TokioTaskSpawner, TokioTimeService};
    use crate::shared::events::LocalEventBus;

    fn manager(db: &InMemoryDatabase) -> BusinessHourManager {
        BusinessHourManager::new(
            Arc::new(db.clone()),
            Arc::new(TokioTimeService),
            Arc::new(LocalEventBus::new(16)),
            Arc::new(TokioTaskSpawner),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_stopped_manager_reads_open() {
        let db = InMemoryDatabase::new();
        let manager = manager(&db);

        assert_eq!(manager.state(), LifecycleState::Stopped);
        assert!(manager.is_open(&BusinessHourScope::Default));
        assert!(manager.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_start_creates_default_window_once() {
        let db = InMemoryDatabase::new();
        let manager = manager(&db);

        manager.start().await.unwrap();
        manager.start().await.unwrap();

        let windows = manager.list_windows().await.unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].id, DEFAULT_BUSINESS_HOUR_ID);
        assert_eq!(manager.state(), LifecycleState::Running);
        assert!(manager.snapshot().is_some());

        manager.stop().await;
        manager.stop().await;
        assert_eq!(manager.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn test_default_window_cannot_be_removed() {
        let db = InMemoryDatabase::new();
        let manager = manager(&db);
        manager.ensure_default_business_hour().await.unwrap();

        let err = manager.remove_window(DEFAULT_BUSINESS_HOUR_ID).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert!(matches!(
            manager.remove_window("missing").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_window_rejected() {
        let db = InMemoryDatabase::new();
        let manager = manager(&db);
        let mut window = BusinessHour::default_all_week();
        window.timezone = "Nowhere/Special".to_string();

        assert!(manager.save_window(window).await.is_err());
        assert!(manager.list_windows().await.unwrap().is_empty());
    }
}

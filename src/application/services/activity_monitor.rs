use super::agent_status_service::REASON_ACTIVITY_MONITOR;
use crate::application::lifecycle::{BackgroundTask, LifecycleState};
use crate::domain::entities::{AgentSession, AgentStatus};
use crate::domain::errors::DomainResult;
use crate::domain::events::SystemEvent;
use crate::domain::ports::agent_session_repository::AgentSessionRepository;
use crate::domain::ports::connection_probe::{ConnectionProbe, Liveness};
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Status the monitor moves a session to, if any. Never promotes to available.
fn demotion(status: AgentStatus, liveness: Liveness) -> Option<AgentStatus> {
    match (status, liveness) {
        (AgentStatus::Offline, _) => None,
        (_, Liveness::Disconnected) => Some(AgentStatus::Offline),
        (AgentStatus::Available, Liveness::Idle) => Some(AgentStatus::Away),
        _ => None,
    }
}

struct ActivitySampler {
    sessions: Arc<dyn AgentSessionRepository>,
    probe: Arc<dyn ConnectionProbe>,
    event_bus: Arc<dyn EventBus>,
    time: Arc<dyn TimeService>,
}

impl ActivitySampler {
    async fn sample(&self) -> DomainResult<Vec<(String, AgentStatus)>> {
        let mut transitions = Vec::new();
        for session in self.sessions.list_non_offline_sessions().await? {
            match self.reconcile(&session).await {
                Ok(Some(status)) => transitions.push((session.agent_id.clone(), status)),
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    "Failed to reconcile status of agent {}: {}",
                    session.agent_id,
                    e
                ),
            }
        }
        Ok(transitions)
    }

    async fn reconcile(&self, session: &AgentSession) -> DomainResult<Option<AgentStatus>> {
        let liveness = self.probe.liveness(&session.agent_id).await;
        let Some(next) = demotion(session.status, liveness) else {
            return Ok(None);
        };

        let now = self.time.now();
        let written = self
            .sessions
            .update_status_if(&session.agent_id, session.status, next, now, true)
            .await?;
        if !written {
            tracing::debug!(
                "Status of agent {} changed while sampling, leaving it alone",
                session.agent_id
            );
            return Ok(None);
        }

        let event = SystemEvent::AgentStatusChanged {
            agent_id: session.agent_id.clone(),
            old_status: session.status,
            new_status: next,
            timestamp: now.to_rfc3339(),
            reason: REASON_ACTIVITY_MONITOR.to_string(),
        };
        if let Err(e) = self.event_bus.publish(event) {
            tracing::warn!("Failed to publish agent status change: {}", e);
        }

        tracing::info!(
            "Agent {} moved from {} to {} ({:?})",
            session.agent_id,
            session.status,
            next,
            liveness
        );
        Ok(Some(next))
    }
}

/// Periodically reconciles recorded agent status with observed connection liveness
pub struct AgentActivityMonitor {
    sampler: Arc<ActivitySampler>,
    spawner: Arc<dyn TaskSpawner>,
    interval: Duration,
    state: RwLock<LifecycleState>,
    ticker: Mutex<Option<BackgroundTask>>,
}

impl AgentActivityMonitor {
    pub fn new(
        sessions: Arc<dyn AgentSessionRepository>,
        probe: Arc<dyn ConnectionProbe>,
        event_bus: Arc<dyn EventBus>,
        time: Arc<dyn TimeService>,
        spawner: Arc<dyn TaskSpawner>,
        interval: Duration,
    ) -> Self {
        Self {
            sampler: Arc::new(ActivitySampler {
                sessions,
                probe,
                event_bus,
                time,
            }),
            spawner,
            interval,
            state: RwLock::new(LifecycleState::Stopped),
            ticker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Idempotent
    pub async fn start(&self) {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            tracing::debug!("Activity monitor already running");
            return;
        }
        *self.state.write() = LifecycleState::Starting;

        let sampler = self.sampler.clone();
        let interval = self.interval;
        *ticker = Some(BackgroundTask::spawn(
            self.spawner.as_ref(),
            "agent-activity-monitor",
            move |cancel| async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = sampler.time.sleep(interval) => {}
                    }

                    if let Err(e) = sampler.sample().await {
                        tracing::error!("Activity sampling failed, skipping tick: {}", e);
                    }
                }
            },
        ));

        *self.state.write() = LifecycleState::Running;
        tracing::info!("Agent activity monitor started");
    }

    /// Idempotent
    pub async fn stop(&self) {
        let mut ticker = self.ticker.lock().await;
        let Some(task) = ticker.take() else {
            tracing::debug!("Activity monitor already stopped");
            return;
        };

        task.stop().await;
        *self.state.write() = LifecycleState::Stopped;
        tracing::info!("Agent activity monitor stopped");
    }

    /// Run one sampling pass now, returning the transitions applied
    pub async fn sample_now(&self) -> DomainResult<Vec<(String, AgentStatus)>> {
        self.sampler.sample().await
    }
}

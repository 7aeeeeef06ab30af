use crate::application::business_hours::BusinessHourManager;
use crate::application::lifecycle::BackgroundTask;
use crate::application::routing::RoutingManager;
use crate::application::services::{AgentActivityMonitor, AgentStatusService};
use crate::domain::entities::User;
use crate::domain::errors::DomainResult;
use crate::domain::ports::setting_watcher::{
    SettingWatcher, SETTING_DISABLE_ACTIVITY_MONITOR, SETTING_ENABLE_BUSINESS_HOURS,
    SETTING_ROUTING_METHOD,
};
use crate::domain::ports::task_spawner::TaskSpawner;
use futures::StreamExt;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Boolean setting values arrive as JSON booleans or as "true"/"false" strings
fn setting_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Wires settings to the routing, business hour and activity subsystems
pub struct OmnichannelOrchestrator {
    settings: Arc<dyn SettingWatcher>,
    spawner: Arc<dyn TaskSpawner>,
    routing: Arc<RoutingManager>,
    business_hours: Arc<BusinessHourManager>,
    monitor: Arc<AgentActivityMonitor>,
    agent_status: AgentStatusService,
    watchers: Mutex<Vec<BackgroundTask>>,
}

impl OmnichannelOrchestrator {
    pub fn new(
        settings: Arc<dyn SettingWatcher>,
        spawner: Arc<dyn TaskSpawner>,
        routing: Arc<RoutingManager>,
        business_hours: Arc<BusinessHourManager>,
        monitor: Arc<AgentActivityMonitor>,
        agent_status: AgentStatusService,
    ) -> Self {
        Self {
            settings,
            spawner,
            routing,
            business_hours,
            monitor,
            agent_status,
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Consume one setting's changes in order on a dedicated task
    fn watch_setting<F, Fut>(&self, name: &'static str, on_change: F) -> BackgroundTask
    where
        F: Fn(Value) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut values = self.settings.watch(name);
        BackgroundTask::spawn(
            self.spawner.as_ref(),
            &format!("setting-watcher:{}", name),
            move |cancel| async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        next = values.next() => match next {
                            Some(value) => {
                                tracing::debug!("Setting {} changed to {}", name, value);
                                on_change(value).await;
                            }
                            None => break,
                        },
                    }
                }
            },
        )
    }

    /// Idempotent; later calls leave the existing subscriptions in place
    pub async fn start(&self) -> DomainResult<()> {
        let mut watchers = self.watchers.lock().await;
        if !watchers.is_empty() {
            tracing::debug!("Omnichannel orchestrator already started");
            return Ok(());
        }

        self.business_hours.ensure_default_business_hour().await?;

        let monitor = self.monitor.clone();
        watchers.push(self.watch_setting(SETTING_DISABLE_ACTIVITY_MONITOR, move |value| {
            let monitor = monitor.clone();
            async move {
                match setting_flag(&value) {
                    Some(true) => monitor.stop().await,
                    Some(false) => monitor.start().await,
                    None => tracing::warn!(
                        "Ignoring non-boolean {} value: {}",
                        SETTING_DISABLE_ACTIVITY_MONITOR,
                        value
                    ),
                }
            }
        }));

        let business_hours = self.business_hours.clone();
        watchers.push(self.watch_setting(SETTING_ENABLE_BUSINESS_HOURS, move |value| {
            let business_hours = business_hours.clone();
            async move {
                match setting_flag(&value) {
                    Some(true) => {
                        if let Err(e) = business_hours.start().await {
                            tracing::error!("Failed to start business hour manager: {}", e);
                        }
                    }
                    Some(false) => business_hours.stop().await,
                    None => tracing::warn!(
                        "Ignoring non-boolean {} value: {}",
                        SETTING_ENABLE_BUSINESS_HOURS,
                        value
                    ),
                }
            }
        }));

        let routing = self.routing.clone();
        watchers.push(self.watch_setting(SETTING_ROUTING_METHOD, move |value| {
            let routing = routing.clone();
            async move {
                let Some(name) = value.as_str() else {
                    tracing::warn!("Ignoring non-string {} value: {}", SETTING_ROUTING_METHOD, value);
                    return;
                };
                if let Err(e) = routing.set_active_method(name).await {
                    tracing::error!("Failed to switch routing method to {}: {}", name, e);
                }
            }
        }));

        tracing::info!("Omnichannel orchestrator started");
        Ok(())
    }

    /// Agents going offline on logout; failures are logged, never surfaced
    pub async fn on_logout(&self, user: &User) {
        if let Err(e) = self.agent_status.handle_logout(user).await {
            tracing::error!("Failed to take agent {} offline on logout: {}", user.id, e);
        }
    }

    pub async fn shutdown(&self) {
        let watchers: Vec<_> = self.watchers.lock().await.drain(..).collect();
        for watcher in watchers {
            watcher.stop().await;
        }

        self.monitor.stop().await;
        self.business_hours.stop().await;
        self.routing.stop().await;
        tracing::info!("Omnichannel orchestrator shut down");
    }
}

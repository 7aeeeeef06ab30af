use crate::application::business_hours::{AvailabilityGate, BusinessHourManager};
use crate::application::hooks::mention_all::{register_mention_all_filter, MentionAllFilter};
use crate::application::hooks::room_access::register_room_access_gates;
use crate::application::hooks::HookRegistry;
use crate::application::routing::{
    ManualSelection, QueuedRoutingMethod, RoutingContext, RoutingManager,
};
use crate::application::services::{
    AgentActivityMonitor, AgentStatusService, MessageService, RoomService,
};
use crate::application::OmnichannelOrchestrator;
use crate::config::Config;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::permission_service::PermissionService;
use crate::domain::ports::setting_watcher::{
    SettingWatcher, SETTING_DISABLE_ACTIVITY_MONITOR, SETTING_ENABLE_BUSINESS_HOURS,
    SETTING_ROUTING_METHOD,
};
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use crate::domain::ports::translator::Translator;
use crate::infrastructure::persistence::InMemoryDatabase;
use crate::infrastructure::providers::{InMemoryConnectionManager, InMemorySettings, StaticTranslator};
use crate::infrastructure::runtime::{TokioTaskSpawner, TokioTimeService};
use crate::shared::events::LocalEventBus;
use serde_json::json;
use std::sync::Arc;

/// Everything the process wires together
#[derive(Clone)]
pub struct AppState {
    pub db: InMemoryDatabase,
    pub settings: InMemorySettings,
    pub connections: InMemoryConnectionManager,
    pub event_bus: Arc<LocalEventBus>,
    pub hooks: Arc<HookRegistry>,
    pub routing: Arc<RoutingManager>,
    pub manual_selection: Arc<ManualSelection>,
    pub business_hours: Arc<BusinessHourManager>,
    pub activity_monitor: Arc<AgentActivityMonitor>,
    pub agent_status: AgentStatusService,
    pub message_service: MessageService,
    pub room_service: RoomService,
    pub orchestrator: Arc<OmnichannelOrchestrator>,
}

pub async fn build_app_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let time: Arc<dyn TimeService> = Arc::new(TokioTimeService::new());
    build_app_state_with_clock(config, time).await
}

/// Same wiring with an injected clock
pub async fn build_app_state_with_clock(
    config: &Config,
    time: Arc<dyn TimeService>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let db = InMemoryDatabase::new();
    let settings = InMemorySettings::new();
    let connections = InMemoryConnectionManager::new(config.agent_idle_timeout);
    let translator: Arc<dyn Translator> = Arc::new(StaticTranslator::new());
    let spawner: Arc<dyn TaskSpawner> = Arc::new(TokioTaskSpawner::new());

    let event_bus = Arc::new(LocalEventBus::new(1000));
    let bus: Arc<dyn EventBus> = event_bus.clone();
    tracing::info!("Event bus initialized with capacity 1000");

    let permissions: Arc<dyn PermissionService> = Arc::new(db.clone());

    // Hook registry with the permanent handlers
    let hooks = Arc::new(HookRegistry::new());
    register_room_access_gates(
        &hooks,
        permissions.clone(),
        translator.clone(),
        Arc::new(settings.clone()) as Arc<dyn SettingWatcher>,
        config.default_language.clone(),
    );
    register_mention_all_filter(
        &hooks,
        MentionAllFilter::new(
            permissions.clone(),
            Arc::new(db.clone()),
            Arc::new(connections.clone()),
            translator.clone(),
            time.clone(),
            config.default_language.clone(),
        ),
    );
    tracing::info!("Hook registry initialized");

    let business_hours = Arc::new(BusinessHourManager::new(
        Arc::new(db.clone()),
        time.clone(),
        bus.clone(),
        spawner.clone(),
        config.business_hour_tick,
    ));

    let routing_ctx = RoutingContext {
        agents: Arc::new(db.clone()),
        sessions: Arc::new(db.clone()),
        availability: business_hours.clone() as Arc<dyn AvailabilityGate>,
        queue: Arc::new(db.clone()),
        assignments: Arc::new(db.clone()),
        event_bus: bus.clone(),
        time: time.clone(),
        spawner: spawner.clone(),
        retry_interval: config.routing_retry_interval,
    };
    let routing = Arc::new(RoutingManager::new(
        Arc::new(db.clone()),
        bus.clone(),
        time.clone(),
    ));
    let manual_selection = Arc::new(ManualSelection::new(routing_ctx.clone()));
    routing.register_method(Arc::new(QueuedRoutingMethod::auto_selection(routing_ctx.clone())));
    routing.register_method(Arc::new(QueuedRoutingMethod::load_balancing(routing_ctx)));
    routing.register_method(manual_selection.clone());
    tracing::info!("Routing methods registered: {:?}", routing.registered_methods());

    let activity_monitor = Arc::new(AgentActivityMonitor::new(
        Arc::new(db.clone()),
        Arc::new(connections.clone()),
        bus.clone(),
        time.clone(),
        spawner.clone(),
        config.activity_monitor_interval,
    ));
    let agent_status = AgentStatusService::new(Arc::new(db.clone()), bus.clone(), time.clone());

    let message_service = MessageService::new(Arc::new(db.clone()), hooks.clone(), time.clone());
    let room_service = RoomService::new(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        permissions,
        hooks.clone(),
    );

    let orchestrator = Arc::new(OmnichannelOrchestrator::new(
        Arc::new(settings.clone()),
        spawner,
        routing.clone(),
        business_hours.clone(),
        activity_monitor.clone(),
        agent_status.clone(),
    ));

    Ok(AppState {
        db,
        settings,
        connections,
        event_bus,
        hooks,
        routing,
        manual_selection,
        business_hours,
        activity_monitor,
        agent_status,
        message_service,
        room_service,
        orchestrator,
    })
}

/// Seed the dynamic settings from the environment configuration
pub fn apply_initial_settings(state: &AppState, config: &Config) {
    state
        .settings
        .set(SETTING_ROUTING_METHOD, json!(config.routing_method));
    state
        .settings
        .set(SETTING_ENABLE_BUSINESS_HOURS, json!(config.enable_business_hours));
    state.settings.set(
        SETTING_DISABLE_ACTIVITY_MONITOR,
        json!(config.disable_activity_monitor),
    );
}

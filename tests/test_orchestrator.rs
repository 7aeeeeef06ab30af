mod helpers;

use helpers::*;
use omnidesk::application::lifecycle::LifecycleState;
use omnidesk::application::routing::{AUTO_SELECTION, LOAD_BALANCING};
use omnidesk::bootstrap::apply_initial_settings;
use omnidesk::domain::entities::DEFAULT_BUSINESS_HOUR_ID;
use omnidesk::domain::ports::business_hour_repository::BusinessHourRepository;
use omnidesk::domain::ports::setting_watcher::{
    SETTING_DISABLE_ACTIVITY_MONITOR, SETTING_ENABLE_BUSINESS_HOURS, SETTING_ROUTING_METHOD,
};
use serde_json::json;

async fn active_method(app: &TestApp) -> Option<String> {
    app.state.routing.active_method_name().await
}

#[tokio::test]
async fn test_start_applies_initial_settings() {
    let app = TestApp::new().await;
    app.state.orchestrator.start().await.unwrap();
    apply_initial_settings(&app.state, &app.config);

    let app = &app;
    assert!(wait_until(move || async move {
        active_method(app).await.as_deref() == Some(AUTO_SELECTION)
    })
    .await);
    assert!(wait_until(move || async move { app.state.activity_monitor.is_running() }).await);
    assert_eq!(app.state.business_hours.state(), LifecycleState::Stopped);

    let windows = app.state.db.list_business_hours().await.unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].id, DEFAULT_BUSINESS_HOUR_ID);

    app.state.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_setting_changes_drive_subsystems() {
    let app = TestApp::new().await;
    app.state.orchestrator.start().await.unwrap();
    let app = &app;
    let settings = &app.state.settings;

    settings.set(SETTING_ENABLE_BUSINESS_HOURS, json!(true));
    assert!(wait_until(move || async move {
        app.state.business_hours.state() == LifecycleState::Running
    })
    .await);

    settings.set(SETTING_ENABLE_BUSINESS_HOURS, json!(false));
    assert!(wait_until(move || async move {
        app.state.business_hours.state() == LifecycleState::Stopped
    })
    .await);

    settings.set(SETTING_DISABLE_ACTIVITY_MONITOR, json!(false));
    assert!(wait_until(move || async move { app.state.activity_monitor.is_running() }).await);
    settings.set(SETTING_DISABLE_ACTIVITY_MONITOR, json!("true"));
    assert!(wait_until(move || async move { !app.state.activity_monitor.is_running() }).await);

    settings.set(SETTING_ROUTING_METHOD, json!(LOAD_BALANCING));
    assert!(wait_until(move || async move {
        active_method(app).await.as_deref() == Some(LOAD_BALANCING)
    })
    .await);

    app.state.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_unknown_routing_method_setting_keeps_current_method() {
    let app = TestApp::new().await;
    app.state.orchestrator.start().await.unwrap();
    let app = &app;

    app.state.settings.set(SETTING_ROUTING_METHOD, json!(AUTO_SELECTION));
    assert!(wait_until(move || async move {
        active_method(app).await.as_deref() == Some(AUTO_SELECTION)
    })
    .await);

    app.state.settings.set(SETTING_ROUTING_METHOD, json!("External"));
    app.state.settings.set(SETTING_ROUTING_METHOD, json!(42));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(active_method(app).await.as_deref(), Some(AUTO_SELECTION));

    app.state.orchestrator.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_everything() {
    let app = TestApp::with_config(test_config(&[("LIVECHAT_ENABLE_BUSINESS_HOURS", "true")])).await;
    app.state.orchestrator.start().await.unwrap();
    apply_initial_settings(&app.state, &app.config);
    let app = &app;

    assert!(wait_until(move || async move {
        app.state.business_hours.state() == LifecycleState::Running
            && app.state.activity_monitor.is_running()
            && active_method(app).await.is_some()
    })
    .await);

    app.state.orchestrator.shutdown().await;

    assert_eq!(app.state.business_hours.state(), LifecycleState::Stopped);
    assert!(!app.state.activity_monitor.is_running());
    assert!(active_method(app).await.is_none());

    // Settings changed after shutdown are not observed
    app.state.settings.set(SETTING_ENABLE_BUSINESS_HOURS, json!(true));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(app.state.business_hours.state(), LifecycleState::Stopped);
}

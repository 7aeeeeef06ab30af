mod helpers;

use helpers::*;
use omnidesk::application::routing::{AUTO_SELECTION, LOAD_BALANCING, MANUAL_SELECTION};
use omnidesk::domain::entities::{AgentSession, AgentStatus, Conversation};
use omnidesk::domain::errors::DomainError;
use omnidesk::domain::events::SystemEvent;
use omnidesk::domain::ports::assignment_repository::AssignmentRepository;
use omnidesk::domain::ports::conversation_queue::ConversationQueue;
use std::collections::HashSet;
use tokio_stream::StreamExt;

async fn assignment_count(app: &TestApp) -> usize {
    app.state.db.list_assignments().await.unwrap().len()
}

async fn wait_for_assignments(app: &TestApp, expected: usize) -> bool {
    wait_until(move || async move { assignment_count(app).await == expected }).await
}

#[tokio::test]
async fn test_auto_selection_rotates_between_agents() {
    let app = TestApp::new().await;
    app.add_agent("a1", None, AgentStatus::Available);
    app.add_agent("a2", None, AgentStatus::Available);
    app.state.routing.set_active_method(AUTO_SELECTION).await.unwrap();

    for i in 0..4 {
        let conversation = Conversation::new(format!("room-{}", i), None);
        app.state.routing.delegate(conversation).await.unwrap();
        assert!(wait_for_assignments(&app, i + 1).await);
        app.clock.advance(chrono::Duration::seconds(1));
    }

    let agents: Vec<_> = app
        .state
        .db
        .list_assignments()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.agent_id)
        .collect();
    assert_eq!(agents, vec!["a1", "a2", "a1", "a2"]);

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_load_balancing_prefers_least_busy() {
    let app = TestApp::new().await;
    let mut busy = app.add_agent("a1", None, AgentStatus::Available);
    busy.active_chats = 3;
    app.state.db.insert_agent(busy);
    app.add_agent("a2", None, AgentStatus::Available);
    app.state.routing.set_active_method(LOAD_BALANCING).await.unwrap();

    app.state
        .routing
        .delegate(Conversation::new("room-1".to_string(), None))
        .await
        .unwrap();

    assert!(wait_for_assignments(&app, 1).await);
    assert_eq!(app.state.db.list_assignments().await.unwrap()[0].agent_id, "a2");
    assert_eq!(app.state.db.get_agent("a2").unwrap().active_chats, 1);

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_unavailable_agents_are_skipped() {
    let app = TestApp::new().await;
    app.add_agent("away", None, AgentStatus::Away);
    app.add_agent("off", None, AgentStatus::Offline);
    app.state.routing.set_active_method(LOAD_BALANCING).await.unwrap();

    let assigned = app
        .state
        .routing
        .delegate(Conversation::new("room-1".to_string(), None))
        .await
        .unwrap();

    assert!(assigned.is_none());
    assert_eq!(app.state.db.list_pending().await.unwrap().len(), 1);

    app.add_agent("on", None, AgentStatus::Available);
    assert!(wait_for_assignments(&app, 1).await);
    assert_eq!(app.state.db.list_assignments().await.unwrap()[0].agent_id, "on");

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_department_scoping() {
    let app = TestApp::new().await;
    app.add_agent("sales-agent", Some("sales"), AgentStatus::Available);
    app.add_agent("support-agent", Some("support"), AgentStatus::Available);
    app.state.routing.set_active_method(AUTO_SELECTION).await.unwrap();

    app.state
        .routing
        .delegate(Conversation::new("room-1".to_string(), Some("support".to_string())))
        .await
        .unwrap();

    assert!(wait_for_assignments(&app, 1).await);
    let assignments = app.state.db.list_assignments().await.unwrap();
    assert_eq!(assignments[0].agent_id, "support-agent");

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_swap_hands_pending_conversations_to_new_method() {
    let app = TestApp::new().await;
    app.add_agent("a1", None, AgentStatus::Available);
    app.state.routing.set_active_method(MANUAL_SELECTION).await.unwrap();

    let mut ids = HashSet::new();
    for i in 0..5 {
        let conversation = Conversation::new(format!("room-{}", i), None);
        ids.insert(conversation.id.clone());
        assert!(app.state.routing.delegate(conversation).await.unwrap().is_none());
    }
    assert_eq!(app.state.db.list_pending().await.unwrap().len(), 5);

    app.state.routing.set_active_method(LOAD_BALANCING).await.unwrap();
    assert!(wait_for_assignments(&app, 5).await);

    let assignments = app.state.db.list_assignments().await.unwrap();
    let assigned: HashSet<_> = assignments.iter().map(|a| a.conversation_id.clone()).collect();
    assert_eq!(assigned, ids);
    assert_eq!(assignments.len(), 5);
    assert!(assignments.iter().all(|a| a.method == LOAD_BALANCING));
    assert!(app.state.db.list_pending().await.unwrap().is_empty());

    app.state.routing.stop().await;
}

async fn assignments_by(app: &TestApp, method: &str) -> usize {
    app.state
        .db
        .list_assignments()
        .await
        .unwrap()
        .iter()
        .filter(|a| a.method == method)
        .count()
}

#[tokio::test]
async fn test_swap_from_running_worker_stops_its_assignments() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.add_agent(&format!("a{}", i), None, AgentStatus::Away);
    }
    app.state.routing.set_active_method(AUTO_SELECTION).await.unwrap();

    let mut ids = HashSet::new();
    for i in 0..6 {
        let conversation = Conversation::new(format!("room-{}", i), None);
        ids.insert(conversation.id.clone());
        assert!(app.state.routing.delegate(conversation).await.unwrap().is_none());
    }

    // Agents come online while the auto selection worker is draining
    for i in 0..3 {
        app.state
            .db
            .upsert_session(AgentSession::new(format!("a{}", i), AgentStatus::Available));
    }
    let late = Conversation::new("room-late".to_string(), None);
    ids.insert(late.id.clone());
    app.state.db.enqueue(late).await.unwrap();
    tokio::task::yield_now().await;

    app.state.routing.set_active_method(LOAD_BALANCING).await.unwrap();
    let auto_at_swap = assignments_by(&app, AUTO_SELECTION).await;

    assert!(wait_for_assignments(&app, ids.len()).await);
    assert_eq!(assignments_by(&app, AUTO_SELECTION).await, auto_at_swap);

    let assignments = app.state.db.list_assignments().await.unwrap();
    assert_eq!(assignments.len(), ids.len());
    let assigned: HashSet<_> = assignments.iter().map(|a| a.conversation_id.clone()).collect();
    assert_eq!(assigned, ids);
    assert!(app.state.db.list_pending().await.unwrap().is_empty());

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_concurrent_delegation_never_duplicates() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.add_agent(&format!("a{}", i), None, AgentStatus::Available);
    }
    app.state.routing.set_active_method(AUTO_SELECTION).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let routing = app.state.routing.clone();
        handles.push(tokio::spawn(async move {
            routing
                .delegate(Conversation::new(format!("room-{}", i), None))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(wait_for_assignments(&app, 20).await);
    let assignments = app.state.db.list_assignments().await.unwrap();
    let unique: HashSet<_> = assignments.iter().map(|a| &a.conversation_id).collect();
    assert_eq!(unique.len(), assignments.len());
    assert_eq!(assignments.len(), 20);

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_unknown_method_keeps_previous_one_running() {
    let app = TestApp::new().await;
    app.state.routing.set_active_method(AUTO_SELECTION).await.unwrap();

    let err = app
        .state
        .routing
        .set_active_method("External")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Configuration(_)));
    assert_eq!(
        app.state.routing.active_method_name().await.as_deref(),
        Some(AUTO_SELECTION)
    );

    app.state.routing.stop().await;
}

#[tokio::test]
async fn test_manual_selection_take() {
    let app = TestApp::new().await;
    app.add_agent("a1", None, AgentStatus::Available);
    app.add_agent("a2", None, AgentStatus::Away);
    app.state.routing.set_active_method(MANUAL_SELECTION).await.unwrap();

    let conversation = Conversation::new("room-1".to_string(), None);
    let id = conversation.id.clone();
    app.state.routing.delegate(conversation).await.unwrap();

    assert!(matches!(
        app.state.manual_selection.take(&id, "a2").await,
        Err(DomainError::Forbidden(_))
    ));
    app.state.manual_selection.take(&id, "a1").await.unwrap();
    assert!(matches!(
        app.state.manual_selection.take(&id, "a1").await,
        Err(DomainError::NotFound(_))
    ));

    let assignments = app.state.db.list_assignments().await.unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].method, MANUAL_SELECTION);
}

#[tokio::test]
async fn test_swap_publishes_method_change() {
    let app = TestApp::new().await;
    let mut events = app.events();

    app.state.routing.set_active_method(AUTO_SELECTION).await.unwrap();
    app.state.routing.set_active_method(LOAD_BALANCING).await.unwrap();

    let mut changes = Vec::new();
    while changes.len() < 2 {
        if let Some(Ok(SystemEvent::RoutingMethodChanged { previous, current, .. })) =
            events.next().await
        {
            changes.push((previous, current));
        }
    }
    assert_eq!(
        changes,
        vec![
            (None, AUTO_SELECTION.to_string()),
            (Some(AUTO_SELECTION.to_string()), LOAD_BALANCING.to_string()),
        ]
    );

    app.state.routing.stop().await;
}

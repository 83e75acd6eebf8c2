/// Workflow session cache
///
/// Holds the live flow instance for every call that is suspended
/// between webhook turns. Entries are keyed by the session id carried
/// in the caller's cookie, bounded in number, and dropped after an
/// idle period so abandoned calls cannot pin memory.
use crate::domain::flow::{CallFlow, CallRequest, FlowTurn};
use crate::domain::shared::Result;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// A suspended call flow plus its bookkeeping
pub struct ActiveSession {
    pub flow_name: String,
    pub started_at: DateTime<Utc>,
    pub turns: u32,
    flow: Box<dyn CallFlow>,
}

impl ActiveSession {
    pub fn new(flow_name: String, flow: Box<dyn CallFlow>) -> Self {
        Self {
            flow_name,
            started_at: Utc::now(),
            turns: 0,
            flow,
        }
    }

    /// Run one turn of the underlying flow
    pub fn advance(&mut self, request: &CallRequest) -> Result<FlowTurn> {
        self.turns += 1;
        self.flow.advance(request)
    }
}

/// Monitoring view of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub flow: String,
    pub started_at: DateTime<Utc>,
    pub turns: u32,
}

/// In-memory store of active call sessions
pub struct SessionManager {
    cache: Cache<String, Arc<Mutex<ActiveSession>>>,
}

impl SessionManager {
    /// Create a store bounded to `max_sessions` entries, each dropped
    /// after `idle_timeout` without activity.
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle_timeout)
            .eviction_listener(|key: Arc<String>, _value, cause| {
                info!("Session evicted: id={}, cause={:?}", key, cause);
            })
            .build();

        Self { cache }
    }

    /// Mint a fresh session id
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Insert a newly created flow under `session_id`
    pub async fn start(
        &self,
        session_id: &str,
        flow_name: &str,
        flow: Box<dyn CallFlow>,
    ) -> Arc<Mutex<ActiveSession>> {
        let session = Arc::new(Mutex::new(ActiveSession::new(
            flow_name.to_string(),
            flow,
        )));
        self.cache
            .insert(session_id.to_string(), session.clone())
            .await;

        info!("Started session {} for flow {}", session_id, flow_name);
        session
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<ActiveSession>>> {
        self.cache.get(session_id).await
    }

    /// Drop a session (completed or failed)
    pub async fn remove(&self, session_id: &str) {
        self.cache.invalidate(session_id).await;
        info!("Ended session {}", session_id);
    }

    /// Number of live sessions
    pub async fn count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Snapshot of all live sessions for monitoring
    pub async fn list(&self) -> Vec<SessionInfo> {
        self.cache.run_pending_tasks().await;

        let entries: Vec<_> = self.cache.iter().collect();
        let mut sessions = Vec::new();
        for (id, entry) in entries {
            let session = entry.lock().await;
            sessions.push(SessionInfo {
                id: id.as_ref().clone(),
                flow: session.flow_name.clone(),
                started_at: session.started_at,
                turns: session.turns,
            });
        }
        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::MainMenuFlow;

    fn manager() -> SessionManager {
        SessionManager::new(100, Duration::from_secs(600))
    }

    #[tokio::test]
    async fn test_start_and_get_session() {
        let sessions = manager();
        let id = SessionManager::new_session_id();

        sessions
            .start(&id, "mainmenu", Box::new(MainMenuFlow::new()))
            .await;

        let entry = sessions.get(&id).await.expect("session should exist");
        let session = entry.lock().await;
        assert_eq!(session.flow_name, "mainmenu");
        assert_eq!(session.turns, 0);
        assert_eq!(sessions.count().await, 1);
    }

    #[tokio::test]
    async fn test_advance_counts_turns() {
        let sessions = manager();
        sessions
            .start("s1", "mainmenu", Box::new(MainMenuFlow::new()))
            .await;

        let entry = sessions.get("s1").await.unwrap();
        let mut session = entry.lock().await;
        let turn = session.advance(&CallRequest::default()).unwrap();

        assert!(!turn.is_final());
        assert_eq!(session.turns, 1);
    }

    #[tokio::test]
    async fn test_remove_session() {
        let sessions = manager();
        sessions
            .start("s1", "mainmenu", Box::new(MainMenuFlow::new()))
            .await;
        sessions.remove("s1").await;

        assert!(sessions.get("s1").await.is_none());
        assert_eq!(sessions.count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let sessions = SessionManager::new(100, Duration::from_millis(50));
        sessions
            .start("s1", "mainmenu", Box::new(MainMenuFlow::new()))
            .await;

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(sessions.get("s1").await.is_none());
        assert_eq!(sessions.count().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let sessions = SessionManager::new(2, Duration::from_secs(600));
        for i in 0..5 {
            sessions
                .start(&format!("s{}", i), "mainmenu", Box::new(MainMenuFlow::new()))
                .await;
        }

        assert!(sessions.count().await <= 2);
    }

    #[tokio::test]
    async fn test_list_sessions() {
        let sessions = manager();
        sessions
            .start("s1", "mainmenu", Box::new(MainMenuFlow::new()))
            .await;
        sessions
            .start("s2", "mainmenu", Box::new(MainMenuFlow::new()))
            .await;

        let mut listed = sessions.list().await;
        listed.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "s1");
        assert_eq!(listed[0].flow, "mainmenu");
        assert_eq!(listed[1].id, "s2");
    }
}

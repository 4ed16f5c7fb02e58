#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use onchat_client::api::{ChatApi, Requester};
use onchat_client::config::RequestSection;
use onchat_core::error::{OnchatError, Result};
use onchat_core::protocol::{unwrap_frame, ChatTarget, Conversation, EventName, Reply, Request};

/// Answers from a fixed table keyed by reply event; unknown tags time out.
struct Scripted {
    frames: HashMap<&'static str, Value>,
    open: bool,
    calls: Mutex<Vec<(String, Option<Value>, Duration)>>,
    sent: Mutex<Vec<Request>>,
}

impl Scripted {
    fn new(frames: Vec<(&'static str, Value)>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            open: true,
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn closed() -> Self {
        Self {
            open: false,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl Requester for Scripted {
    async fn call_any(
        &self,
        req: Request,
        expect: &[EventName],
        timeout: Duration,
    ) -> Result<Reply> {
        self.calls.lock().unwrap().push((
            req.event().as_str().to_string(),
            req.data().cloned(),
            timeout,
        ));
        expect
            .iter()
            .find_map(|e| self.frames.get(e.as_str()))
            .map(unwrap_frame)
            .ok_or_else(|| OnchatError::Timeout {
                event: req.event().as_str().to_string(),
                after_ms: timeout.as_millis() as u64,
            })
    }

    async fn send(&self, req: Request) -> Result<()> {
        self.sent.lock().unwrap().push(req);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

fn api(frames: Vec<(&'static str, Value)>) -> ChatApi<Scripted> {
    ChatApi::new(Scripted::new(frames), RequestSection::default())
}

#[tokio::test]
async fn login_returns_grant() {
    let api = api(vec![(
        "LOGIN",
        json!({ "event": "LOGIN", "status": "success", "data": { "RE_LOGIN_CODE": "nlu_123" } }),
    )]);

    let grant = api.login("alice", "pw").await.expect("login");
    assert_eq!(grant.relogin_code.as_deref(), Some("nlu_123"));

    let calls = api.requester().calls.lock().unwrap();
    assert_eq!(calls[0].0, "LOGIN");
    assert_eq!(calls[0].1, Some(json!({ "user": "alice", "pass": "pw" })));
    assert_eq!(calls[0].2, Duration::from_millis(10_000));
}

#[tokio::test]
async fn login_error_status_carries_server_text() {
    let api = api(vec![(
        "LOGIN",
        json!({ "event": "LOGIN", "status": "error", "mes": "Wrong password" }),
    )]);

    let err = api.login("alice", "nope").await.expect_err("rejected");
    assert_eq!(err.kind().as_str(), "PROTOCOL_STATUS");
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("Wrong password"));
}

#[tokio::test]
async fn relogin_accepts_login_tagged_reply() {
    let api = api(vec![(
        "LOGIN",
        json!({ "event": "LOGIN", "status": "success", "data": { "RE_LOGIN_CODE": "fresh" } }),
    )]);

    let grant = api.relogin("alice", "old").await.expect("resumed");
    assert_eq!(grant.relogin_code.as_deref(), Some("fresh"));
    let calls = api.requester().calls.lock().unwrap();
    assert_eq!(calls[0].0, "RE_LOGIN");
    assert_eq!(calls[0].1, Some(json!({ "user": "alice", "code": "old" })));
}

#[tokio::test]
async fn missing_reply_is_a_timeout() {
    let api = api(Vec::new());
    let err = api.join_room("lobby").await.expect_err("no reply");
    assert_eq!(err.kind().as_str(), "TIMEOUT");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn logout_is_fire_and_forget() {
    let api = api(Vec::new());
    api.logout().await.expect("sent");
    let sent = api.requester().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_value(), json!({ "action": "onchat", "data": { "event": "LOGOUT" } }));
}

#[tokio::test]
async fn logout_on_closed_socket_is_ok() {
    let api = ChatApi::new(Scripted::closed(), RequestSection::default());
    api.logout().await.expect("treated as logged out");
    assert!(api.requester().sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rooms_fall_back_to_requested_name() {
    let api = api(vec![
        (
            "CREATE_ROOM",
            json!({ "event": "CREATE_ROOM", "status": "success", "data": { "name": "dev", "own": "alice" } }),
        ),
        ("JOIN_ROOM", json!({ "event": "JOIN_ROOM", "status": "success" })),
    ]);

    let created = api.create_room("dev").await.expect("created");
    assert_eq!(created.name, "dev");
    assert_eq!(created.owner.as_deref(), Some("alice"));

    let joined = api.join_room("lobby").await.expect("joined");
    assert_eq!(joined.name, "lobby");
    assert_eq!(joined.owner, None);
    assert_eq!(api.requester().calls.lock().unwrap()[1].2, Duration::from_millis(6000));
}

#[tokio::test]
async fn history_routes_by_conversation_kind() {
    let api = api(vec![
        (
            "GET_ROOM_CHAT_MES",
            json!({ "event": "GET_ROOM_CHAT_MES", "status": "success",
                    "data": { "name": "lobby", "chatData": [{ "id": 2 }, { "id": 1 }] } }),
        ),
        (
            "GET_PEOPLE_CHAT_MES",
            json!({ "event": "GET_PEOPLE_CHAT_MES", "status": "success", "data": [{ "id": 7 }] }),
        ),
    ]);

    let room = api.history(&Conversation::room("lobby"), 1).await.unwrap();
    assert_eq!(room.records.len(), 2);
    assert!(room.is_newest_first());

    let dm = api.history(&Conversation::people("bob"), 3).await.unwrap();
    assert_eq!(dm.records, vec![json!({ "id": 7 })]);

    let calls = api.requester().calls.lock().unwrap();
    assert_eq!(calls[0].1, Some(json!({ "name": "lobby", "page": 1 })));
    assert_eq!(calls[1].0, "GET_PEOPLE_CHAT_MES");
    assert_eq!(calls[1].1, Some(json!({ "name": "bob", "page": 3 })));
    assert_eq!(calls[1].2, Duration::from_millis(8000));
}

#[tokio::test]
async fn presence_and_existence_flags() {
    let api = api(vec![
        (
            "CHECK_USER_ONLINE",
            json!({ "event": "CHECK_USER_ONLINE", "status": "success", "data": { "status": true } }),
        ),
        (
            "CHECK_USER_EXIST",
            json!({ "event": "CHECK_USER_EXIST", "status": "success", "data": { "status": "true" } }),
        ),
    ]);

    assert!(api.check_user_online("bob").await.unwrap());
    // only a literal boolean counts
    assert!(!api.check_user_exist("bob").await.unwrap());
}

#[tokio::test]
async fn user_list_builds_directory() {
    let api = api(vec![(
        "GET_USER_LIST",
        json!({ "event": "GET_USER_LIST", "status": "success", "data": [
            { "name": "lobby", "type": 1 },
            { "name": "bob", "type": 0 },
            { "name": "alice", "type": 0 }
        ] }),
    )]);

    let dir = api.user_list().await.unwrap();
    assert_eq!(dir.rooms.len(), 1);
    assert_eq!(dir.rooms[0].name, "lobby");
    let others: Vec<&str> = dir.users_except("Alice").into_iter().map(|p| p.name.as_str()).collect();
    assert_eq!(others, vec!["bob"]);
}

#[tokio::test]
async fn send_chat_passes_wire_text_through() {
    let api = api(Vec::new());
    api.send_chat(ChatTarget::People, "bob", "aGk=").await.unwrap();

    let sent = api.requester().sent.lock().unwrap();
    assert_eq!(
        sent[0].data(),
        Some(&json!({ "type": "people", "to": "bob", "mes": "aGk=" }))
    );
}

//! Chatroom behavior against an in-process stub of the variable service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::time::timeout;

use vaas_chat::{ChatRoom, decode_log, encode_log};
use vaas_client::{ClientConfig, VaasClient};

const VARIABLE_ID: i64 = 9;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Default)]
struct StubState {
    value: Mutex<Value>,
    get_count: Mutex<u32>,
    fail_gets: Mutex<bool>,
}

fn variable_body(value: &Value) -> Value {
    json!({
        "success": true,
        "data": {
            "id": VARIABLE_ID,
            "name": "chat",
            "type": 2,
            "visibility": 2,
            "isNullable": false,
            "value": value,
            "userId": 1
        }
    })
}

async fn get_variable(
    State(state): State<Arc<StubState>>,
    Path(_id): Path<i64>,
) -> impl IntoResponse {
    *state.get_count.lock().unwrap() += 1;
    if *state.fail_gets.lock().unwrap() {
        return Json(json!({ "success": false, "reason": "quota exhausted" }));
    }
    let value = state.value.lock().unwrap().clone();
    Json(variable_body(&value))
}

async fn patch_variable(
    State(state): State<Arc<StubState>>,
    Path(_id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    if let Some(value) = body.get("value") {
        *state.value.lock().unwrap() = value.clone();
    }
    let value = state.value.lock().unwrap().clone();
    Json(variable_body(&value))
}

async fn start_stub(state: Arc<StubState>) -> Result<SocketAddr> {
    let app = Router::new()
        .route("/api/var/:id", get(get_variable))
        .route("/api/var/:id", patch(patch_variable))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind stub listener")?;
    let addr = listener.local_addr().context("stub local addr")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

async fn room_against(state: Arc<StubState>) -> Result<(ChatRoom, Arc<VaasClient>)> {
    let addr = start_stub(state).await?;
    let client = Arc::new(
        VaasClient::new(ClientConfig::new(format!("http://{addr}")).with_api_key("k1"))
            .context("build client")?,
    );
    let room = ChatRoom::new(client.clone(), VARIABLE_ID).with_poll_interval(POLL_INTERVAL);
    Ok((room, client))
}

#[tokio::test]
async fn entering_and_sending_appends_to_an_empty_remote_log() -> Result<()> {
    let state = Arc::new(StubState::default());
    *state.value.lock().unwrap() = json!("[]");
    let (mut room, _client) = room_against(state.clone()).await?;

    let before = chrono::Utc::now().timestamp_millis();
    room.enter("alice")?;
    room.send("hello").await?;
    let after = chrono::Utc::now().timestamp_millis();

    let remote = state.value.lock().unwrap().clone();
    let log = decode_log(Some(&remote))?;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].message, "hello");
    assert_eq!(log[0].user, "alice");
    assert!(log[0].time >= before && log[0].time <= after);
    Ok(())
}

#[tokio::test]
async fn poll_ticks_publish_the_remote_log() -> Result<()> {
    let state = Arc::new(StubState::default());
    *state.value.lock().unwrap() = encode_log(&[vaas_chat::ChatMessage {
        message: "welcome".to_string(),
        user: "bob".to_string(),
        time: 1000,
    }])
    .context("encode seed log")?;
    let (mut room, _client) = room_against(state.clone()).await?;

    room.enter("alice")?;
    let mut messages = room.messages()?;
    timeout(Duration::from_secs(2), messages.changed())
        .await
        .context("first poll tick")?
        .context("poller alive")?;

    let seen = messages.borrow().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].user, "bob");
    Ok(())
}

#[tokio::test]
async fn failed_poll_tick_keeps_the_cached_log() -> Result<()> {
    let state = Arc::new(StubState::default());
    *state.value.lock().unwrap() = json!(r#"[{"message":"hi","user":"bob","time":1}]"#);
    let (mut room, _client) = room_against(state.clone()).await?;

    room.enter("alice")?;
    let mut messages = room.messages()?;
    timeout(Duration::from_secs(2), messages.changed())
        .await
        .context("first poll tick")?
        .context("poller alive")?;
    assert_eq!(messages.borrow_and_update().len(), 1);

    // Every further fetch fails; the cached list must not change.
    *state.fail_gets.lock().unwrap() = true;
    tokio::time::sleep(POLL_INTERVAL * 4).await;
    assert!(!messages.has_changed().context("poller alive")?);
    assert_eq!(messages.borrow().len(), 1);
    Ok(())
}

#[tokio::test]
async fn a_tick_after_leaving_is_inert() -> Result<()> {
    let state = Arc::new(StubState::default());
    *state.value.lock().unwrap() = json!("[]");
    let (mut room, _client) = room_against(state.clone()).await?;

    room.enter("alice")?;
    timeout(Duration::from_secs(2), async {
        loop {
            if *state.get_count.lock().unwrap() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .context("poller started fetching")?;

    room.leave();
    let fetches_at_leave = *state.get_count.lock().unwrap();
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(*state.get_count.lock().unwrap(), fetches_at_leave);
    Ok(())
}

/// The read-modify-write window: two writers starting from the same base list
/// each publish their own copy, and the later write erases the earlier append.
#[tokio::test]
async fn interleaved_read_modify_write_loses_an_append() -> Result<()> {
    let state = Arc::new(StubState::default());
    *state.value.lock().unwrap() = json!("[]");
    let (_room, client) = room_against(state.clone()).await?;

    // Both writers read the same empty base before either writes.
    let base_a = decode_log(client.get_variable(VARIABLE_ID).await?.value.as_ref())?;
    let base_b = decode_log(client.get_variable(VARIABLE_ID).await?.value.as_ref())?;

    let mut log_a = base_a;
    log_a.push(vaas_chat::ChatMessage {
        message: "a".to_string(),
        user: "alice".to_string(),
        time: 1,
    });
    let mut log_b = base_b;
    log_b.push(vaas_chat::ChatMessage {
        message: "b".to_string(),
        user: "bob".to_string(),
        time: 2,
    });

    for log in [&log_a, &log_b] {
        client
            .update_variable(VARIABLE_ID, vaas_client::PatchVariableRequest {
                value: Some(encode_log(log)?),
                ..vaas_client::PatchVariableRequest::default()
            })
            .await?;
    }

    // Last writer wins: "a" is gone.
    let remote = state.value.lock().unwrap().clone();
    let final_log = decode_log(Some(&remote))?;
    assert_eq!(final_log.len(), 1);
    assert_eq!(final_log[0].message, "b");
    Ok(())
}

//! HTTP integration tests: the full negotiation workflow driven through
//! the REST API against an ephemeral listener.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio_test::assert_ok;

use slotswap::api;
use slotswap::app_state::AppState;
use slotswap::domain::{EventBus, RequestStore, Slot, SlotStatus, SlotStore, UserId};
use slotswap::service::SwapService;

/// Serves the API on an ephemeral port, returning its address and a
/// handle to the service for seeding and direct state assertions.
async fn spawn_server() -> (SocketAddr, Arc<SwapService>) {
    let slots = Arc::new(SlotStore::new());
    let requests = Arc::new(RequestStore::new());
    let event_bus = EventBus::new(64);
    let swap_service = Arc::new(SwapService::new(slots, requests, event_bus.clone()));

    let state = AppState {
        swap_service: Arc::clone(&swap_service),
        event_bus,
    };
    let app = Router::new().merge(api::build_router()).with_state(state);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("failed to read listener addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, swap_service)
}

async fn seed_listed_slot(service: &SwapService, owner: UserId) -> slotswap::domain::SlotId {
    let mut slot = Slot::new(owner, "shift".to_string(), Utc::now(), Utc::now());
    slot.status = SlotStatus::Swappable;
    assert_ok!(service.slots().insert(slot).await)
}

async fn json_body(response: reqwest::Response) -> Value {
    let Ok(body) = response.json::<Value>().await else {
        panic!("response body is not JSON");
    };
    body
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (addr, _service) = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client.get(format!("http://{addr}/health")).send().await else {
        panic!("health request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn missing_identity_is_rejected() {
    let (addr, _service) = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client
        .get(format!("http://{addr}/api/v1/swap-requests"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], 1002);
}

#[tokio::test]
async fn full_negotiation_workflow_over_http() {
    let (addr, service) = spawn_server().await;
    let client = reqwest::Client::new();

    let user1 = UserId::new();
    let user2 = UserId::new();
    let slot1 = seed_listed_slot(&service, user1).await;
    let slot2 = seed_listed_slot(&service, user2).await;

    // user2's slot shows up in user1's marketplace.
    let Ok(marketplace) = client
        .get(format!("http://{addr}/api/v1/slots/swappable"))
        .header("x-user-id", user1.to_string())
        .send()
        .await
    else {
        panic!("marketplace request failed");
    };
    assert_eq!(marketplace.status(), StatusCode::OK);
    let body = json_body(marketplace).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["slots"][0]["id"], slot2.to_string());

    // user1 offers slot1 against slot2.
    let Ok(created) = client
        .post(format!("http://{addr}/api/v1/swap-requests"))
        .header("x-user-id", user1.to_string())
        .json(&json!({ "my_slot_id": slot1, "their_slot_id": slot2 }))
        .send()
        .await
    else {
        panic!("create request failed");
    };
    assert_eq!(created.status(), StatusCode::CREATED);
    let created_body = json_body(created).await;
    assert_eq!(created_body["status"], "PENDING");
    assert_eq!(created_body["responder_id"], user2.to_string());
    let Some(request_id) = created_body["id"].as_str().map(str::to_string) else {
        panic!("missing request id");
    };

    // The request is in user2's incoming feed.
    let Ok(feed) = client
        .get(format!("http://{addr}/api/v1/swap-requests"))
        .header("x-user-id", user2.to_string())
        .send()
        .await
    else {
        panic!("feed request failed");
    };
    let feed_body = json_body(feed).await;
    assert_eq!(feed_body["total_incoming"], 1);
    assert_eq!(feed_body["total_outgoing"], 0);
    assert_eq!(feed_body["incoming"][0]["id"], request_id);

    // user2 accepts; ownership is exchanged.
    let Ok(accepted) = client
        .post(format!(
            "http://{addr}/api/v1/swap-requests/{request_id}/respond"
        ))
        .header("x-user-id", user2.to_string())
        .json(&json!({ "accepted": true }))
        .send()
        .await
    else {
        panic!("respond request failed");
    };
    assert_eq!(accepted.status(), StatusCode::OK);
    let accepted_body = json_body(accepted).await;
    assert_eq!(accepted_body["status"], "ACCEPTED");

    let Ok(slot1_after) = service.slots().get(slot1).await else {
        panic!("slot1 missing");
    };
    let Ok(slot2_after) = service.slots().get(slot2).await else {
        panic!("slot2 missing");
    };
    assert_eq!(slot1_after.owner_id, user2);
    assert_eq!(slot2_after.owner_id, user1);
    assert_eq!(slot1_after.status, SlotStatus::Busy);
    assert_eq!(slot2_after.status, SlotStatus::Busy);

    // A second resolution reports the conflict.
    let Ok(again) = client
        .post(format!(
            "http://{addr}/api/v1/swap-requests/{request_id}/respond"
        ))
        .header("x-user-id", user2.to_string())
        .json(&json!({ "accepted": false }))
        .send()
        .await
    else {
        panic!("second respond request failed");
    };
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let again_body = json_body(again).await;
    assert_eq!(again_body["error"]["code"], 2003);
}

#[tokio::test]
async fn swapping_an_unlisted_slot_is_unprocessable() {
    let (addr, service) = spawn_server().await;
    let client = reqwest::Client::new();

    let user1 = UserId::new();
    let user2 = UserId::new();
    // slot1 stays BUSY: never listed.
    let busy = Slot::new(user1, "busy".to_string(), Utc::now(), Utc::now());
    let slot1 = busy.id;
    assert_ok!(service.slots().insert(busy).await);
    let slot2 = seed_listed_slot(&service, user2).await;

    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/swap-requests"))
        .header("x-user-id", user1.to_string())
        .json(&json!({ "my_slot_id": slot1, "their_slot_id": slot2 }))
        .send()
        .await
    else {
        panic!("create request failed");
    };
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], 4001);
}

#[tokio::test]
async fn stranger_cannot_resolve_a_request() {
    let (addr, service) = spawn_server().await;
    let client = reqwest::Client::new();

    let user1 = UserId::new();
    let user2 = UserId::new();
    let slot1 = seed_listed_slot(&service, user1).await;
    let slot2 = seed_listed_slot(&service, user2).await;

    let Ok(request) = service.create_swap(user1, slot1, slot2).await else {
        panic!("create_swap failed");
    };

    let Ok(response) = client
        .post(format!(
            "http://{addr}/api/v1/swap-requests/{}/respond",
            request.id
        ))
        .header("x-user-id", UserId::new().to_string())
        .json(&json!({ "accepted": true }))
        .send()
        .await
    else {
        panic!("respond request failed");
    };
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_toggle_over_http() {
    let (addr, service) = spawn_server().await;
    let client = reqwest::Client::new();

    let owner = UserId::new();
    let slot = Slot::new(owner, "standup".to_string(), Utc::now(), Utc::now());
    let slot_id = slot.id;
    assert_ok!(service.slots().insert(slot).await);

    let Ok(listed) = client
        .put(format!("http://{addr}/api/v1/slots/{slot_id}/listing"))
        .header("x-user-id", owner.to_string())
        .json(&json!({ "swappable": true }))
        .send()
        .await
    else {
        panic!("listing request failed");
    };
    assert_eq!(listed.status(), StatusCode::OK);
    let body = json_body(listed).await;
    assert_eq!(body["status"], "SWAPPABLE");

    // Another user now sees it on the marketplace.
    let Ok(marketplace) = client
        .get(format!("http://{addr}/api/v1/slots/swappable"))
        .header("x-user-id", UserId::new().to_string())
        .send()
        .await
    else {
        panic!("marketplace request failed");
    };
    let market_body = json_body(marketplace).await;
    assert_eq!(market_body["count"], 1);

    // Toggling someone else's slot is forbidden.
    let Ok(forbidden) = client
        .put(format!("http://{addr}/api/v1/slots/{slot_id}/listing"))
        .header("x-user-id", UserId::new().to_string())
        .json(&json!({ "swappable": false }))
        .send()
        .await
    else {
        panic!("listing request failed");
    };
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejection_relists_both_slots() {
    let (addr, service) = spawn_server().await;
    let client = reqwest::Client::new();

    let user1 = UserId::new();
    let user2 = UserId::new();
    let slot1 = seed_listed_slot(&service, user1).await;
    let slot2 = seed_listed_slot(&service, user2).await;

    let Ok(request) = service.create_swap(user1, slot1, slot2).await else {
        panic!("create_swap failed");
    };

    let Ok(response) = client
        .post(format!(
            "http://{addr}/api/v1/swap-requests/{}/respond",
            request.id
        ))
        .header("x-user-id", user2.to_string())
        .json(&json!({ "accepted": false }))
        .send()
        .await
    else {
        panic!("respond request failed");
    };
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "REJECTED");

    let Ok(slot1_after) = service.slots().get(slot1).await else {
        panic!("slot1 missing");
    };
    let Ok(slot2_after) = service.slots().get(slot2).await else {
        panic!("slot2 missing");
    };
    assert_eq!(slot1_after.status, SlotStatus::Swappable);
    assert_eq!(slot2_after.status, SlotStatus::Swappable);
    assert_eq!(slot1_after.owner_id, user1);
    assert_eq!(slot2_after.owner_id, user2);
}

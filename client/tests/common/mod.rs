//! In-process mock of the rave REST API.
#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use uuid::Uuid;

use rave_client::notify::CollectingNotifier;
use rave_client::store::{MemoryTokenStore, TokenStore};
use rave_client::{Config, Rave};

pub const TOKEN: &str = "valid-token";
pub const PASSWORD: &str = "correct-horse";
pub const HOST_ID: &str = "0b1c2d3e-4f50-4a6b-9c7d-8e9f0a1b2c3d";
pub const USER_ID: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";

#[derive(Default)]
pub struct MockApi {
    hits: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, Value)>>,
    pub wishlist: Mutex<HashSet<Uuid>>,
    pub events: Mutex<Vec<Value>>,
    pub fail_wishlist: AtomicBool,
    pub reject_sessions: AtomicBool,
    wishlist_gate: Mutex<Option<Arc<Notify>>>,
    /// Signalled when a wishlist add/remove reaches the server.
    pub wishlist_arrived: Notify,
}

impl MockApi {
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self, prefix: &str) -> usize {
        self.hits().iter().filter(|h| h.starts_with(prefix)).count()
    }

    pub fn bodies_for(&self, route: &str) -> Vec<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == route)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record_body(&self, route: &str, body: &Value) {
        self.bodies
            .lock()
            .unwrap()
            .push((route.to_string(), body.clone()));
    }

    pub fn set_fail_wishlist(&self, fail: bool) {
        self.fail_wishlist.store(fail, Ordering::SeqCst);
    }

    /// Holds wishlist add/remove requests until the returned gate is
    /// notified, once per request.
    pub fn hold_wishlist(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.wishlist_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    async fn pass_wishlist_gate(&self) {
        let gate = self.wishlist_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.wishlist_arrived.notify_one();
            gate.notified().await;
        }
    }

    pub fn set_reject_sessions(&self, reject: bool) {
        self.reject_sessions.store(reject, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub api: Arc<MockApi>,
    pub rave: Rave,
    pub tokens: MemoryTokenStore,
    pub notices: CollectingNotifier,
    pub addr: SocketAddr,
}

pub async fn spawn() -> Harness {
    spawn_with(MemoryTokenStore::new()).await
}

pub async fn spawn_logged_in() -> Harness {
    spawn_with(MemoryTokenStore::with_token(TOKEN)).await
}

async fn spawn_with(tokens: MemoryTokenStore) -> Harness {
    let api = Arc::new(MockApi::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(api.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config::with_api_url(format!("http://{}", addr));
    let notices = CollectingNotifier::new();
    let rave = Rave::from_config(&config, Arc::new(tokens.clone()))
        .unwrap()
        .with_notifier(Arc::new(notices.clone()));

    Harness {
        api,
        rave,
        tokens,
        notices,
        addr,
    }
}

pub fn event_json(id: Uuid, title: &str, status: &str, ticket_types: Value) -> Value {
    json!({
        "id": id,
        "hostId": HOST_ID,
        "title": title,
        "description": "A night to remember",
        "startDate": "2026-11-20",
        "startTime": "22:00",
        "location": { "address": "1 Dock Rd, Lagos", "description": "Warehouse 4" },
        "tags": ["techno"],
        "status": status,
        "ticketTypes": ticket_types,
        "createdAt": "2026-10-01T10:00:00Z",
        "updatedAt": "2026-10-01T10:00:00Z"
    })
}

pub fn user_json() -> Value {
    json!({
        "id": USER_ID,
        "name": "Ada Obi",
        "username": "ada",
        "email": "ada@rave.ng",
        "role": "host"
    })
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data, "message": "OK" })).into_response()
}

fn fail(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": { "code": code, "message": message, "details": null }
        })),
    )
        .into_response()
}

fn authorize(api: &MockApi, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", TOKEN);
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if api.reject_sessions.load(Ordering::SeqCst) || presented != Some(expected.as_str()) {
        return Err(fail(StatusCode::UNAUTHORIZED, "AUTH_ERROR", "Token expired"));
    }
    Ok(())
}

fn event_from_input(id: Uuid, input: &Value) -> Value {
    let mut event = input.clone();
    let ticket_types: Vec<Value> = input["ticketTypes"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|mut t| {
            if t.get("id").is_none() {
                t["id"] = json!(Uuid::new_v4());
            }
            t
        })
        .collect();
    event["id"] = json!(id);
    event["hostId"] = json!(HOST_ID);
    event["ticketTypes"] = json!(ticket_types);
    event["createdAt"] = json!("2026-10-01T10:00:00Z");
    event["updatedAt"] = json!("2026-10-01T10:00:00Z");
    event
}

async fn record(State(api): State<Arc<MockApi>>, request: Request, next: Next) -> Response {
    let path = request.uri().path().trim_start_matches("/api/v1").to_string();
    api.hits
        .lock()
        .unwrap()
        .push(format!("{} {}", request.method(), path));
    next.run(request).await
}

fn router(api: Arc<MockApi>) -> Router {
    let routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event).put(update_event))
        .route("/events/:id/reviews", get(list_reviews).post(create_review))
        .route("/wishlist", get(list_wishlist))
        .route("/wishlist/:id", post(add_wishlist).delete(remove_wishlist))
        .route("/wishlist/:id/status", get(wishlist_status))
        .route("/tickets", get(my_tickets))
        .route("/tickets/rsvp", post(rsvp))
        .route("/payments/initialize", post(initialize_payment))
        .route("/payments/verify/:reference", get(verify_payment))
        .route("/host/check-in", post(check_in))
        .route("/broken", get(broken));

    Router::new()
        .nest("/api/v1", routes)
        .layer(middleware::from_fn_with_state(api.clone(), record))
        .with_state(api)
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "suspended@rave.ng" {
        return fail(
            StatusCode::UNAUTHORIZED,
            "ACCOUNT_SUSPENDED",
            "This account has been suspended",
        );
    }
    if body["password"] == PASSWORD {
        ok(json!({ "token": TOKEN, "user": user_json() }))
    } else {
        fail(
            StatusCode::BAD_REQUEST,
            "INVALID_CREDENTIALS",
            "Invalid email or password",
        )
    }
}

async fn forgot_password(State(api): State<Arc<MockApi>>, Json(body): Json<Value>) -> Response {
    api.record_body("POST /auth/forgot-password", &body);
    ok(Value::Null)
}

async fn reset_password(State(api): State<Arc<MockApi>>, Json(body): Json<Value>) -> Response {
    api.record_body("POST /auth/reset-password", &body);
    if body["token"] != "reset-ok" {
        return fail(
            StatusCode::BAD_REQUEST,
            "INVALID_TOKEN",
            "This reset link has expired",
        );
    }
    ok(Value::Null)
}

async fn logout() -> Response {
    ok(Value::Null)
}

async fn me(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    ok(user_json())
}

async fn list_events(State(api): State<Arc<MockApi>>) -> Response {
    ok(Value::Array(api.events.lock().unwrap().clone()))
}

async fn get_event(State(api): State<Arc<MockApi>>, Path(id): Path<Uuid>) -> Response {
    let found = api
        .events
        .lock()
        .unwrap()
        .iter()
        .find(|e| e["id"] == json!(id))
        .cloned();
    match found {
        Some(event) => ok(event),
        None => fail(StatusCode::NOT_FOUND, "NOT_FOUND", "Event not found"),
    }
}

async fn create_event(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    api.record_body("POST /events", &body);
    if body["title"] == "Duplicate" {
        return fail(
            StatusCode::CONFLICT,
            "DUPLICATE_EVENT",
            "An event with this title already exists",
        );
    }
    let event = event_from_input(Uuid::new_v4(), &body);
    api.events.lock().unwrap().push(event.clone());
    ok(event)
}

async fn update_event(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    api.record_body("PUT /events", &body);
    let event = event_from_input(id, &body);
    let mut events = api.events.lock().unwrap();
    events.retain(|e| e["id"] != json!(id));
    events.push(event.clone());
    ok(event)
}

async fn list_reviews() -> Response {
    ok(json!([]))
}

async fn create_review(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    ok(json!({
        "id": Uuid::new_v4(),
        "eventId": id,
        "userId": USER_ID,
        "userName": "Ada Obi",
        "rating": body["rating"],
        "comment": body["comment"],
        "helpfulCount": 0,
        "createdAt": "2026-10-01T10:00:00Z",
        "updatedAt": "2026-10-01T10:00:00Z"
    }))
}

async fn list_wishlist(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    let saved = api.wishlist.lock().unwrap().clone();
    let events: Vec<Value> = api
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| {
            e["id"]
                .as_str()
                .and_then(|id| Uuid::parse_str(id).ok())
                .is_some_and(|id| saved.contains(&id))
        })
        .cloned()
        .collect();
    ok(Value::Array(events))
}

async fn wishlist_status(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    let saved = api.wishlist.lock().unwrap().contains(&id);
    ok(json!({ "inWishlist": saved }))
}

async fn add_wishlist(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    api.pass_wishlist_gate().await;
    if api.fail_wishlist.load(Ordering::SeqCst) {
        return fail(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", "db down");
    }
    api.wishlist.lock().unwrap().insert(id);
    ok(Value::Null)
}

async fn remove_wishlist(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    api.pass_wishlist_gate().await;
    if api.fail_wishlist.load(Ordering::SeqCst) {
        return fail(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", "db down");
    }
    api.wishlist.lock().unwrap().remove(&id);
    ok(Value::Null)
}

async fn my_tickets(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    ok(json!([]))
}

async fn rsvp(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    api.record_body("POST /tickets/rsvp", &body);
    let mut tickets = Vec::new();
    for item in body["items"].as_array().cloned().unwrap_or_default() {
        for attendee in item["attendees"].as_array().cloned().unwrap_or_default() {
            tickets.push(json!({
                "id": Uuid::new_v4(),
                "userId": USER_ID,
                "eventId": body["eventId"],
                "ticketTypeId": item["ticketTypeId"],
                "attendee": attendee,
                "qrCode": format!("RAVE-{}", Uuid::new_v4()),
                "quantity": 1,
                "purchasedAt": "2026-10-19T12:00:00Z"
            }));
        }
    }
    ok(Value::Array(tickets))
}

async fn initialize_payment(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    api.record_body("POST /payments/initialize", &body);
    ok(json!({
        "reference": "ref_123",
        "amount": "7000",
        "currency": "NGN",
        "publicKey": "pk_test_abc"
    }))
}

async fn verify_payment(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(reference): Path<String>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    let status = match reference.as_str() {
        "ref_123" => "success",
        "ref_pending" => "pending",
        _ => return fail(StatusCode::NOT_FOUND, "NOT_FOUND", "Unknown reference"),
    };
    ok(json!({ "reference": reference, "status": status, "amount": "25000" }))
}

async fn check_in(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&api, &headers) {
        return denied;
    }
    if body["qrCode"] != "RAVE-OK" {
        return fail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_TICKET",
            "This ticket is not valid for this event",
        );
    }
    ok(json!({
        "attendee": {
            "ticketId": Uuid::new_v4(),
            "name": "Bola",
            "email": "bola@rave.ng",
            "ticketTypeName": "General",
            "quantity": 1,
            "amount": 5000,
            "checkedIn": true
        },
        "alreadyCheckedIn": false
    }))
}

async fn broken() -> Response {
    fail(
        StatusCode::INTERNAL_SERVER_ERROR,
        "PANIC",
        "NullPointerException at line 42",
    )
}

/// Token currently held by the client's store.
pub fn stored_token(harness: &Harness) -> Option<String> {
    harness.tokens.get()
}

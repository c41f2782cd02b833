use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Seeded bootstrap credentials (must match the initial migration).
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "change-me";

async fn spawn_app() -> Router {
    let mut config = balota::Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    let state = balota::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    balota::api::router(state).await
}

/// Fires one request and returns (status, parsed body, session cookie if set).
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let session_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body, session_cookie)
}

async fn login_admin(app: &Router) -> String {
    let (status, _, cookie) = send(
        app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("admin login should set a session cookie")
}

async fn login_voter(app: &Router, fin: &str, password: &str) -> (StatusCode, Value, Option<String>) {
    send(
        app,
        Method::POST,
        "/api/voter/login",
        None,
        Some(json!({ "fin": fin, "password": password })),
    )
    .await
}

fn voter_payload(fin: &str, phone: Option<&str>) -> Value {
    json!({
        "full_name": "Alem Kebede",
        "age": 32,
        "sex": "F",
        "region": "Amhara",
        "zone": "North Gondar",
        "woreda": "Gondar Zuria",
        "kebele": "02",
        "fin": fin,
        "phone": phone,
    })
}

async fn open_registration(app: &Router, admin: &str) {
    let (status, _, _) = send(
        app,
        Method::PUT,
        "/api/registration/flag",
        Some(admin),
        Some(json!({ "open": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn open_election(app: &Router, admin: &str) {
    let now = Utc::now();
    let (status, _, _) = send(
        app,
        Method::PUT,
        "/api/election/period",
        Some(admin),
        Some(json!({
            "start_date": (now - Duration::hours(1)).to_rfc3339(),
            "end_date": (now + Duration::hours(1)).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_party(app: &Router, admin: &str, name: &str) -> i64 {
    let (status, body, _) = send(
        app,
        Method::POST,
        "/api/parties",
        Some(admin),
        Some(json!({ "name_english": name, "name_amharic": "ፓርቲ" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_admin_session_gates_protected_routes() {
    let app = spawn_app().await;

    let (status, _, _) = send(&app, Method::GET, "/api/admins", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "username": ADMIN_USERNAME, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = login_admin(&app).await;
    let (status, body, _) = send(&app, Method::GET, "/api/admins", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["is_bootstrap"], json!(true));
}

#[tokio::test]
async fn test_public_endpoints_need_no_session() {
    let app = spawn_app().await;

    let (status, body, _) = send(&app, Method::GET, "/api/election/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["election_open"], json!(false));
    assert_eq!(body["data"]["registration_open"], json!(false));

    let (status, body, _) = send(&app, Method::GET, "/api/parties", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_registration_validation_and_conflicts() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", Some("0911000000"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fin"], json!("1234-5678-9012"));
    assert_eq!(body["data"]["has_changed_password"], json!(false));

    // Same FIN again
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Same phone, different FIN
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("9999-8888-7777", Some("0911000000"))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Malformed FIN
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("123456789012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Underage
    let mut minor = voter_payload("2222-3333-4444", None);
    minor["age"] = json!(17);
    let (status, _, _) = send(&app, Method::POST, "/api/voters", Some(&admin), Some(minor)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_registration_refused_while_election_open() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;
    open_election(&app, &admin).await;

    // The explicit flag does not override a live election.
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_vote_end_to_end_and_single_vote() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let party_id = create_party(&app, &admin, "Unity Party").await;
    open_election(&app, &admin).await;

    let (status, body, voter_cookie) = login_voter(&app, "1234-5678-9012", "default123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["must_change_password"], json!(true));
    let voter_cookie = voter_cookie.unwrap();

    // Default secret still in place: the ballot is unreachable.
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&voter_cookie),
        Some(json!({ "party_id": party_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voter/password",
        Some(&voter_cookie),
        Some(json!({
            "current_password": "default123",
            "new_password": "hunter2hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&voter_cookie),
        Some(json!({ "party_id": party_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Second ballot from the same voter
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&voter_cookie),
        Some(json!({ "party_id": party_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body, _) = send(&app, Method::GET, "/api/vote/status", Some(&voter_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["has_voted"], json!(true));

    let (status, body, _) = send(&app, Method::GET, "/api/results", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_votes"], json!(1));
    assert_eq!(body["data"]["registered_voters"], json!(1));
    assert_eq!(body["data"]["tally"][0]["votes"], json!(1));
}

#[tokio::test]
async fn test_vote_refused_outside_window_and_for_unknown_party() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let party_id = create_party(&app, &admin, "Unity Party").await;

    let (_, _, voter_cookie) = login_voter(&app, "1234-5678-9012", "default123").await;
    let voter_cookie = voter_cookie.unwrap();
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voter/password",
        Some(&voter_cookie),
        Some(json!({
            "current_password": "default123",
            "new_password": "hunter2hunter2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // No election window set
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&voter_cookie),
        Some(json!({ "party_id": party_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    open_election(&app, &admin).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/vote",
        Some(&voter_cookie),
        Some(json!({ "party_id": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_voter_lockout_after_failed_attempts() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Default policy: 5 attempts before the lock engages.
    for _ in 0..4 {
        let (status, _, _) = login_voter(&app, "1234-5678-9012", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _, _) = login_voter(&app, "1234-5678-9012", "wrong").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Correct password while locked is still refused.
    let (status, _, _) = login_voter(&app, "1234-5678-9012", "default123").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_privilege_levels_enforced() {
    let app = spawn_app().await;
    let bootstrap = login_admin(&app).await;

    // Bootstrap creates one super admin and one plain admin.
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/admins",
        Some(&bootstrap),
        Some(json!({ "username": "chief", "password": "longenough", "role": "super_admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/admins",
        Some(&bootstrap),
        Some(json!({ "username": "clerk", "password": "longenough", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, super_cookie) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "username": "chief", "password": "longenough" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let super_cookie = super_cookie.unwrap();

    // A non-bootstrap super admin cannot touch the election window.
    let now = Utc::now();
    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/api/election/period",
        Some(&super_cookie),
        Some(json!({
            "start_date": now.to_rfc3339(),
            "end_date": (now + Duration::hours(1)).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, clerk_cookie) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "username": "clerk", "password": "longenough" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let clerk_cookie = clerk_cookie.unwrap();

    // A plain admin cannot manage admins.
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/admins",
        Some(&clerk_cookie),
        Some(json!({ "username": "other", "password": "longenough", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_system_reset_preserves_bootstrap_admin() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    create_party(&app, &admin, "Unity Party").await;

    // Wrong confirmation code
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/system/reset",
        Some(&admin),
        Some(json!({ "confirm_code": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/system/reset",
        Some(&admin),
        Some(json!({ "confirm_code": "RESET_ALL_DATA" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send(&app, Method::GET, "/api/results", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_votes"], json!(0));
    assert_eq!(body["data"]["registered_voters"], json!(0));
    assert_eq!(body["data"]["active_parties"], json!(0));

    // Bootstrap admin survives and registration reopens.
    let (status, body, _) = send(&app, Method::GET, "/api/admins", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body, _) = send(&app, Method::GET, "/api/election/status", None, None).await;
    assert_eq!(body["data"]["registration_open"], json!(true));
}

#[tokio::test]
async fn test_audit_log_records_admin_actions() {
    let app = spawn_app().await;
    let admin = login_admin(&app).await;
    open_registration(&app, &admin).await;

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/voters",
        Some(&admin),
        Some(voter_payload("1234-5678-9012", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send(&app, Method::GET, "/api/audit", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["action"].as_str())
        .collect();
    assert!(actions.contains(&"admin_login_success"));
    assert!(actions.contains(&"register_voter"));

    let (status, body, _) = send(
        &app,
        Method::GET,
        "/api/audit?action=register",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["target"], json!("1234-5678-9012"));
}

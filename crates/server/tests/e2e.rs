use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, ServerState};
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::token::issue_verification_token;
use service::auth::{AuthConfig, AuthService};
use service::mail::mock::RecordingMailer;

const SECRET: &str = "test-secret";

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    mailer: Arc<RecordingMailer>,
}

/// Serve the real router against `DATABASE_URL`; `None` when it is not set.
async fn start_server() -> anyhow::Result<Option<TestApp>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip e2e tests");
        return Ok(None);
    }

    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let mailer = Arc::new(RecordingMailer::default());
    let auth = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db)), mailer.clone(), AuthConfig::new(SECRET));
    let app: Router = routes::build_router(ServerState::new(auth), cors());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(Some(TestApp { base_url, mailer }))
}

fn unique_account() -> (String, String) {
    let id = Uuid::new_v4().simple().to_string();
    (format!("u{}", &id[..12]), format!("{}@example.com", &id[..16]))
}

fn signup_body(username: &str, email: &str) -> Value {
    json!({
        "email": email,
        "username": username,
        "phone_number": "+5215512345678",
        "password": "carpool-2024!",
        "password_confirmation": "carpool-2024!",
        "first_name": "Maria",
        "last_name": "Lopez",
    })
}

#[tokio::test]
async fn signup_verify_login_against_postgres() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let (username, email) = unique_account();

    let resp = client
        .post(format!("{}/users/signup", app.base_url))
        .json(&signup_body(&username, &email))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::CREATED);
    assert_eq!(app.mailer.sent_count(), 1);

    let login = json!({"email": email, "password": "carpool-2024!"});
    let resp = client.post(format!("{}/users/login", app.base_url)).json(&login).send().await?;
    assert_eq!(resp.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({"non_field_errors": ["Account is not active yet"]}));

    let token = issue_verification_token(&username, SECRET, chrono::Duration::days(1))?;
    let resp = client
        .post(format!("{}/users/verify", app.base_url))
        .json(&json!({"token": token}))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::OK);

    let first: Value = client.post(format!("{}/users/login", app.base_url)).json(&login).send().await?.json().await?;
    let second: Value = client.post(format!("{}/users/login", app.base_url)).json(&login).send().await?.json().await?;
    assert_eq!(first["access_token"], second["access_token"]);
    assert_eq!(first["access_token"].as_str().map(str::len), Some(40));
    Ok(())
}

#[tokio::test]
async fn duplicate_username_against_postgres() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let (username, email) = unique_account();
    let (_, other_email) = unique_account();

    let resp = client.post(format!("{}/users/signup", app.base_url)).json(&signup_body(&username, &email)).send().await?;
    assert_eq!(resp.status(), HttpStatusCode::CREATED);

    let resp = client
        .post(format!("{}/users/signup", app.base_url))
        .json(&signup_body(&username, &other_email))
        .send()
        .await?;
    assert_eq!(resp.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({"username": ["This field must be unique."]}));
    Ok(())
}

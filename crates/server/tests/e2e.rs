use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth::ServerState};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::token::TokenSettings;
use service::auth::AuthConfig;

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Use DATABASE_URL from environment; if not present, skip tests gracefully
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip e2e tests. Provide .env.test or env var.");
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    }

    // Connect DB and run migrations
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await { eprintln!("migrations notice: {}", e); }

    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db });
    let settings = TokenSettings {
        key: "e2e-test-signing-key-0123456789abcdef".into(),
        issuer: "auth-server".into(),
        audience: "auth-clients".into(),
        expiry_minutes: 5,
    };
    let state = ServerState::new(repo, AuthConfig::new(settings));

    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_register_login_me_logout() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let c = client();

    let email = format!("user_{}@example.com", Uuid::new_v4());
    let name = "Tester";
    let password = "S3curePass!";

    // Register
    let res = c.post(format!("{}/register", app.base_url))
        .json(&json!({"name": name, "email": email, "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    // Same email again, different case
    let res = c.post(format!("{}/register", app.base_url))
        .json(&json!({"name": name, "email": email.to_uppercase(), "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    // Login -> set-cookie
    let res = c.post(format!("{}/login", app.base_url))
        .json(&json!({"email": email, "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.headers().get("set-cookie").is_some());
    let body = res.json::<serde_json::Value>().await?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty());

    // Bearer
    let res = reqwest::Client::new()
        .get(format!("{}/me", app.base_url))
        .bearer_auth(&token)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let me = res.json::<serde_json::Value>().await?;
    assert_eq!(me["email"], email.as_str());

    // Cookie jar carries the token too
    let res = c.get(format!("{}/me", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c.post(format!("{}/logout", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_login_failures_are_indistinguishable() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let c = reqwest::Client::new();
    let email = format!("user_{}@example.com", Uuid::new_v4());

    let _ = c.post(format!("{}/register", app.base_url))
        .json(&json!({"name": "Known", "email": email, "password": "StrongPass123!"}))
        .send().await?;

    let wrong = c.post(format!("{}/login", app.base_url))
        .json(&json!({"email": email, "password": "wrong"}))
        .send().await?;
    assert_eq!(wrong.status(), HttpStatusCode::UNAUTHORIZED);
    let wrong = wrong.json::<serde_json::Value>().await?;

    let unknown = c.post(format!("{}/login", app.base_url))
        .json(&json!({"email": format!("ghost_{}@example.com", Uuid::new_v4()), "password": "StrongPass123!"}))
        .send().await?;
    assert_eq!(unknown.status(), HttpStatusCode::UNAUTHORIZED);
    let unknown = unknown.json::<serde_json::Value>().await?;

    assert_eq!(wrong, unknown);
    Ok(())
}

#[tokio::test]
async fn e2e_me_without_token_unauthorized() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = match start_server().await {
        Ok(a) => a,
        Err(_) => return Ok(()),
    };
    let res = reqwest::Client::new().get(format!("{}/me", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

//! Router-level tests: every endpoint through `oneshot`, with a static
//! catalog and scripted answerers standing in for the LLM.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use api::core::app_state::AppState;
use api::create_router;
use support_flows::answerer::{
    CatalogAnswerOutput, CatalogAnswerer, CatalogQuestionInput, ContextualizeInput,
    ContextualizeOutput, ContextualizingAnswerer,
};
use support_flows::catalog::StaticCatalog;
use support_flows::selector::{CATALOG_UNAVAILABLE, GENERIC_FAILURE};
use support_flows::{AnswererError, Product, ResponseSelector};
use user_auth::{Argon2Hasher, AuthService, InMemoryUserStore};

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct Answers {
    catalog_calls: AtomicUsize,
    context_calls: AtomicUsize,
}

#[async_trait]
impl CatalogAnswerer for Answers {
    async fn answer_from_catalog(
        &self,
        input: CatalogQuestionInput,
    ) -> Result<CatalogAnswerOutput, AnswererError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CatalogAnswerOutput {
            answer: format!("Catalog answer to: {}", input.question),
            confidence: 0.85,
        })
    }
}

#[async_trait]
impl ContextualizingAnswerer for Answers {
    async fn contextualize_and_answer(
        &self,
        input: ContextualizeInput,
    ) -> Result<ContextualizeOutput, AnswererError> {
        self.context_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ContextualizeOutput {
            contextualized_question: input.question.clone(),
            answer: format!("Follow-up answer to: {}", input.question),
        })
    }
}

/// Answerer whose every call panics.
struct Crashing;

#[async_trait]
impl CatalogAnswerer for Crashing {
    async fn answer_from_catalog(
        &self,
        _input: CatalogQuestionInput,
    ) -> Result<CatalogAnswerOutput, AnswererError> {
        panic!("answerer crashed");
    }
}

#[async_trait]
impl ContextualizingAnswerer for Crashing {
    async fn contextualize_and_answer(
        &self,
        _input: ContextualizeInput,
    ) -> Result<ContextualizeOutput, AnswererError> {
        panic!("answerer crashed");
    }
}

fn catalog() -> Vec<Product> {
    vec![Product {
        id: "x1000".into(),
        name: "Smart Thermostat X1000".into(),
        features: "WiFi, scheduling".into(),
        category: "Home".into(),
        price: 199.0,
        extra: BTreeMap::new(),
    }]
}

fn make_app_with(products: Vec<Product>) -> (axum::Router, Arc<Answers>) {
    let answers = Arc::new(Answers::default());
    let selector = ResponseSelector::new(
        Arc::new(StaticCatalog::new(products)),
        answers.clone(),
        answers.clone(),
    );
    (router_over(selector), answers)
}

fn router_over(selector: ResponseSelector) -> axum::Router {
    let auth = AuthService::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
        3600,
    );
    let state = AppState::new(Arc::new(selector), Arc::new(auth), None);
    create_router(Arc::new(state))
}

fn make_app() -> (axum::Router, Arc<Answers>) {
    make_app_with(catalog())
}

fn post_json(uri: &str, token: Option<&str>, json: Value) -> Request<Body> {
    let mut req = Request::post(uri).header("content-type", "application/json");
    if let Some(t) = token {
        req = req.header("authorization", format!("Bearer {t}"));
    }
    req.body(Body::from(json.to_string())).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn signup(app: &axum::Router, email: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/auth/signup",
            None,
            json!({"email": email, "password": "pw"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let (app, _) = make_app();
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn signup_then_me() {
    let (app, _) = make_app();
    let token = signup(&app, "Ann@Example.com").await;

    let resp = app.oneshot(authed("GET", "/auth/me", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["email"], "ann@example.com");
}

#[tokio::test]
async fn duplicate_signup_is_conflict() {
    let (app, _) = make_app();
    signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json(
            "/auth/signup",
            None,
            json!({"email": "ann@example.com", "password": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "EMAIL_TAKEN");
    assert_eq!(body["error"]["message"], "Email already exists.");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _) = make_app();
    signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json(
            "/auth/login",
            None,
            json!({"email": "ann@example.com", "password": "nope"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid email or password.");
}

#[tokio::test]
async fn logout_invalidates_token() {
    let (app, _) = make_app();
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .clone()
        .oneshot(authed("POST", "/auth/logout", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(authed("GET", "/auth/me", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_bearer() {
    let (app, answers) = make_app();
    let resp = app
        .oneshot(post_json("/chat/ask", None, json!({"question": "Hi"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"]["code"], "UNAUTHORIZED");
    assert_eq!(answers.catalog_calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn ask_without_history_returns_confidence() {
    let (app, answers) = make_app();
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json(
            "/chat/ask",
            Some(&token),
            json!({"question": "Does the Smart Thermostat X1000 support WiFi?"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(
        body["data"],
        json!({
            "answer": "Catalog answer to: Does the Smart Thermostat X1000 support WiFi?",
            "confidence": 0.85
        })
    );
    assert_eq!(answers.catalog_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ask_with_history_uses_contextualizer() {
    let (app, answers) = make_app();
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json(
            "/chat/ask",
            Some(&token),
            json!({
                "question": "Is it available in black?",
                "history": [
                    {"role": "user", "content": "Tell me about the X1000"},
                    {"role": "model", "content": "It is a thermostat."}
                ]
            }),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(
        body["data"],
        json!({"answer": "Follow-up answer to: Is it available in black?"})
    );
    assert_eq!(answers.context_calls.load(Ordering::SeqCst), 1);
    assert_eq!(answers.catalog_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let (app, answers) = make_app();
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json("/chat/ask", Some(&token), json!({"question": "   "})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["code"], "EMPTY_QUESTION");
    assert_eq!(answers.catalog_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_wrapped_in_envelope() {
    let (app, _) = make_app();
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json("/chat/ask", Some(&token), json!({"prompt": "Hi"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.headers().contains_key("x-request-id"));
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    assert_eq!(body["error"]["details"][0]["path"], "question");
}

#[tokio::test]
async fn empty_catalog_is_reported_in_data() {
    let (app, _) = make_app_with(Vec::new());
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .oneshot(post_json("/chat/ask", Some(&token), json!({"question": "Hi"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["data"],
        json!({"error": CATALOG_UNAVAILABLE})
    );
}

#[tokio::test]
async fn server_side_transcript_feeds_follow_ups() {
    let (app, answers) = make_app();
    let token = signup(&app, "ann@example.com").await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/chat/messages",
            Some(&token),
            json!({"question": "Tell me about the X1000"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let first = body_json(resp).await;
    assert_eq!(first["data"]["user_message"]["sender"], "user");
    assert_eq!(first["data"]["bot_message"]["sender"], "bot");
    assert_eq!(first["data"]["bot_message"]["confidence"], 0.85);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/chat/messages",
            Some(&token),
            json!({"question": "Is it available in black?"}),
        ))
        .await
        .unwrap();
    let second = body_json(resp).await;
    assert_eq!(
        second["data"]["bot_message"]["text"],
        "Follow-up answer to: Is it available in black?"
    );
    assert!(second["data"]["bot_message"].get("confidence").is_none());
    assert_eq!(answers.catalog_calls.load(Ordering::SeqCst), 1);
    assert_eq!(answers.context_calls.load(Ordering::SeqCst), 1);

    let resp = app
        .clone()
        .oneshot(authed("GET", "/chat/messages", &token))
        .await
        .unwrap();
    let list = body_json(resp).await;
    assert_eq!(list["data"]["messages"].as_array().unwrap().len(), 4);

    let resp = app
        .clone()
        .oneshot(authed("DELETE", "/chat/messages", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(authed("GET", "/chat/messages", &token))
        .await
        .unwrap();
    assert!(body_json(resp).await["data"]["messages"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn transcripts_are_per_user() {
    let (app, _) = make_app();
    let ann = signup(&app, "ann@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    app.clone()
        .oneshot(post_json("/chat/messages", Some(&ann), json!({"question": "Hi"})))
        .await
        .unwrap();

    let resp = app
        .oneshot(authed("GET", "/chat/messages", &bob))
        .await
        .unwrap();
    assert!(body_json(resp).await["data"]["messages"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn crashed_answer_still_closes_the_turn() {
    let crashing = Arc::new(Crashing);
    let app = router_over(ResponseSelector::new(
        Arc::new(StaticCatalog::new(catalog())),
        crashing.clone(),
        crashing,
    ));
    let token = signup(&app, "ann@example.com").await;

    for question in ["Tell me about the X1000", "And the price?"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/chat/messages",
                Some(&token),
                json!({"question": question}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["bot_message"]["text"], GENERIC_FAILURE);
        assert!(body["data"]["bot_message"].get("confidence").is_none());
    }

    let resp = app
        .clone()
        .oneshot(authed("GET", "/chat/messages", &token))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"]["messages"].as_array().unwrap().len(), 4);

    let resp = app
        .oneshot(authed("DELETE", "/chat/messages", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

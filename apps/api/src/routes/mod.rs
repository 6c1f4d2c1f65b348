pub mod diagnostics;
pub mod form;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::evaluation::handlers as evaluation;
use crate::interview::handlers as interview;
use crate::state::AppState;

/// Resume uploads dominate request size.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/auth/signup", post(auth::handle_signup))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/logout", post(auth::handle_logout))
        // Interview
        .route("/interview/initialize", post(interview::handle_initialize))
        .route(
            "/interview/next_question",
            post(interview::handle_next_question),
        )
        .route(
            "/interview/improvements",
            post(interview::handle_improvements),
        )
        // Resume evaluation
        .route(
            "/resume/evaluate_resume",
            post(evaluation::handle_evaluate_resume),
        )
        // Diagnostics
        .route("/redis/flushall", post(diagnostics::handle_flush_all))
        .route("/testing/database", post(diagnostics::handle_database_probe))
        .route("/testing/redis", post(diagnostics::handle_cache_probe))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::session::memory::InMemorySessionStore;
    use crate::session::SessionStore;
    use crate::models::session::SEED_GREETING;
    use crate::test_support::{test_state, ScriptedGenerator, RESUME_PDF};

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_post(uri: &str, fields: &[(&str, &str)], file: (&str, &str, &[u8])) -> Request<Body> {
        let boundary = "prep2proBOUNDARY";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        let (name, file_name, bytes) = file;
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn setup(replies: Vec<Result<String, ()>>) -> (Router, Arc<InMemorySessionStore>, AppState) {
        let (state, store) = test_state(Arc::new(ScriptedGenerator::new(replies))).await;
        (build_router(state.clone()), store, state)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = setup(vec![]).await;
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_signup_login_logout() {
        let (app, _, _) = setup(vec![]).await;
        let creds = r#"{"username":"jane","password":"hunter22"}"#;

        let (status, body) = send(app.clone(), json_post("/auth/signup", creds)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");

        let (status, body) = send(app.clone(), json_post("/auth/signup", creds)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, body) = send(
            app.clone(),
            form_post("/auth/login", "username=jane&password=hunter22"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(token.matches('.').count(), 2);

        let logout = Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, logout).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out successfully");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let (app, _, _) = setup(vec![]).await;
        send(
            app.clone(),
            json_post("/auth/signup", r#"{"username":"jane","password":"hunter22"}"#),
        )
        .await;

        let (status, body) = send(
            app.clone(),
            json_post("/auth/login", r#"{"username":"jane","password":"wrong"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid username or password");

        let (status, _) = send(
            app.clone(),
            json_post("/auth/login", r#"{"username":"nobody","password":"x"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(app, json_post("/auth/login", r#"{"username":"jane"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_initialize_rejects_non_pdf_and_missing_fields() {
        let (app, store, _) = setup(vec![]).await;

        let req = multipart_post(
            "/interview/initialize",
            &[("domain", "DS"), ("type", "TECHNICAL")],
            ("resume", "cv.docx", b"PK"),
        );
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let req = multipart_post(
            "/interview/initialize",
            &[("domain", "DS")],
            ("resume", "cv.pdf", b"%PDF"),
        );
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_initialize_with_pdf_upload() {
        let (app, store, _) = setup(vec![]).await;

        let req = multipart_post(
            "/interview/initialize",
            &[("domain", "DS"), ("type", "TECHNICAL")],
            ("resume", "jane_doe.pdf", RESUME_PDF),
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], "DS_TECHNICAL_jane_doe");
        let turns = body["interviewer_response"].as_array().unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0]["role"], "system");
        assert_eq!(turns[0]["content"], SEED_GREETING);

        let stored = store.read("DS_TECHNICAL_jane_doe").await.unwrap();
        assert!(stored.resume_text.contains("Jane Doe"));
        assert_eq!(stored.chat_history.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_resume_with_pdf_upload() {
        let (app, _, _) = setup(vec![
            Ok("0".to_string()),
            Ok("Add metrics. List your Rust projects.".to_string()),
        ])
        .await;

        let req = multipart_post(
            "/resume/evaluate_resume",
            &[("job_description", "Backend engineer building Rust services")],
            ("resume", "jane_doe.pdf", RESUME_PDF),
        );
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);

        let ats: f64 = body["ats_score"].as_str().unwrap().parse().unwrap();
        assert!((0.0..=100.0).contains(&ats), "ats {ats}");
        assert_eq!(body["ats_score_breakdown"]["grammar_score"], 30.0);
        assert_eq!(
            body["suggestions"],
            serde_json::json!(["Add metrics.", "List your Rust projects."])
        );
    }

    #[tokio::test]
    async fn test_interview_turns_over_http() {
        let (app, store, state) = setup(vec![
            Ok("How did you choose the TTL?".to_string()),
            Ok("- Lead with outcomes".to_string()),
        ])
        .await;
        let started = state
            .interview
            .initialize("DS", "TECHNICAL", "cv.pdf", "resume text".to_string())
            .await
            .unwrap();
        assert_eq!(started.session_id, "DS_TECHNICAL_cv");

        let (status, body) = send(
            app.clone(),
            form_post(
                "/interview/next_question",
                "session_id=DS_TECHNICAL_cv&user_answer=I+cached+hot+keys+in+Redis",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["question"], "How did you choose the TTL?");
        assert_eq!(store.read("DS_TECHNICAL_cv").await.unwrap().chat_history.len(), 3);

        let (status, body) = send(
            app,
            form_post("/interview/improvements", "session_id=DS_TECHNICAL_cv"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["improvements"], "- Lead with outcomes");
        assert!(!store.contains("DS_TECHNICAL_cv").await);
    }

    #[tokio::test]
    async fn test_concluded_turn_over_http() {
        let (app, _, state) = setup(vec![Ok("Conclude".to_string())]).await;
        state
            .interview
            .initialize("SDE", "TECHNICAL_1", "cv.pdf", "resume".to_string())
            .await
            .unwrap();

        let (status, body) = send(
            app.clone(),
            form_post(
                "/interview/next_question",
                "session_id=SDE_TECHNICAL_1_cv&user_answer=done",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "concluded");
        assert_eq!(body["session_id"], "SDE_TECHNICAL_1_cv");

        let (status, _) = send(
            app,
            form_post(
                "/interview/next_question",
                "session_id=SDE_TECHNICAL_1_cv&user_answer=again",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_next_question_errors() {
        let (app, store, _) = setup(vec![]).await;

        let (status, _) = send(
            app.clone(),
            form_post("/interview/next_question", "session_id=DS_TECHNICAL_cv"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app.clone(),
            form_post(
                "/interview/next_question",
                "session_id=DS_TECHNICAL_ghost&user_answer=hi",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        store.insert_raw("DS_TECHNICAL_bad", "{{{").await;
        let (status, body) = send(
            app,
            form_post(
                "/interview/next_question",
                "session_id=DS_TECHNICAL_bad&user_answer=hi",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DECODE_ERROR");
    }

    #[tokio::test]
    async fn test_evaluate_resume_requires_both_inputs() {
        let (app, _, _) = setup(vec![]).await;
        let req = multipart_post("/resume/evaluate_resume", &[], ("resume", "cv.pdf", b"%PDF"));
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Both resume and job description are required"
        );

        let req = multipart_post(
            "/resume/evaluate_resume",
            &[("job_description", "Rust engineer")],
            ("resume", "cv.txt", b"plain"),
        );
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let (app, store, _) = setup(vec![]).await;
        store.insert_raw("anything", "{}").await;

        let (status, body) = send(app.clone(), empty_post("/testing/redis")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["set_key"], "test_key");
        assert_eq!(body["retrieved_value"], "Hello, Redis!");

        let (status, body) = send(app.clone(), empty_post("/testing/database")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "DS");

        let (status, body) = send(app, empty_post("/redis/flushall")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(store.len().await, 0);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP front end
//!
//! `POST /analyze` runs the pipeline on `{"code": "..."}`, `GET /` serves the
//! bundled page and `GET /health` reports catalog status. The catalog is
//! loaded once at startup and shared read-only between requests unless
//! `reload_catalog` is set.

use crate::analysis;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    catalog: Option<Arc<Catalog>>,
    catalog_path: PathBuf,
    reload_catalog: bool,
}

impl AppState {
    pub fn new(catalog: Option<Catalog>, catalog_path: PathBuf, reload_catalog: bool) -> Self {
        Self {
            catalog: catalog.map(Arc::new),
            catalog_path,
            reload_catalog,
        }
    }

    /// Build state from configuration, loading the catalog up front.
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = if config.reload_catalog {
            None
        } else {
            match Catalog::load(&config.catalog_path) {
                Ok(catalog) => {
                    info!(
                        "Loaded {} vulnerability patterns from {}",
                        catalog.len(),
                        config.catalog_path.display()
                    );
                    Some(catalog)
                }
                Err(e) => {
                    warn!("{}; /analyze will report the dataset as not loaded", e);
                    None
                }
            }
        };
        Self::new(catalog, config.catalog_path.clone(), config.reload_catalog)
    }

    fn catalog_for_request(&self) -> Option<Arc<Catalog>> {
        if !self.reload_catalog {
            return self.catalog.clone();
        }
        match Catalog::load(&self.catalog_path) {
            Ok(catalog) => Some(Arc::new(catalog)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_endpoint))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: AppConfig) -> Result<()> {
    let state = AppState::from_config(&config);
    let app = router(state);

    let addr = config.bind_address();
    info!("HTTP server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = match tokio::task::spawn_blocking(move || state.catalog_for_request()).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("catalog lookup failed: {}", e);
            None
        }
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "catalog_loaded": catalog.is_some(),
        "rules": catalog.map_or(0, |c| c.len()),
    }))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}

/// Pull a non-empty `code` string out of the request body.
fn extract_code(body: Value) -> Result<String, Response> {
    let Value::Object(mut fields) = body else {
        return Err(bad_request("Invalid JSON format."));
    };
    match fields.remove("code") {
        None | Some(Value::Null) => Err(bad_request("No code provided.")),
        Some(Value::String(code)) if code.is_empty() => Err(bad_request("No code provided.")),
        Some(Value::String(code)) => Ok(code),
        Some(_) => Err(bad_request("Invalid JSON format.")),
    }
}

async fn analyze_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("rejected /analyze body: {}", rejection);
            return bad_request("Invalid JSON format.");
        }
    };

    let code = match extract_code(body) {
        Ok(code) => code,
        Err(response) => return response,
    };

    let task = tokio::task::spawn_blocking(move || {
        let catalog = state.catalog_for_request();
        analysis::analyze_with(&code, catalog.as_deref())
    });

    match task.await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!("analysis task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "Analysis failed." })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternRule;
    use axum::body::Body;
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const HEADER: &str = "pattern,issue,description,severity,example_fix\n";

    fn test_state(catalog: Option<Catalog>) -> AppState {
        AppState::new(catalog, PathBuf::from("unused.csv"), false)
    }

    fn eval_catalog() -> Catalog {
        Catalog::new(vec![PatternRule {
            pattern: "eval(".to_string(),
            issue: "Use of eval".to_string(),
            description: "Evaluating strings runs arbitrary code".to_string(),
            severity: "high".to_string(),
            example_fix: "ast.literal_eval".to_string(),
        }])
    }

    async fn post_analyze(state: AppState, body: &str, json_type: bool) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri("/analyze");
        if json_type {
            request = request.header("content-type", "application/json");
        }
        let response = router(state)
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_index_page() {
        let response = router(test_state(None))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Code Analyzer"));
    }

    #[tokio::test]
    async fn test_no_code_provided() {
        let (status, body) = post_analyze(test_state(Some(eval_catalog())), "{}", true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "No code provided.");
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let (status, body) =
            post_analyze(test_state(Some(eval_catalog())), r#"{"code": ""}"#, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No code provided.");
    }

    #[tokio::test]
    async fn test_non_json_rejected() {
        let (status, body) = post_analyze(test_state(None), "code=print(1)", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid JSON format.");
    }

    #[tokio::test]
    async fn test_non_string_code_rejected() {
        let (status, body) = post_analyze(test_state(None), r#"{"code": 42}"#, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid JSON format.");
    }

    #[tokio::test]
    async fn test_valid_code() {
        let body = json!({ "code": "print('Hello, world!')" }).to_string();
        let (status, report) = post_analyze(test_state(Some(eval_catalog())), &body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["syntax"]["status"], "success");
        assert_eq!(report["syntax"]["message"], "No syntax errors detected.");
        assert_eq!(report["vulnerabilities"], json!([]));
        assert_eq!(
            report["improvements"],
            json!(["Consider using a proper logging system instead of print statements"])
        );
    }

    #[tokio::test]
    async fn test_invalid_code_still_200() {
        let body = json!({ "code": "print('Hello, world!" }).to_string();
        let (status, report) = post_analyze(test_state(Some(eval_catalog())), &body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["syntax"]["status"], "error");
    }

    #[tokio::test]
    async fn test_eval_match() {
        let body = json!({ "code": "x = eval('2 + 2')" }).to_string();
        let (_, report) = post_analyze(test_state(Some(eval_catalog())), &body, true).await;
        let vulns = report["vulnerabilities"].as_array().unwrap();
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0]["severity"], "high");
        assert_eq!(vulns[0]["issue"], "Use of eval");
    }

    #[tokio::test]
    async fn test_missing_catalog_error_shape() {
        let body = json!({ "code": "print(1)" }).to_string();
        let (status, report) = post_analyze(test_state(None), &body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            report,
            json!({ "error": "Dataset not loaded. Cannot perform vulnerability analysis." })
        );
    }

    #[tokio::test]
    async fn test_health_reports_catalog() {
        let body = get_health(test_state(Some(eval_catalog()))).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["catalog_loaded"], true);
        assert_eq!(body["rules"], 1);
    }

    async fn get_health(state: AppState) -> Value {
        let response = router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_reload_picks_up_catalog_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vulnerabilities.csv");
        fs::write(&path, format!("{HEADER}eval(,Use of eval,Runs code,high,Avoid\n")).unwrap();
        let state = AppState::new(None, path.clone(), true);
        let body = json!({ "code": "eval(x); exec(y)" }).to_string();

        let (status, report) = post_analyze(state.clone(), &body, true).await;
        assert_eq!(status, StatusCode::OK);
        let issues: Vec<&str> = report["vulnerabilities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["issue"].as_str().unwrap())
            .collect();
        assert_eq!(issues, vec!["Use of eval"]);

        fs::write(&path, format!("{HEADER}exec(,Use of exec,Runs code,critical,Avoid\n")).unwrap();
        let (_, report) = post_analyze(state.clone(), &body, true).await;
        let vulns = report["vulnerabilities"].as_array().unwrap();
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0]["issue"], "Use of exec");
        assert_eq!(vulns[0]["severity"], "critical");

        assert_eq!(get_health(state).await["rules"], 1);
    }

    #[tokio::test]
    async fn test_reload_from_missing_path() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(None, dir.path().join("gone.csv"), true);
        let body = json!({ "code": "eval(x)" }).to_string();

        let (status, report) = post_analyze(state.clone(), &body, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            report,
            json!({ "error": "Dataset not loaded. Cannot perform vulnerability analysis." })
        );

        let health = get_health(state).await;
        assert_eq!(health["catalog_loaded"], false);
        assert_eq!(health["rules"], 0);
    }

    #[tokio::test]
    async fn test_reload_ignores_startup_catalog() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(Some(eval_catalog()), dir.path().join("gone.csv"), true);
        let body = json!({ "code": "eval(x)" }).to_string();
        let (_, report) = post_analyze(state, &body, true).await;
        assert!(report.get("error").is_some());
    }
}

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vietphrase::{Config, Error, InputOutcome, Language, LoadReport, Session};

#[derive(Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated: String,
    pub language: Language,
}

#[derive(Serialize, Deserialize)]
pub struct InputResponse {
    /// `None` when a newer input replaced this one during the debounce
    pub translated: Option<String>,
    pub superseded: bool,
}

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub language: Option<Language>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/language", post(load_language))
        .route("/api/translate", post(translate_text))
        .route("/api/input", post(submit_input))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let session = Arc::new(Session::from_config(&config));
    session.load_language(config.language).await?;

    let addr = std::env::var("VIETPHRASE_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let app = router(AppState { session });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Serving translations at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ready: state.session.is_ready(),
        language: state.session.active_language(),
    })
}

async fn load_language(
    State(state): State<AppState>,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<LoadReport>, ApiError> {
    let language: Language = request
        .language
        .parse()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    match state.session.load_language(language).await {
        Ok(report) => Ok(Json(report)),
        Err(e @ Error::Superseded(_)) => Err(api_error(StatusCode::CONFLICT, e)),
        Err(e) => {
            warn!("Loading '{}' failed: {}", language, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let translator = state.session.translator().ok_or_else(|| {
        api_error(StatusCode::SERVICE_UNAVAILABLE, "Dictionaries are still loading")
    })?;
    Ok(Json(TranslateResponse {
        translated: translator.translate(&request.text),
        language: translator.lexicon().language(),
    }))
}

async fn submit_input(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<InputResponse>, ApiError> {
    match state.session.submit_input(&request.text).await {
        InputOutcome::Translated(translated) => Ok(Json(InputResponse {
            translated: Some(translated),
            superseded: false,
        })),
        InputOutcome::Superseded => Ok(Json(InputResponse {
            translated: None,
            superseded: true,
        })),
        InputOutcome::NotReady => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Dictionaries are still loading",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use vietphrase::MemorySource;

    async fn app() -> Router {
        let source = MemorySource::new()
            .with_file("en/VietPhrase.txt", "hello=xin chào\n")
            .with_file("zh/VietPhrase.txt", "你好=xin chào\n");
        let session = Arc::new(Session::new(Arc::new(source)));
        session.load_language(Language::English).await.unwrap();
        router(AppState { session })
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_translate() {
        let response = app()
            .await
            .oneshot(post_json("/api/translate", r#"{"text":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["translated"], "Xin chào");
        assert_eq!(body["language"], "en");
    }

    #[tokio::test]
    async fn test_switch_language_returns_report() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(post_json("/api/language", r#"{"language":"zh-Hans"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = json(response).await;
        assert_eq!(report["language"], "zh");

        let response = app
            .oneshot(post_json("/api/translate", r#"{"text":"你好"}"#))
            .await
            .unwrap();
        assert_eq!(json(response).await["translated"], "Xin chào");
    }

    #[tokio::test]
    async fn test_unknown_language_is_bad_request() {
        let response = app()
            .await
            .oneshot(post_json("/api/language", r#"{"language":"fr"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_translate_unavailable_before_first_load() {
        let session = Arc::new(Session::new(Arc::new(MemorySource::new())));
        let response = router(AppState { session })
            .oneshot(post_json("/api/translate", r#"{"text":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_input_unavailable_before_first_load() {
        let session = Arc::new(Session::new(Arc::new(MemorySource::new())));
        let response = router(AppState { session })
            .oneshot(post_json("/api/input", r#"{"text":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_status_and_input() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(post_json("/api/input", r#"{"text":"hello"}"#))
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["translated"], "Xin chào");
        assert_eq!(body["superseded"], false);

        let response = app
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["ready"], true);
        assert_eq!(body["language"], "en");
    }
}

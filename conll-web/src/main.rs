//! Servidor web Axum que expõe o leitor CoNLL via HTTP
//!
//! Rotas:
//! - `POST /parse`  → corpo `{text, links?, config?}`, responde com os documentos
//! - `GET  /config` → configuração padrão do servidor
//! - `GET  /health` → `"ok"`
//!
//! Variáveis de ambiente:
//! - `CONLL_CONFIG`   → caminho de um `ReaderConfig` em JSON (senão usa a variante CoNLL-2003)
//! - `CONLL_WEB_ADDR` → endereço de escuta (padrão `0.0.0.0:3000`)
//! - `RUST_LOG`       → filtro do tracing (padrão `info`)

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use conll_core::{ConllReader, DocumentPack, ReaderConfig};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    config: ReaderConfig,
}

#[derive(Deserialize)]
struct ParseRequest {
    text: String,
    /// Conteúdo do arquivo de linking, quando a variante usa um.
    #[serde(default)]
    links: Option<String>,
    /// Sobrescreve a configuração do servidor só para esta requisição.
    #[serde(default)]
    config: Option<ReaderConfig>,
}

#[derive(Serialize)]
struct ParseResponse {
    documents: Vec<DocumentPack>,
    total_documents: usize,
    processing_ms: u64,
}

/// Erro de requisição: sempre 400 com `{"error": ...}`.
struct ApiError(String);

impl From<conll_core::Error> for ApiError {
    fn from(e: conll_core::Error) -> Self {
        ApiError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.0 })),
        )
            .into_response()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("CONLL_CONFIG") {
        Ok(path) => {
            info!("Carregando configuração de {path}");
            ReaderConfig::from_json_file(&path)
                .with_context(|| format!("configuração inválida em {path}"))?
        }
        Err(_) => ReaderConfig::conll03(),
    };
    // Falha cedo se a configuração padrão não for utilizável.
    ConllReader::new(config.clone()).context("configuração do leitor rejeitada")?;

    let state = Arc::new(AppState { config });
    let app = router(state);

    let addr = std::env::var("CONLL_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("não foi possível escutar em {addr}"))?;
    info!("Servidor CoNLL iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/parse", post(parse_handler))
        .route("/config", get(config_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Lê o texto enviado e devolve todos os documentos de uma vez
async fn parse_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, ApiError> {
    let config = req.config.unwrap_or_else(|| state.config.clone());
    let start = Instant::now();

    // O leitor é síncrono: roda fora do runtime
    let documents = tokio::task::spawn_blocking(move || parse_text(config, &req.text, req.links.as_deref()))
        .await
        .map_err(|e| ApiError(format!("falha interna: {e}")))??;

    let processing_ms = start.elapsed().as_millis() as u64;
    info!(documents = documents.len(), processing_ms, "texto processado");

    Ok(Json(ParseResponse {
        total_documents: documents.len(),
        documents,
        processing_ms,
    }))
}

/// Configuração padrão do servidor
async fn config_handler(State(state): State<Arc<AppState>>) -> Json<ReaderConfig> {
    Json(state.config.clone())
}

fn parse_text(
    config: ReaderConfig,
    text: &str,
    links: Option<&str>,
) -> conll_core::Result<Vec<DocumentPack>> {
    let linking = config.entity_linking;
    let reader = ConllReader::new(config)?;
    match links {
        Some(links) if linking => reader.parse_linked(text.as_bytes(), links.as_bytes())?.collect(),
        Some(_) => {
            warn!("links enviados com entity_linking desligado; ignorando");
            reader.parse(text.as_bytes()).collect()
        }
        None => reader.parse(text.as_bytes()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState {
            config: ReaderConfig::conll03(),
        }))
    }

    async fn post_json(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::post("/parse")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_returns_documents() {
        let text = "-DOCSTART- -X- -X- O\n\nEU NNP B-NP B-ORG\nrejects VBZ B-VP O\n";
        let (status, body) = post_json(serde_json::json!({ "text": text })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_documents"], 1);
        assert_eq!(body["documents"][0]["text"], "EU rejects");
        assert_eq!(body["documents"][0]["entity_mentions"][0]["ner_type"], "ORG");
    }

    #[tokio::test]
    async fn test_parse_with_linking_config() {
        let text = "-DOCSTART- -X- -X- O\n\nGermany NNP B-NP B-LOC\n";
        let links = "-DOCSTART- (7 Germany)\n0\tGermany\thttp://en.wikipedia.org/wiki/Germany\t11867\n";
        let (status, body) = post_json(serde_json::json!({
            "text": text,
            "links": links,
            "config": ReaderConfig::conll03_aida(),
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        let doc = &body["documents"][0];
        assert_eq!(doc["name"], "7 Germany");
        assert_eq!(doc["entity_mentions"][0]["link"]["numeric_id"], 11867);
    }

    #[tokio::test]
    async fn test_parse_error_is_bad_request() {
        let (status, body) = post_json(serde_json::json!({ "text": "EU NNP B-NP X-ORG\n" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("X-ORG"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

//! Delivery of the original product information sheets.
//!
//! The recommendation names a product; this route hands out the matching
//! sheet from the configured documents directory. A missing or unreadable
//! sheet is reported as unavailable, never as an internal error, because the
//! recommendation itself already stands.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;
use uuid::Uuid;

use advisor_core::domain::product::ProductId;
use advisor_core::errors::{ApplicationError, InterfaceError};

use advisor_index::repositories::DocumentIndex;

use crate::api::error_response;

#[derive(Clone)]
pub struct DocumentState {
    index: Arc<dyn DocumentIndex>,
    documents_dir: PathBuf,
}

impl DocumentState {
    pub fn new(index: Arc<dyn DocumentIndex>, documents_dir: PathBuf) -> Self {
        Self { index, documents_dir }
    }
}

pub fn router(state: DocumentState) -> Router {
    Router::new().route("/products/{id}/document", get(download_document)).with_state(state)
}

pub async fn download_document(
    State(state): State<DocumentState>,
    Path(id): Path<i64>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    let product = match state.index.find_by_id(ProductId(id)).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return error_response(InterfaceError::NotFound {
                message: format!("product {id} does not exist"),
                correlation_id,
            })
            .into_response();
        }
        Err(error) => {
            warn!(product_id = id, correlation_id = %correlation_id, error = %error,
                "document lookup failed");
            return error_response(
                ApplicationError::Index(error.to_string()).into_interface(correlation_id),
            )
            .into_response();
        }
    };

    // Source references are produced by ingestion and must stay inside the
    // documents directory.
    if product.source_file.contains("..") || product.source_file.starts_with('/') {
        warn!(product_id = id, correlation_id = %correlation_id,
            source_file = %product.source_file, "rejected source reference");
        return unavailable(&product.source_file, correlation_id);
    }

    let path = state.documents_dir.join(&product.source_file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let disposition =
                format!("attachment; filename=\"{}\"", product.source_file);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(error) => {
            warn!(product_id = id, correlation_id = %correlation_id, path = %path.display(),
                error = %error, "product sheet unreadable");
            unavailable(&product.source_file, correlation_id)
        }
    }
}

fn unavailable(source_file: &str, correlation_id: String) -> Response {
    let (status, Json(mut body)) = error_response(
        ApplicationError::MissingSourceDocument(source_file.to_string())
            .into_interface(correlation_id),
    );
    body.error = advisor_core::messages::DOWNLOAD_UNAVAILABLE.to_string();
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::{header, StatusCode};

    use advisor_core::domain::product::{ProductId, ProductRecord};
    use advisor_core::domain::profile::{Horizon, Preference, RiskTolerance};
    use advisor_index::repositories::{DocumentIndex, InMemoryDocumentIndex};
    use tempfile::TempDir;

    use super::{download_document, DocumentState};

    async fn seeded_state(dir: &TempDir, source_file: &str) -> DocumentState {
        let index = Arc::new(InMemoryDocumentIndex::new());
        index
            .upsert_product(
                &ProductRecord {
                    id: ProductId(10400552),
                    name: "Daily Deposit Account".to_string(),
                    min_amount: 0,
                    horizon: Horizon::ShortTerm,
                    risk: RiskTolerance::NoRisk,
                    cost: Some(Preference::No),
                    sustainable: false,
                    source_file: source_file.to_string(),
                },
                &[],
            )
            .await
            .expect("seed product");
        DocumentState::new(index, dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn existing_sheet_is_served_as_attachment() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("sheet.pdf"), b"%PDF-1.4 demo").expect("write sheet");
        let state = seeded_state(&dir, "sheet.pdf").await;

        let response = download_document(State(state), Path(10400552)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("sheet.pdf"));
    }

    #[tokio::test]
    async fn missing_sheet_reports_download_unavailable() {
        let dir = TempDir::new().expect("tempdir");
        let state = seeded_state(&dir, "not_there.pdf").await;

        let response = download_document(State(state), Path(10400552)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let state = seeded_state(&dir, "sheet.pdf").await;

        let response = download_document(State(state), Path(999)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn traversing_source_references_are_refused() {
        let dir = TempDir::new().expect("tempdir");
        let state = seeded_state(&dir, "../secrets.pdf").await;

        let response = download_document(State(state), Path(10400552)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

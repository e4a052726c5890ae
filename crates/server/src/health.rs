//! Readiness probe. The server is only useful when the product index can
//! answer, so the probe queries the index itself rather than pinging the
//! database.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use advisor_index::DbPool;

const READY: &str = "ready";
const DEGRADED: &str = "degraded";

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub product_index: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

/// A reachable database without the product schema still reports degraded:
/// no advisory session can be served from it.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let product_index = index_check(&state.db_pool).await;
    let ready = product_index.status == READY;

    let payload = HealthResponse {
        status: if ready { READY } else { DEGRADED },
        service: HealthCheck {
            status: READY,
            detail: "advisor-server runtime initialized".to_string(),
        },
        product_index,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn index_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product").fetch_one(pool).await {
        Ok(count) => HealthCheck {
            status: READY,
            detail: format!("product index answering ({count} products)"),
        },
        Err(error) => HealthCheck {
            status: DEGRADED,
            detail: format!("product index unavailable: {error}"),
        },
    }
}

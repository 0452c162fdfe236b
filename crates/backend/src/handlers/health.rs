use axum::{extract::State, http::StatusCode};

use crate::db::{self, DbPool};

/// 200 when the database answers, 503 otherwise.
pub async fn health_check(State(pool): State<DbPool>) -> StatusCode {
    let mut conn = match pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!("Health check could not get a connection: {}", e);
            return StatusCode::SERVICE_UNAVAILABLE;
        }
    };

    match db::ping(&mut conn).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Health check query failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

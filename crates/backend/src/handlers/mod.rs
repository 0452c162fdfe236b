//! HTTP handlers, one module per resource.
//!
//! Every `/api` handler receives the caller as `Extension<AuthUser>` from the
//! auth middleware and scopes all reads and writes to that user.

pub mod categories;
pub mod health;
pub mod ideas;
pub mod notes;
pub mod reminders;
pub mod repeated_todos;
pub mod todos;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

//! HTTP transport adapter.
//!
//! Three device endpoints plus a status probe:
//!
//! - `GET /`           embedded control page
//! - `GET /challenge`  issue a challenge (plain text)
//! - `POST /response`  submit `challenge ++ secret`
//! - `GET /status`     lock snapshot (JSON)

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use smartlock_core::{Environment, Indicator, LockError, MAX_RESPONSE_LEN, VerifyOutcome};

use crate::driver::LockDriver;

/// Control page served at `/`.
pub const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Bodies above this size are not buffered at all.
///
/// Anything between the protocol maximum and this cap is read and refused by
/// the lock machine; anything larger is refused by the extractor. Both map to
/// the same 400 response.
pub const BODY_READ_LIMIT: usize = 1024;

/// Create the router for the lock endpoints.
pub fn create_router<E, I>(driver: LockDriver<E, I>) -> Router
where
    E: Environment,
    I: Indicator,
{
    Router::new()
        .route("/", get(index_handler))
        .route("/challenge", get(challenge_handler::<E, I>))
        .route("/response", post(response_handler::<E, I>))
        .route("/status", get(status_handler::<E, I>))
        .layer(DefaultBodyLimit::max(BODY_READ_LIMIT))
        .with_state(driver)
}

/// Handler for `GET /`.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler for `GET /challenge`.
async fn challenge_handler<E, I>(State(driver): State<LockDriver<E, I>>) -> Response
where
    E: Environment,
    I: Indicator,
{
    match driver.issue_challenge().await {
        Ok(challenge) => (StatusCode::OK, String::from(challenge)).into_response(),
        Err(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Entropy source unavailable").into_response()
        },
    }
}

/// Handler for `POST /response`.
async fn response_handler<E, I>(
    State(driver): State<LockDriver<E, I>>,
    body: Result<Bytes, BytesRejection>,
) -> Response
where
    E: Environment,
    I: Indicator,
{
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return lock_error_response(&LockError::ResponseTooLong {
                len: BODY_READ_LIMIT,
                max: MAX_RESPONSE_LEN,
            });
        },
        Err(rejection) => {
            tracing::debug!(%rejection, "failed to read response body");
            return lock_error_response(&LockError::NoData);
        },
    };

    match driver.verify(&body).await {
        Ok(VerifyOutcome::Unlocked) => (StatusCode::OK, "Unlocked").into_response(),
        Ok(VerifyOutcome::Rejected) => (StatusCode::UNAUTHORIZED, "Invalid token").into_response(),
        Err(e) => lock_error_response(&e),
    }
}

/// Handler for `GET /status`.
async fn status_handler<E, I>(State(driver): State<LockDriver<E, I>>) -> impl IntoResponse
where
    E: Environment,
    I: Indicator,
{
    Json(driver.status().await)
}

fn lock_error_response(err: &LockError) -> Response {
    match err {
        LockError::ResponseTooLong { .. } => {
            (StatusCode::BAD_REQUEST, "Response too long").into_response()
        },
        LockError::NoData => (StatusCode::BAD_REQUEST, "No response data received").into_response(),
        LockError::Entropy(_) | LockError::InvalidSecret { .. } => {
            tracing::error!(error = %err, "internal lock error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        },
    }
}

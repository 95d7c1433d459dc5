use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{self, Response};
use warp::Reply;

use crate::errors::{HandError, IntoErrorResponse};
use crate::service::HandService;

fn default_player_count() -> i64 {
    2
}

#[derive(Debug, Deserialize)]
pub struct CreateHandRequest {
    pub stack_size: i64,
    #[serde(default = "default_player_count")]
    pub player_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub hand_id: String,
    pub player_id: String,
    pub action_type: String,
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListHandsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Deals a new hand.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/hands/create`
///
/// # Request Format
/// ```json
/// { "stack_size": 1000, "player_count": 2 }
/// ```
/// `player_count` defaults to 2 and must lie in 2..=6.
///
/// # Response Format
/// - **200 OK**: the opening `GameState`, blinds posted and hole cards dealt
/// - **400 Bad Request**: `validation_error` for a malformed body or out-of-range values
pub async fn create_hand(service: Arc<HandService>, body: Bytes) -> Response {
    let request: CreateHandRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(err) => return err.into_http_response(),
    };
    respond(
        blocking(service, move |service| {
            service.create_hand(request.stack_size, request.player_count)
        })
        .await,
    )
}

/// Applies one player action.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/hands/action`
///
/// # Request Format
/// ```json
/// { "hand_id": "…", "player_id": "player_1", "action_type": "raise", "amount": 120 }
/// ```
/// `amount` is required for `bet` and `raise` and is the raise-to total for a raise.
///
/// # Response Format
/// - **200 OK**: the updated `GameState`
/// - **400 Bad Request**: `validation_error` or `guard_violation`; the hand is unchanged
/// - **404 Not Found**: `hand_not_found`
pub async fn perform_action(service: Arc<HandService>, body: Bytes) -> Response {
    let request: ActionRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(err) => return err.into_http_response(),
    };
    respond(
        blocking(service, move |service| {
            service.perform_action(
                &request.hand_id,
                &request.player_id,
                &request.action_type,
                request.amount,
            )
        })
        .await,
    )
}

/// `GET /api/hands?limit=N`: archived hands, most recent first.
pub async fn list_hands(service: Arc<HandService>, query: ListHandsQuery) -> Response {
    respond(blocking(service, move |service| service.archived_hands(query.limit)).await)
}

/// `GET /api/hands/{id}`: one archived hand. Hands still being played are
/// not archived and answer 404.
pub async fn get_hand(service: Arc<HandService>, hand_id: String) -> Response {
    respond(blocking(service, move |service| service.archived_hand(&hand_id)).await)
}

/// `GET /api/hands/{id}/state`: latest snapshot of a hand held in memory.
pub async fn get_hand_state(service: Arc<HandService>, hand_id: String) -> Response {
    respond(service.live_snapshot(&hand_id))
}

pub fn welcome() -> Response {
    reply::json(&serde_json::json!({ "message": "Welcome to the Poker Backend API" }))
        .into_response()
}

/// Runs a service call on the blocking pool, where archive I/O happens.
async fn blocking<T, F>(service: Arc<HandService>, call: F) -> Result<T, HandError>
where
    T: Send + 'static,
    F: FnOnce(&HandService) -> Result<T, HandError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .unwrap_or_else(|err| Err(HandError::Storage(format!("service task failed: {err}"))))
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, HandError> {
    serde_json::from_slice(body)
        .map_err(|err| HandError::validation(format!("Invalid request body: {err}")))
}

fn respond<T: serde::Serialize>(result: Result<T, HandError>) -> Response {
    match result {
        Ok(value) => reply::with_status(reply::json(&value), StatusCode::OK).into_response(),
        Err(err) => err.into_http_response(),
    }
}

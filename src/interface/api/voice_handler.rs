//! Voice webhook handler
//!
//! The telephony platform posts every caller turn to
//! `POST /voice/:flow`. Session continuity works the way the platform
//! expects from a webhook host: the first request of a call mints a
//! session id, runs the named flow's opening turn, and hands the id
//! back in a `uuid` cookie; follow-up requests carry the cookie and
//! resume the suspended flow with the caller's digits.

use super::metrics_handler::{
    record_call_completed, record_call_started, record_silent_completion, record_turn_failed,
};
use crate::domain::flow::{CallRequest, FlowRegistry};
use crate::domain::shared::FlowError;
use crate::domain::twiml::TwimlResponse;
use crate::infrastructure::session::SessionManager;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

const SESSION_COOKIE: &str = "uuid";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FlowRegistry>,
    pub sessions: Arc<SessionManager>,
}

/// Run one turn of a call flow
pub async fn handle_voice(
    State(state): State<AppState>,
    Path(flow_name): Path<String>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let request = CallRequest::from_params(params);

    // The cookie id is kept even when its session has expired, so the
    // caller restarts the flow under the same id.
    let session_id = session_id_from_headers(&headers)
        .unwrap_or_else(SessionManager::new_session_id);

    let entry = match state.sessions.get(&session_id).await {
        Some(entry) => entry,
        None => {
            let flow = match state.registry.create(&flow_name) {
                Ok(flow) => flow,
                Err(e) => {
                    error!("Voice request for unknown flow {}: {}", flow_name, e);
                    return StatusCode::NOT_FOUND.into_response();
                }
            };
            info!(
                "New call on flow {} (session {}, from {:?})",
                flow_name, session_id, request.from
            );
            record_call_started(&flow_name);
            state.sessions.start(&session_id, &flow_name, flow).await
        }
    };

    let result = {
        let mut session = entry.lock().await;
        session.advance(&request)
    };

    match result {
        Ok(turn) => {
            if turn.is_final() {
                state.sessions.remove(&session_id).await;
                record_call_completed();
                if turn.response.is_empty() {
                    record_silent_completion();
                }
            }
            twiml_reply(&session_id, &turn.response)
        }
        Err(e) => {
            error!("Turn failed for session {}: {}", session_id, e);
            state.sessions.remove(&session_id).await;
            record_turn_failed(failure_reason(&e));
            failure_status(&e).into_response()
        }
    }
}

fn failure_status(error: &FlowError) -> StatusCode {
    match error {
        FlowError::InvalidDigits(_) => StatusCode::BAD_REQUEST,
        FlowError::UnknownFlow(_) => StatusCode::NOT_FOUND,
        FlowError::Completed | FlowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_reason(error: &FlowError) -> &'static str {
    match error {
        FlowError::InvalidDigits(_) => "invalid_digits",
        FlowError::UnknownFlow(_) => "unknown_flow",
        FlowError::Completed => "completed",
        FlowError::Internal(_) => "internal",
    }
}

/// Build the `text/xml` TwiML reply carrying the session cookie
fn twiml_reply(session_id: &str, response: &TwimlResponse) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "text/xml; charset=utf-8".to_string(),
            ),
            (
                header::SET_COOKIE,
                format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, session_id),
            ),
        ],
        response.to_xml(),
    )
        .into_response()
}

/// Extract the session id from the request's cookies
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_session_id_from_single_cookie() {
        let headers = headers_with_cookie("uuid=abc-123");
        assert_eq!(session_id_from_headers(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_session_id_among_multiple_cookies() {
        let headers = headers_with_cookie("theme=dark; uuid=abc-123; lang=en");
        assert_eq!(session_id_from_headers(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_missing_session_cookie() {
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_empty_session_cookie_ignored() {
        let headers = headers_with_cookie("uuid=");
        assert_eq!(session_id_from_headers(&headers), None);
    }
}

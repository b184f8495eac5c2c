//! Login, liveness and request-tracking handlers.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;

use super::SharedState;
use crate::SESSION_COOKIE;

/// Form body of a login request.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "_username")]
    pub username: String,
    #[serde(rename = "_password")]
    pub password: String,
}

/// Session id carried by the request's `Cookie` header.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Records every request and rejects data requests without a live session
/// when the state requires login.
pub async fn track_requests(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let line = match request.uri().query() {
        Some(query) => format!("{} {}?{}", request.method(), path, query),
        None => format!("{} {}", request.method(), path),
    };

    let allowed = {
        let mut state = state.write().await;
        state.record(line);
        let public = matches!(
            path.as_str(),
            "/direct/session" | "/direct/session.json" | "/direct/health"
        );
        public
            || !state.require_login
            || session_cookie(request.headers())
                .is_some_and(|id| state.session_user(&id).is_some())
    };

    if !allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "login required" })),
        )
            .into_response();
    }
    next.run(request).await
}

/// POST /session
pub async fn login(State(state): State<SharedState>, Form(form): Form<LoginForm>) -> Response {
    let mut state = state.write().await;

    match state.login(&form.username, &form.password) {
        Some(session_id) => (
            StatusCode::CREATED,
            [(
                header::SET_COOKIE,
                format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly"),
            )],
            session_id,
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid login" })),
        )
            .into_response(),
    }
}

/// GET /session.json
pub async fn current_session(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.read().await;

    let user = session_cookie(&headers)
        .and_then(|id| state.session_user(&id).map(|user| (id, user.to_string())));

    let sessions = match user {
        Some((id, user)) => vec![json!({
            "id": id,
            "active": true,
            "userId": user,
            "userEid": user,
        })],
        None => vec![json!({ "active": false, "userId": null })],
    };

    Json(json!({ "session_collection": sessions })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; JSESSIONID=abc123; more=2"),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));

        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}

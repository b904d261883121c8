//! HTML pages and bundled static assets.

use axum::{
    extract::Path,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const LOGIN_HTML: &str = include_str!("../../assets/login.html");
const APP_JS: &str = include_str!("../../assets/app.js");
const LOGIN_JS: &str = include_str!("../../assets/login.js");
const STYLE_CSS: &str = include_str!("../../assets/style.css");

/// GET /
pub async fn dashboard() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// Bundled asset body and content type for `name`.
pub fn asset(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "app.js" => Some((APP_JS, "text/javascript; charset=utf-8")),
        "login.js" => Some((LOGIN_JS, "text/javascript; charset=utf-8")),
        "style.css" => Some((STYLE_CSS, "text/css; charset=utf-8")),
        _ => None,
    }
}

/// GET /static/{file}
pub async fn static_file(Path(file): Path<String>) -> Response {
    match asset(&file) {
        Some((body, content_type)) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// GET /favicon.ico
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

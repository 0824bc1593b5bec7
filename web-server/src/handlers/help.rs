use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};

use crate::page::{render_index, FormEcho, IndexPage};
use crate::server::AppState;

pub async fn help() -> impl IntoResponse {
    Redirect::to("/")
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let echo = FormEcho::default();
    Html(render_index(&IndexPage {
        keys: state.config.key_status(),
        primary: state.defaults.primary,
        fallback: state.defaults.fallback,
        echo: &echo,
        result: String::new(),
    }))
}

pub async fn css() -> impl IntoResponse {
    const CSS: &str = include_str!("../../static/style.css");
    ([(header::CONTENT_TYPE, mime::TEXT_CSS_UTF_8.to_string())], CSS)
}

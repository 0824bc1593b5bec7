use std::borrow::Cow;

use axum::extract::State;
use axum::Json;

use crate::response::{ResponseStatus, StatusInfo};
use crate::server::AppState;

pub async fn api_status(State(state): State<AppState>) -> Json<ResponseStatus> {
    Json(ResponseStatus {
        status: Cow::Borrowed("Ok"),
        data: StatusInfo {
            api_keys: state.config.key_status(),
            primary_service: state.defaults.primary,
            fallback_service: state.defaults.fallback,
        },
    })
}

pub mod dto;
pub(crate) mod extractors;
mod handlers;
pub mod jwt;
pub mod password;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::router()
}

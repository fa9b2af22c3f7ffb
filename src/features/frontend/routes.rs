use axum::{routing::get, Router};

use crate::features::frontend::handlers::index_page;

pub fn routes() -> Router {
    Router::new().route("/ui", get(index_page))
}

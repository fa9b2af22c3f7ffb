use axum::{routing::get, Router};

use crate::features::health::handlers::health_check;

pub fn routes() -> Router {
    Router::new().route("/", get(health_check))
}

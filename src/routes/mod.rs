//! Route tables.

pub mod cars;
pub mod common;

pub use cars::car_routes;
pub use common::common_routes;

use crate::state::AppState;
use axum::Router;

/// The full application router: infrastructure routes at the root, car
/// routes under /api/v1.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", car_routes(state))
}

//! Car routes, mounted under /api/v1.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::cars::{
    bulk_create, bulk_update, create, delete as delete_handler, export_csv, export_html,
    import_csv, last, list, read, search, update, update_where,
};
use crate::state::AppState;

/// Uploads larger than this are rejected before the handler runs.
const IMPORT_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn car_routes(state: AppState) -> Router {
    Router::new()
        .route("/cars", get(list).post(create).patch(update_where))
        .route("/cars/bulk", post(bulk_create).patch(bulk_update))
        .route("/cars/search", post(search))
        .route("/cars/last", post(last))
        .route(
            "/cars/import",
            post(import_csv)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(IMPORT_BODY_LIMIT)),
        )
        .route("/cars/export.csv", get(export_csv))
        .route("/cars/export.html", get(export_html))
        .route("/cars/:id", get(read).put(update).delete(delete_handler))
        .with_state(state)
}

use axum::{
    Router,
    body::Bytes,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, instrument};

// Rendered once at startup; every client gets the same bytes
#[derive(Clone)]
pub struct AppState {
    page: Bytes,
}

impl AppState {
    pub fn new(page_html: String) -> Self {
        Self {
            page: Bytes::from(page_html),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[instrument(skip(state))]
pub async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    debug!(bytes = state.page.len(), "Serving dashboard page");
    Html(state.page.clone())
}

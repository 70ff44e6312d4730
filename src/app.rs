use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/dhikrs",
            get(handlers::list_dhikrs)
                .post(handlers::create_dhikr)
                .delete(handlers::clear_dhikrs),
        )
        .route(
            "/api/dhikrs/:id",
            get(handlers::get_dhikr).delete(handlers::delete_dhikr),
        )
        .route("/api/dhikrs/:id/start", post(handlers::start_dhikr))
        .route("/api/dhikrs/:id/tap", post(handlers::tap_dhikr))
        .route("/api/dhikrs/:id/count", put(handlers::set_count))
        .route("/api/dhikrs/:id/reset", post(handlers::reset_dhikr))
        .route("/api/dhikrs/:id/repeat", post(handlers::repeat_dhikr))
        .route(
            "/api/dhikrs/:id/schedule",
            put(handlers::set_schedule).delete(handlers::clear_schedule),
        )
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/reminders", get(handlers::get_reminders))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route("/api/library", get(handlers::get_library))
        .route("/api/export", get(handlers::export_backup))
        .route("/api/import", post(handlers::import_backup))
        .route("/api/share", post(handlers::share_link))
        .route("/api/share/accept", post(handlers::accept_share))
        .route("/api/export-link", get(handlers::export_link))
        .route("/api/import-link", post(handlers::import_link))
        .with_state(state)
}

use crate::{
    error::{HandlerPanickedSnafu, RosterError},
    routes::students::{
        delete_student, get_student_count, get_students, get_students_by_major,
        get_students_by_min_age, post_new_student, put_student,
    },
    state::RosterState,
};
use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub mod students;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/api/students", get(get_students).post(post_new_student))
        .route("/api/students/count", get(get_student_count))
        .route("/api/students/major/{major}", get(get_students_by_major))
        .route("/api/students/age/{min_age}", get(get_students_by_min_age))
        .route("/api/students/{id}", put(put_student).delete(delete_student))
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> RosterError {
    RosterError::RouteNotFound
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "unknown panic payload".to_string());

    HandlerPanickedSnafu { detail }.build().into_response()
}

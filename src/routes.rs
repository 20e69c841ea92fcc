// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, course, enrollment, profile, rating, skill},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, skills, courses, enrollments, ratings).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
///
/// Authentication is handled by the `Claims` extractor: handlers that take
/// a `Claims` argument require a bearer token, the rest are public.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/login", post(auth::login));

    let user_routes = Router::new().route(
        "/profile",
        get(profile::get_profile).put(profile::update_profile),
    );

    let skill_routes = Router::new()
        .route("/", get(skill::list_skills).post(skill::create_skill))
        .route("/track", post(skill::track_progress))
        .route("/user/{user_id}", get(skill::list_user_skills))
        .route(
            "/{id}",
            get(skill::get_skill)
                .put(skill::update_skill)
                .delete(skill::delete_skill),
        );

    let course_routes = Router::new()
        .route("/", get(course::list_courses).post(course::create_course))
        .route("/trainer", get(course::list_trainer_courses))
        .route(
            "/{id}",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        );

    let enrollment_routes = Router::new()
        .route("/", post(enrollment::enroll))
        .route("/user", get(enrollment::list_user_enrollments));

    let rating_routes = Router::new()
        .route("/", post(rating::submit_rating))
        .route("/course/{course_id}", get(rating::list_course_ratings));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/skills", skill_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/enrollments", enrollment_routes)
        .nest("/api/ratings", rating_routes)
        // Global Middleware (applied from outside in)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

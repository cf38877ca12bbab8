// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação: login é público, o resto passa pelo guard
    let auth_routes = Router::new()
        .route("/validate", get(handlers::auth::validate))
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/login", post(handlers::auth::login));

    let case_routes = Router::new()
        .route("/"
               ,post(handlers::cases::create_case)
               .get(handlers::cases::list_cases)
        )
        .route("/{id}", get(handlers::cases::get_case))
        .route("/{id}/status", put(handlers::cases::set_status))
        .route("/{id}/updates", post(handlers::cases::append_update))
        .route("/{id}/files", post(handlers::cases::attach_file))
        .route("/{id}/assignee"
               ,put(handlers::cases::assign)
               .delete(handlers::cases::unassign)
        )
        .route("/{id}/incident-location"
               ,put(handlers::cases::set_incident_location)
               .delete(handlers::cases::clear_incident_location)
        )
        .route("/{id}/floor-plan", delete(handlers::cases::detach_floor_plan))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let floor_plan_routes = Router::new()
        .route("/"
               ,post(handlers::floor_plans::create_floor_plan)
               .get(handlers::floor_plans::list_floor_plans)
        )
        .route("/{id}", get(handlers::floor_plans::get_floor_plan))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/cases", case_routes)
        .nest("/api/floor-plans", floor_plan_routes)
        .with_state(app_state)
}

// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::validate,
        handlers::auth::get_me,

        // --- Cases ---
        handlers::cases::create_case,
        handlers::cases::list_cases,
        handlers::cases::get_case,
        handlers::cases::set_status,
        handlers::cases::append_update,
        handlers::cases::attach_file,
        handlers::cases::assign,
        handlers::cases::unassign,

        // --- Floor Plans ---
        handlers::cases::set_incident_location,
        handlers::cases::clear_incident_location,
        handlers::cases::detach_floor_plan,
        handlers::floor_plans::create_floor_plan,
        handlers::floor_plans::list_floor_plans,
        handlers::floor_plans::get_floor_plan,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::LoginResponse,
            models::auth::ValidateResponse,
            models::session::SessionView,

            // --- Cases ---
            models::case::CaseStatus,
            models::case::Case,
            models::case::CaseUpdate,
            models::case::CaseFile,
            models::case::IncidentLocation,
            models::case::NewCase,
            models::case::NewUpdate,
            models::case::FileMeta,
            models::case::StatusPayload,
            models::case::AssignPayload,
            models::case::PlacementPayload,

            // --- Floor Plans ---
            models::floor_plan::FloorPlan,
            models::floor_plan::NewFloorPlan,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Sessão"),
        (name = "Cases", description = "Ciclo de Vida dos Casos"),
        (name = "Floor Plans", description = "Plantas Baixas e Localização de Incidentes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

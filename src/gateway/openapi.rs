//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{DeletedData, ProblemPayload};
use crate::transfer::{Event, Transfer, TransferStatus, TransferType};

/// Caller identity header, set by the upstream auth layer
struct UserIdAddon;

impl Modify for UserIdAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-User-ID",
                    "Opaque caller identity. Every read and write is scoped to it.",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paygate Transfer API",
        version = "1.0.0",
        description = "Create, list and delete ACH transfers between originators and customers.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::transfer::list_transfers,
        crate::gateway::handlers::transfer::get_transfer,
        crate::gateway::handlers::transfer::create_transfers,
        crate::gateway::handlers::transfer::create_transfers_batch,
        crate::gateway::handlers::transfer::delete_transfer,
        crate::gateway::handlers::transfer::get_transfer_events,
        crate::gateway::handlers::transfer::transfer_failed,
        crate::gateway::handlers::transfer::transfer_files,
    ),
    components(
        schemas(
            HealthResponse,
            Transfer,
            TransferType,
            TransferStatus,
            Event,
            DeletedData,
            ProblemPayload,
        )
    ),
    modifiers(&UserIdAddon),
    security(("user_id" = [])),
    tags(
        (name = "Transfers", description = "ACH transfer management (X-User-ID required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, client_handler, contract_handler, event_handler, user_handler,
};
use crate::domain::{ClientResponse, ContractResponse, EventResponse, Role, UserResponse};
use crate::services::{TokenPair, TokenResponse};

/// OpenAPI documentation for the EpiCRM API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EpiCRM API",
        version = "0.1.0",
        description = "Role-scoped CRM API for clients, contracts and events",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login,
        auth_handler::refresh,
        user_handler::list_users,
        user_handler::get_current_user,
        user_handler::get_user,
        user_handler::create_user,
        user_handler::replace_user,
        user_handler::update_user,
        user_handler::delete_user,
        client_handler::list_clients,
        client_handler::get_client,
        client_handler::create_client,
        client_handler::replace_client,
        client_handler::update_client,
        client_handler::delete_client,
        contract_handler::list_contracts,
        contract_handler::get_contract,
        contract_handler::create_contract,
        contract_handler::replace_contract,
        contract_handler::update_contract,
        contract_handler::delete_contract,
        event_handler::list_events,
        event_handler::get_event,
        event_handler::create_event,
        event_handler::replace_event,
        event_handler::update_event,
        event_handler::delete_event,
    ),
    components(
        schemas(
            Role,
            UserResponse,
            ClientResponse,
            ContractResponse,
            EventResponse,
            TokenPair,
            TokenResponse,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            user_handler::CreateUserRequest,
            user_handler::ReplaceUserRequest,
            user_handler::UpdateUserRequest,
            client_handler::CreateClientRequest,
            client_handler::UpdateClientRequest,
            contract_handler::CreateContractRequest,
            contract_handler::UpdateContractRequest,
            event_handler::CreateEventRequest,
            event_handler::UpdateEventRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and token refresh"),
        (name = "Users", description = "Collaborator account management"),
        (name = "Clients", description = "Client management"),
        (name = "Contracts", description = "Contract management"),
        (name = "Events", description = "Event management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

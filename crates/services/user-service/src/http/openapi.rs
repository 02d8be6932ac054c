//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use domain::UserResponse;

use crate::http::handlers::user_handler;

/// OpenAPI documentation for the user service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service",
        version = "0.1.0",
        description = "User management API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        user_handler::create_user,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            UserResponse,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
        )
    ),
    tags(
        (name = "Users", description = "User management operations")
    )
)]
pub struct ApiDoc;

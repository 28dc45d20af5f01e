use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::render_one,
        api::render_batch,
        api::preview,
        api::parse_guests,
    ),
    components(
        schemas(
            api::RenderRequest,
            api::BatchRenderRequest,
            api::PreviewResponse,
            api::GuestListRequest,
            api::GuestListResponse,
            api::HealthResponse,
        )
    ),
    tags(
        (name = "invitegen", description = "Invitation personalization API")
    )
)]
pub struct ApiDoc;

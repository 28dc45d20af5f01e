use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    guests,
    render::{batch, compose, invitation, RenderError, RenderErrorKind, Style},
    state::AppState,
    templates, util,
};

const DEFAULT_FONT_FAMILY: &str = "DejaVuSans";
const DEFAULT_FONT_SIZE_PX: f32 = 40.0;
const DEFAULT_COLOR: &str = "#ffffff";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Base64 or data-URI encoded template image.
    pub template_image: Option<String>,
    /// Name of a template under the templates root, used when no inline
    /// image is given.
    pub template_ref: Option<String>,
    pub guest_name: String,
    pub font_family: Option<String>,
    pub font_size_px: Option<f32>,
    pub color: Option<String>,
    pub letter_spacing_px: Option<f32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchRenderRequest {
    pub template_image: Option<String>,
    pub template_ref: Option<String>,
    pub guest_names: Vec<String>,
    pub font_family: Option<String>,
    pub font_size_px: Option<f32>,
    pub color: Option<String>,
    pub letter_spacing_px: Option<f32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// `data:image/png;base64,...` for direct use as an image source.
    pub image_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestListRequest {
    /// Base64 or data-URI encoded delimited-text file.
    pub file: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuestListResponse {
    pub guests: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

impl IntoResponse for RenderError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.kind() {
            RenderErrorKind::Input => StatusCode::BAD_REQUEST,
            RenderErrorKind::NotFound => StatusCode::NOT_FOUND,
            RenderErrorKind::Resource
            | RenderErrorKind::Compositing
            | RenderErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let openapi = crate::openapi::ApiDoc::openapi();
    let max_body = state.max_body_bytes;

    Router::new()
        // Swagger UI + OpenAPI schema
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi))
        // API
        .route("/render", post(render_one))
        .route("/render/batch", post(render_batch))
        .route("/preview", post(preview))
        .route("/guests/parse", post(parse_guests))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

#[utoipa::path(get, path = "/health", tag = "invitegen", responses((status=200, body=HealthResponse)))]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".into() })
}

#[utoipa::path(
    post,
    path = "/render",
    tag = "invitegen",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Personalized invitation PNG", content_type = "image/png"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Render failed")
    )
)]
pub async fn render_one(
    State(st): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> Result<impl IntoResponse, RenderError> {
    let (guest, png) = render_png(st, req).await?;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (header::CONTENT_DISPOSITION, attachment_disposition(&guest)),
    ];
    Ok((headers, png))
}

#[utoipa::path(
    post,
    path = "/render/batch",
    tag = "invitegen",
    request_body = BatchRenderRequest,
    responses(
        (status = 200, description = "Zip archive with one PNG per rendered guest", content_type = "application/zip"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Render failed")
    )
)]
pub async fn render_batch(
    State(st): State<Arc<AppState>>,
    Json(req): Json<BatchRenderRequest>,
) -> Result<impl IntoResponse, RenderError> {
    let BatchRenderRequest {
        template_image,
        template_ref,
        guest_names,
        font_family,
        font_size_px,
        color,
        letter_spacing_px,
    } = req;

    let guest_names: Vec<String> = guest_names.iter().map(|g| g.trim().to_string()).collect();
    if guest_names.is_empty() {
        return Err(RenderError::Input("guestNames is required".into()));
    }
    if guest_names.iter().any(|g| g.is_empty()) {
        return Err(RenderError::Input("guestNames must not contain empty names".into()));
    }
    let style = build_style(font_family, font_size_px, color.as_deref(), letter_spacing_px)?;

    let out = tokio::task::spawn_blocking(move || {
        let base = load_base_image(&st, template_image.as_deref(), template_ref.as_deref())?;
        batch::render_batch(&guest_names, st.batch_concurrency, |guest| {
            invitation::render_invitation(&st.fonts, &base, guest, &style)
        })
    })
    .await
    .map_err(|e| RenderError::Internal(format!("render task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"invitations.zip\"".to_string(),
        ),
        (
            HeaderName::from_static("x-render-failures"),
            out.failures.len().to_string(),
        ),
    ];
    Ok((headers, out.zip_bytes))
}

#[utoipa::path(
    post,
    path = "/preview",
    tag = "invitegen",
    request_body = RenderRequest,
    responses(
        (status = 200, body = PreviewResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Render failed")
    )
)]
pub async fn preview(
    State(st): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<PreviewResponse>, RenderError> {
    let (_, png) = render_png(st, req).await?;
    Ok(Json(PreviewResponse {
        image_url: util::to_data_uri("image/png", &png),
    }))
}

#[utoipa::path(
    post,
    path = "/guests/parse",
    tag = "invitegen",
    request_body = GuestListRequest,
    responses(
        (status = 200, body = GuestListResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn parse_guests(
    Json(req): Json<GuestListRequest>,
) -> Result<Json<GuestListResponse>, RenderError> {
    let bytes = util::b64_decode(&req.file)
        .ok_or_else(|| RenderError::Input("file is not valid base64".into()))?;
    let guests = guests::parse_guest_list(&bytes)?;
    Ok(Json(GuestListResponse { guests }))
}

/// Validate and render a single invitation. Shared by the download and
/// preview handlers; only the delivery differs.
async fn render_png(st: Arc<AppState>, req: RenderRequest) -> Result<(String, Vec<u8>), RenderError> {
    let RenderRequest {
        template_image,
        template_ref,
        guest_name,
        font_family,
        font_size_px,
        color,
        letter_spacing_px,
    } = req;

    let guest = guest_name.trim().to_string();
    if guest.is_empty() {
        return Err(RenderError::Input("guestName is required".into()));
    }
    let style = build_style(font_family, font_size_px, color.as_deref(), letter_spacing_px)?;

    let guest_name = guest.clone();
    let png = tokio::task::spawn_blocking(move || {
        let base = load_base_image(&st, template_image.as_deref(), template_ref.as_deref())?;
        invitation::render_invitation(&st.fonts, &base, &guest_name, &style)
    })
    .await
    .map_err(|e| RenderError::Internal(format!("render task failed: {e}")))??;

    Ok((guest, png))
}

fn build_style(
    font_family: Option<String>,
    font_size_px: Option<f32>,
    color: Option<&str>,
    letter_spacing_px: Option<f32>,
) -> Result<Style, RenderError> {
    Style::new(
        font_family.unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
        font_size_px.unwrap_or(DEFAULT_FONT_SIZE_PX),
        color.unwrap_or(DEFAULT_COLOR),
        letter_spacing_px.unwrap_or(0.0),
    )
}

fn load_base_image(
    st: &AppState,
    template_image: Option<&str>,
    template_ref: Option<&str>,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, RenderError> {
    let inline = template_image.map(str::trim).filter(|s| !s.is_empty());
    let named = template_ref.map(str::trim).filter(|s| !s.is_empty());

    let bytes = match (inline, named) {
        (Some(b64), _) => util::b64_decode(b64)
            .ok_or_else(|| RenderError::Input("templateImage is not valid base64".into()))?,
        (None, Some(name)) => templates::resolve_template(&st.templates_dir, name)?,
        (None, None) => {
            return Err(RenderError::Input(
                "templateImage or templateRef is required".into(),
            ))
        }
    };
    compose::decode_base_image(&bytes)
}

fn attachment_disposition(guest: &str) -> String {
    format!(
        "attachment; filename=\"{}.png\"",
        util::sanitize_filename(guest)
    )
}

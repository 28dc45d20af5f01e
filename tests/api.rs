use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use base64::Engine;
use http_body_util::BodyExt;
use image::{ImageBuffer, ImageEncoder, Rgba};
use serde_json::{json, Value};
use tower::ServiceExt;

use invitegen_backend::{api, AppState};

fn app() -> Router {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let state = AppState::new(
        root.join("assets/fonts"),
        root.join("assets/templates"),
        2,
        25 * 1024 * 1024,
    );
    api::router(Arc::new(state))
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn template_png(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgba([0x10, 0x20, 0x30, 255]));
    let mut buf = Vec::new();
    let enc = image::codecs::png::PngEncoder::new(&mut buf);
    enc.write_image(&img, width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

fn render_body(guest: &str) -> Value {
    json!({
        "templateImage": b64(&template_png(200, 100)),
        "guestName": guest,
        "fontFamily": "DejaVuSans",
        "fontSizePx": 32.0,
        "color": "#ffffff",
        "letterSpacingPx": 2.0,
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn render_returns_png_attachment() {
    let response = app()
        .oneshot(post_json("/render", render_body("Ada")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"Ada.png\""
    );

    let png = body_bytes(response).await;
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (200, 100));
}

#[tokio::test]
async fn render_accepts_data_uri_templates() {
    let mut body = render_body("Ada");
    body["templateImage"] = json!(format!(
        "data:image/png;base64,{}",
        b64(&template_png(64, 64))
    ));

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn render_resolves_named_templates() {
    let body = json!({
        "templateRef": "sample.png",
        "guestName": "Ada",
    });

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let png = body_bytes(response).await;
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (600, 300));
}

#[tokio::test]
async fn render_without_any_template_is_bad_request() {
    let body = json!({ "guestName": "Ada" });
    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("template"));
}

#[tokio::test]
async fn render_with_blank_guest_is_bad_request() {
    let response = app()
        .oneshot(post_json("/render", render_body("   ")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn render_with_unknown_named_template_is_not_found() {
    let body = json!({
        "templateRef": "missing.png",
        "guestName": "Ada",
    });
    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn render_with_escaping_template_ref_is_not_found() {
    let body = json!({
        "templateRef": "../fonts/DejaVuSans.ttf",
        "guestName": "Ada",
    });
    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn render_with_unknown_font_is_server_error() {
    let mut body = render_body("Ada");
    body["fontFamily"] = json!("NoSuchFamily");

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn render_with_negative_spacing_is_bad_request() {
    let mut body = render_body("Ada");
    body["letterSpacingPx"] = json!(-3.0);

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn render_with_bad_color_is_bad_request() {
    let mut body = render_body("Ada");
    body["color"] = json!("#zzz");

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn render_with_outsized_font_size_is_capped_not_fatal() {
    let mut body = render_body("Ada");
    body["fontSizePx"] = json!(50_000.0);

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let png = body_bytes(response).await;
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (200, 100));
}

#[tokio::test]
async fn render_with_corrupt_template_is_server_error() {
    let mut body = render_body("Ada");
    body["templateImage"] = json!(b64(b"these bytes are not an image"));

    let response = app().oneshot(post_json("/render", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn batch_returns_ordered_zip() {
    let body = json!({
        "templateImage": b64(&template_png(200, 100)),
        "guestNames": ["Ada", "Ben", "Ada"],
        "fontFamily": "DejaVuSans",
        "fontSizePx": 28.0,
        "color": "#ffffff",
    });

    let response = app().oneshot(post_json("/render/batch", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"invitations.zip\""
    );
    assert_eq!(response.headers().get("x-render-failures").unwrap(), "0");

    let zip_bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(zip_bytes)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["Ada.png", "Ben.png", "Ada.png"]);
}

#[tokio::test]
async fn batch_with_empty_guest_list_is_bad_request() {
    let body = json!({
        "templateImage": b64(&template_png(100, 50)),
        "guestNames": [],
    });
    let response = app().oneshot(post_json("/render/batch", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_with_blank_guest_entry_is_bad_request() {
    let body = json!({
        "templateImage": b64(&template_png(100, 50)),
        "guestNames": ["Ada", "  "],
    });
    let response = app().oneshot(post_json("/render/batch", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preview_returns_inline_data_uri() {
    let response = app()
        .oneshot(post_json("/preview", render_body("Ada")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let image_url = body["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("data:image/png;base64,"));

    let payload = image_url.strip_prefix("data:image/png;base64,").unwrap();
    let png = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (200, 100));
}

#[tokio::test]
async fn parse_guests_returns_first_column() {
    let csv = "name,email\nAda Lovelace,ada@example.com\n,blank@example.com\nGrace Hopper,g@example.com\n";
    let body = json!({ "file": b64(csv.as_bytes()) });

    let response = app().oneshot(post_json("/guests/parse", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, json!({ "guests": ["Ada Lovelace", "Grace Hopper"] }));
}

#[tokio::test]
async fn parse_guests_rejects_bad_base64() {
    let body = json!({ "file": "!!! definitely not base64 !!!" });
    let response = app().oneshot(post_json("/guests/parse", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

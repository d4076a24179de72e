use actix_web::http::header;
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::AppState;

fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// GET /storage/{bucket}/{path}
///
/// Serves stored images at their public URLs.
pub async fn serve_object(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (bucket, object) = path.into_inner();
    let content_type = content_type_for(&object);
    let bytes = web::block(move || state.storage.download(&bucket, &object)).await??;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(bytes))
}

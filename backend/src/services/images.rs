//! Serves uploaded images under the durable URLs written on publish.

use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use mime_guess::from_path;

use crate::db::{self, StubState};

const API_PATH: &str = "/images";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{id}/{filename}", get().to(process))
}

/// The filename segment is cosmetic; the id alone selects the image.
pub async fn process(path: web::Path<(String, String)>, state: web::Data<StubState>) -> HttpResponse {
    let (id, _filename) = path.into_inner();
    let state = state.get_ref().clone();
    let found = tokio::task::spawn_blocking(move || {
        let conn = state.conn()?;
        db::find_image(&conn, &id)
    })
    .await
    .unwrap_or_else(|e| Err(e.to_string()));

    match found {
        Ok(Some(image)) => {
            let mime = if image.mime.is_empty() {
                from_path(&image.filename).first_or_octet_stream().to_string()
            } else {
                image.mime
            };
            HttpResponse::Ok()
                .content_type(mime)
                .insert_header(("Cache-Control", "public, max-age=31536000, immutable"))
                .body(image.bytes)
        }
        Ok(None) => HttpResponse::NotFound().body("Image not found"),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error reading image: {e}")),
    }
}

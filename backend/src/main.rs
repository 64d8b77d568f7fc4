mod config;
mod db;
mod services;

use crate::config::StubConfig;
use crate::db::StubState;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

/// Request bodies carry base64 images.
const PAYLOAD_LIMIT: usize = 16 * 1024 * 1024;

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = StubConfig::from_env();
    let url = config.url();
    let bind = (config.host.clone(), config.port);
    let open_browser = config.open_browser;

    let state = StubState::open(config).map_err(|e| {
        error!("Cannot open the stub database: {e}");
        std::io::Error::other(e)
    })?;

    if open_browser {
        let url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url);
        });
    }

    info!("Content backend stub running at {url} (endpoint {url}/exec)");

    HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
            .default_service(web::route().to(serve_embedded))
    })
    .bind(bind)?
    .run()
    .await
}

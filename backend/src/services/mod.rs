//! HTTP surface of the stub: the single action endpoint and the image files
//! it hands out on publish.

pub mod exec;
pub mod images;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(exec::configure_routes())
        .service(images::configure_routes());
}

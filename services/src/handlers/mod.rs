//! HTTP route registration.

mod gt;

use actix_web::web;

/// Registers every `/gt/*` route onto `cfg`. Takes an `&mut
/// web::ServiceConfig` so `main.rs` can compose it into one `App` via
/// `App::configure`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gt")
            .route("/colors", web::get().to(gt::colors))
            .route("/breaks", web::post().to(gt::breaks))
            .route("/wo", web::post().to(gt::weighted_overlay_png))
            .route("/tile/{z}/{x}/{y}.png", web::post().to(gt::tile_png))
            .route("/histogram", web::post().to(gt::histogram_handler))
            .route("/value", web::post().to(gt::value))
            .route("/spark/value", web::post().to(gt::value)),
    );
}

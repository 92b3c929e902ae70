pub mod create_pass;
pub mod create_passes_bulk;
pub mod revoke_pending_pass;

use actix_web::web;
use create_pass::create_pass_controller;
use create_passes_bulk::create_passes_bulk_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/events/{event_id}/passes",
        web::post().to(create_pass_controller),
    );
    cfg.route(
        "/events/{event_id}/passes/bulk",
        web::post().to(create_passes_bulk_controller),
    );
}

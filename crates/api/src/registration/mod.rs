pub mod cancel_registration;
mod subscribers;
pub mod try_register;

use actix_web::web;
use cancel_registration::cancel_registration_controller;
use try_register::try_register_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/events/{event_id}/registrations",
        web::post().to(try_register_controller),
    );
    cfg.route(
        "/events/{event_id}/registrations/{user_id}",
        web::delete().to(cancel_registration_controller),
    );
}

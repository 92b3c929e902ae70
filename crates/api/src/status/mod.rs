use actix_web::{web, HttpResponse};
use passgate_api_structs::get_service_health::*;
use passgate_infra::PassgateContext;

async fn status(ctx: web::Data<PassgateContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Passgate is up".into(),
        active_dispatch_profiles: ctx
            .config
            .dispatch_profiles
            .iter()
            .filter(|p| p.active)
            .map(|p| p.name.clone())
            .collect(),
        timezone: ctx.config.timezone.name().to_string(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}

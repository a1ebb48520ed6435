pub mod finance;
pub mod order;

use actix_web::{web, HttpResponse};

use crate::routes::finance::finance_route;
use crate::routes::order::handlers::{agreement_message_webhook, websocket_connect};
use crate::routes::order::order_route;

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("alive")
}

pub fn main_route(cfg: &mut web::ServiceConfig) {
    cfg.route("/health_check", web::get().to(health_check))
        .route(
            "/webhook/agreement-message",
            web::post().to(agreement_message_webhook),
        )
        .route("/ws", web::get().to(websocket_connect))
        .service(web::scope("/order").configure(order_route))
        .service(web::scope("/finance").configure(finance_route));
}

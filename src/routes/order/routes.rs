use actix_web::web;

use super::handlers::{
    agreement_message_send, order_cancel, order_fetch, order_list, order_receipt,
    order_receipt_bulk, order_search, order_ship, order_status_update, order_transitions,
};

pub fn order_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/list").route(web::get().to(order_list)));
    cfg.service(web::resource("/search").route(web::post().to(order_search)));
    cfg.service(web::resource("/fetch/{id}").route(web::get().to(order_fetch)));
    cfg.service(web::resource("/transitions/{id}").route(web::get().to(order_transitions)));
    cfg.service(web::resource("/status/{id}").route(web::post().to(order_status_update)));
    cfg.service(web::resource("/ship/{id}").route(web::post().to(order_ship)));
    cfg.service(web::resource("/cancel/{id}").route(web::post().to(order_cancel)));
    cfg.service(web::resource("/message/{id}").route(web::post().to(agreement_message_send)));
    cfg.service(web::resource("/receipt/bulk").route(web::post().to(order_receipt_bulk)));
    cfg.service(web::resource("/receipt/{id}").route(web::get().to(order_receipt)));
}

use actix_web::web;

use super::handlers::{commission_breakdown, financial_summary, remit_commissions};

pub fn finance_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/summary").route(web::get().to(financial_summary)));
    cfg.service(web::resource("/breakdown").route(web::get().to(commission_breakdown)));
    cfg.service(web::resource("/remit").route(web::post().to(remit_commissions)));
}

pub mod payments;
pub mod tickets;

use actix_web::HttpResponse;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ticketd running")
}

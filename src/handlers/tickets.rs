use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::admission::AdmissionService;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTicketRequest {
    /// Scanned payload, "<ticket_code>|<email>"
    pub qr_data: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketView {
    pub ticket_code: String,
    pub ticket_type: String,
    pub attendee_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyTicketResponse {
    pub success: bool,
    pub message: String,
    pub ticket: TicketView,
}

/// POST /api/tickets/verify
///
/// Admission scan: validates the code/email pair and consumes the ticket
/// (ACTIVE → USED, one admission per ticket).
#[utoipa::path(
    post,
    path = "/api/tickets/verify",
    request_body = VerifyTicketRequest,
    responses(
        (status = 200, description = "Ticket valid and now consumed", body = VerifyTicketResponse),
        (status = 400, description = "Mismatched email, malformed payload, or already used"),
        (status = 404, description = "Unknown ticket code"),
    ),
    tag = "tickets"
)]
pub async fn verify_ticket(
    service: web::Data<AdmissionService>,
    body: web::Json<VerifyTicketRequest>,
) -> Result<HttpResponse, AppError> {
    let qr_data = body.into_inner().qr_data;

    let view = web::block(move || service.scan(&qr_data))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(VerifyTicketResponse {
        success: true,
        message: "Ticket valid".into(),
        ticket: TicketView {
            ticket_code: view.ticket_code,
            ticket_type: view.ticket_type,
            attendee_name: view.attendee_name,
            email: view.email,
        },
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use super::*;
    use crate::domain::ports::TicketRepository;
    use crate::infrastructure::memory::MemoryTicketRepository;
    use crate::ticketing::mint::TicketMinter;

    fn seeded() -> (web::Data<AdmissionService>, String) {
        let tickets = Arc::new(MemoryTicketRepository::default());
        let ticket = TicketMinter::new()
            .mint("Xy7Qw2Lm9a", "VIP", "Ada Lovelace", "ada@example.com")
            .expect("mint failed");
        tickets.insert(&ticket).expect("insert failed");
        (
            web::Data::new(AdmissionService::new(tickets)),
            ticket.ticket_code,
        )
    }

    #[actix_web::test]
    async fn scan_admits_once_then_rejects() {
        let (service, code) = seeded();
        let app = test::init_service(
            App::new()
                .app_data(service)
                .route("/verify", web::post().to(verify_ticket)),
        )
        .await;

        let payload = serde_json::json!({ "qrData": format!("{}|ada@example.com", code) });

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(&payload)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["ticket"]["attendee_name"], "Ada Lovelace");

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_ticket_returns_404() {
        let (service, _) = seeded();
        let app = test::init_service(
            App::new()
                .app_data(service)
                .route("/verify", web::post().to(verify_ticket)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "qrData": "GHOST-XXXXXXXX|ada@example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

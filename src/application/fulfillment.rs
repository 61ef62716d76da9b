use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::EventDetails;
use crate::domain::errors::DomainError;
use crate::domain::order::{ContactDetails, NewOrder, Order, OrderStatus};
use crate::domain::ports::{
    Attachment, InitiatePayment, Mailer, OrderRepository, OutboundEmail, PaymentGateway,
    TicketRepository,
};
use crate::pricing::PriceTable;
use crate::ticketing::mint::{new_order_ref, TicketMinter};
use crate::ticketing::pdf::PdfRenderer;

const SUCCESS_STATUS: &str = "success";
const CHARGE_SUCCEEDED_EVENT: &str = "charge.success";

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub admin_email: String,
    pub frontend_url: String,
    /// Pause between the customer and admin emails so two back-to-back sends
    /// stay under the provider's rate limit.
    pub pacing: Duration,
}

#[derive(Debug, Clone)]
pub struct CheckoutAccepted {
    pub authorization_url: String,
    pub order_ref: String,
}

#[derive(Debug, Clone)]
pub struct PaymentState {
    pub status: OrderStatus,
    pub order_ref: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    reference: Option<String>,
}

/// The payment-confirmation-to-fulfillment pipeline. Reachable concurrently
/// from the client verification endpoint, the gateway webhook, and retries of
/// either; the order repository's conditional PENDING → PAID write is the
/// only gate that decides which caller runs `fulfill`.
pub struct FulfillmentService {
    orders: Arc<dyn OrderRepository>,
    tickets: Arc<dyn TicketRepository>,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    pricing: PriceTable,
    minter: TicketMinter,
    renderer: PdfRenderer,
    notify: NotifySettings,
}

impl FulfillmentService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        tickets: Arc<dyn TicketRepository>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        pricing: PriceTable,
        event: EventDetails,
        notify: NotifySettings,
    ) -> Self {
        Self {
            orders,
            tickets,
            gateway,
            mailer,
            pricing,
            minter: TicketMinter::new(),
            renderer: PdfRenderer::new(event),
            notify,
        }
    }

    /// Create a PENDING order from the cart and obtain a hosted-checkout URL.
    /// If the gateway call fails the order stays PENDING and the error is the
    /// caller's to handle; nothing retries here.
    pub fn initiate_order(
        &self,
        contact: ContactDetails,
        items: &[(String, i32)],
        success_url: Option<String>,
    ) -> Result<CheckoutAccepted, DomainError> {
        if contact.email.trim().is_empty() {
            return Err(DomainError::InvalidInput("email is required".into()));
        }
        let (amount, line_items) = self.pricing.price_items(items)?;

        let order_ref = new_order_ref();
        let email = contact.email.clone();
        let order = self.orders.create(&NewOrder {
            order_ref: order_ref.clone(),
            contact,
            amount,
            currency: self.pricing.currency().to_string(),
            line_items,
        })?;

        let callback_url = success_url
            .unwrap_or_else(|| format!("{}/payment-callback", self.notify.frontend_url));
        let authorization_url = self.gateway.initiate(&InitiatePayment {
            email,
            // The gateway takes minor currency units.
            amount_minor: order.amount * 100,
            currency: order.currency.clone(),
            reference: order_ref.clone(),
            callback_url,
        })?;

        log::info!("order {} created, awaiting payment", order_ref);
        Ok(CheckoutAccepted {
            authorization_url,
            order_ref,
        })
    }

    /// Client-driven verification. Idempotent: an already-PAID order reports
    /// its state without touching the gateway, and a lost race on the PAID
    /// transition skips fulfillment.
    pub fn confirm_payment(&self, order_ref: &str) -> Result<PaymentState, DomainError> {
        let order = self
            .orders
            .find_by_ref(order_ref)?
            .ok_or(DomainError::NotFound)?;

        if order.status == OrderStatus::Paid {
            return Ok(PaymentState {
                status: OrderStatus::Paid,
                order_ref: order.order_ref,
            });
        }

        let verification = self.gateway.verify(order_ref)?;
        if verification.status != SUCCESS_STATUS {
            log::info!(
                "order {} verification returned '{}', leaving PENDING",
                order_ref,
                verification.status
            );
            return Ok(PaymentState {
                status: order.status,
                order_ref: order.order_ref,
            });
        }

        self.settle(order_ref, &verification.gateway_ref)?;
        Ok(PaymentState {
            status: OrderStatus::Paid,
            order_ref: order.order_ref,
        })
    }

    /// Gateway-driven entry point. The signature is checked over the raw
    /// bytes before anything is parsed; unknown events and unknown orders are
    /// acknowledged so the gateway stops retrying.
    pub fn handle_webhook(&self, raw_body: &[u8], signature: &str) -> Result<(), DomainError> {
        if !self.gateway.verify_signature(raw_body, signature) {
            return Err(DomainError::Unauthorized);
        }

        let event: WebhookEvent = match serde_json::from_slice(raw_body) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("ignoring unparseable webhook body: {}", e);
                return Ok(());
            }
        };

        if event.event != CHARGE_SUCCEEDED_EVENT {
            log::debug!("ignoring webhook event '{}'", event.event);
            return Ok(());
        }

        let Some(reference) = event.data.and_then(|d| d.reference) else {
            log::warn!("charge.success webhook without a reference, ignoring");
            return Ok(());
        };

        let Some(order) = self.orders.find_by_ref(&reference)? else {
            log::warn!("webhook for unknown order {}, acknowledging", reference);
            return Ok(());
        };
        if order.status == OrderStatus::Paid {
            return Ok(());
        }

        // Never trust the webhook payload's own status; re-verify with the
        // gateway before transitioning.
        let verification = self.gateway.verify(&reference)?;
        if verification.status != SUCCESS_STATUS {
            log::warn!(
                "webhook claimed success but verify returned '{}' for order {}",
                verification.status,
                reference
            );
            return Ok(());
        }

        self.settle(&reference, &verification.gateway_ref)
    }

    /// Attempt the atomic PENDING → PAID transition; the winner fulfills.
    fn settle(&self, order_ref: &str, gateway_ref: &str) -> Result<(), DomainError> {
        if !self.orders.mark_paid(order_ref, gateway_ref)? {
            log::info!("order {} already PAID, skipping fulfillment", order_ref);
            return Ok(());
        }

        let order = self
            .orders
            .find_by_ref(order_ref)?
            .ok_or(DomainError::NotFound)?;
        self.fulfill(&order).map_err(|e| {
            log::error!("fulfillment failed for order {}: {}", order_ref, e);
            e
        })
    }

    /// Mint one ticket per purchased seat, render PDFs, and deliver them.
    /// Only reachable after winning the PAID transition. Failures here leave
    /// the order PAID; the minted-ticket guard makes re-driving safe.
    fn fulfill(&self, order: &Order) -> Result<(), DomainError> {
        if self.tickets.count_for_order(&order.order_ref)? > 0 {
            log::warn!(
                "tickets already minted for order {}, skipping",
                order.order_ref
            );
            return Ok(());
        }

        let mut minted = Vec::new();
        let mut attachments = Vec::new();
        for line in &order.line_items {
            for _ in 0..line.quantity {
                let ticket = self.minter.mint(
                    &order.order_ref,
                    &line.ticket_type,
                    order.attendee_name(),
                    &order.contact.email,
                )?;
                self.tickets.insert(&ticket)?;

                let pdf = self.renderer.render(&ticket, order)?;
                attachments.push(Attachment {
                    filename: format!("Ticket_{}.pdf", ticket.ticket_code),
                    content: pdf,
                });
                minted.push(ticket);
            }
        }

        self.mailer
            .send(&customer_email(order, &minted, attachments))?;

        std::thread::sleep(self.notify.pacing);

        // The customer has their tickets; a failed ops notification is an
        // annoyance, not a failed fulfillment.
        let admin = admin_email(&self.notify.admin_email, order, minted.len());
        if let Err(e) = self.mailer.send(&admin) {
            log::error!(
                "admin notification failed for order {}: {}",
                order.order_ref,
                e
            );
        }

        log::info!(
            "order {} fulfilled: {} tickets minted and delivered",
            order.order_ref,
            minted.len()
        );
        Ok(())
    }
}

fn customer_email(
    order: &Order,
    minted: &[crate::domain::ticket::Ticket],
    attachments: Vec<Attachment>,
) -> OutboundEmail {
    let ticket_list: String = minted
        .iter()
        .map(|t| {
            format!(
                "<div><strong>{}</strong> &mdash; Code: {}</div>",
                t.ticket_type, t.ticket_code
            )
        })
        .collect();

    let html = format!(
        "<h2>Your Ticket(s)</h2>\
         <p>Hi {},</p>\
         <p>Your payment was successful!</p>\
         <p><b>Order Ref:</b> {}</p>\
         <p><b>Tickets:</b> {}</p>\
         <hr/>{}\
         <p>Your tickets are attached as PDFs. Please bring them to the event.</p>",
        order.attendee_name(),
        order.order_ref,
        minted.len(),
        ticket_list
    );

    OutboundEmail {
        to: order.contact.email.clone(),
        subject: format!("Your Ticket(s) - Ref: {}", order.order_ref),
        html,
        attachments,
    }
}

fn admin_email(admin: &str, order: &Order, ticket_count: usize) -> OutboundEmail {
    let html = format!(
        "<h2>New Order Received</h2>\
         <p><b>Order Ref:</b> {}</p>\
         <p><b>Name:</b> {}</p>\
         <p><b>Email:</b> {}</p>\
         <p><b>Phone:</b> {}</p>\
         <p><b>Country:</b> {}</p>\
         <p><b>Company:</b> {}</p>\
         <p><b>Tickets:</b> {}</p>",
        order.order_ref,
        order.attendee_name(),
        order.contact.email,
        order.contact.phone.as_deref().unwrap_or("-"),
        order.contact.country.as_deref().unwrap_or("-"),
        order.contact.company.as_deref().unwrap_or("-"),
        ticket_count
    );

    OutboundEmail {
        to: admin.to_string(),
        subject: format!("New Order - Ref: {}", order.order_ref),
        html,
        attachments: Vec::new(),
    }
}

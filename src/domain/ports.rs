use super::errors::DomainError;
use super::order::{NewOrder, Order};
use super::ticket::Ticket;

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: &NewOrder) -> Result<Order, DomainError>;

    fn find_by_ref(&self, order_ref: &str) -> Result<Option<Order>, DomainError>;

    /// Conditionally transition PENDING → PAID and record the gateway's
    /// transaction reference. Returns `true` only for the caller whose
    /// conditional write applied; everyone else observes `false` and must not
    /// run fulfillment. This is the sole concurrency gate in the system.
    fn mark_paid(&self, order_ref: &str, gateway_ref: &str) -> Result<bool, DomainError>;
}

pub trait TicketRepository: Send + Sync + 'static {
    fn insert(&self, ticket: &Ticket) -> Result<(), DomainError>;

    fn count_for_order(&self, order_ref: &str) -> Result<i64, DomainError>;

    fn find_by_code(&self, ticket_code: &str) -> Result<Option<Ticket>, DomainError>;

    /// Conditionally transition ACTIVE → USED. Returns `false` when the
    /// ticket was no longer ACTIVE, so concurrent scans cannot double-admit.
    fn mark_used(&self, ticket_code: &str) -> Result<bool, DomainError>;
}

#[derive(Debug, Clone)]
pub struct InitiatePayment {
    pub email: String,
    /// Amount in minor currency units (cents/kobo); the gateway never sees
    /// major units.
    pub amount_minor: i64,
    pub currency: String,
    pub reference: String,
    pub callback_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentVerification {
    /// Gateway-reported transaction status; "success" is the only value that
    /// advances an order.
    pub status: String,
    pub gateway_ref: String,
}

pub trait PaymentGateway: Send + Sync + 'static {
    fn initiate(&self, request: &InitiatePayment) -> Result<String, DomainError>;

    fn verify(&self, reference: &str) -> Result<PaymentVerification, DomainError>;

    /// Constant-time HMAC check over the exact raw webhook bytes. Must never
    /// be fed a re-serialized body.
    fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

pub trait Mailer: Send + Sync + 'static {
    /// Single delivery attempt; no retry or queueing at this layer.
    fn send(&self, email: &OutboundEmail) -> Result<String, DomainError>;
}

//! In-memory implementations of the ports, used as test doubles for the
//! orchestrator and handler tests. `mark_paid`/`mark_used` are atomic under a
//! mutex, mirroring the conditional-write semantics of the Diesel
//! repositories.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::{
    InitiatePayment, Mailer, OrderRepository, OutboundEmail, PaymentGateway, PaymentVerification,
    TicketRepository,
};
use crate::domain::ticket::{Ticket, TicketStatus};

use super::paystack::signature_matches;

/// Hex HMAC-SHA-512, for signing synthetic webhook bodies in tests.
pub fn hmac_hex(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: Mutex<HashMap<String, Order>>,
}

impl MemoryOrderRepository {
    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

impl OrderRepository for MemoryOrderRepository {
    fn create(&self, order: &NewOrder) -> Result<Order, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        if orders.contains_key(&order.order_ref) {
            return Err(DomainError::Internal("duplicate order_ref".into()));
        }
        let created = Order {
            order_ref: order.order_ref.clone(),
            contact: order.contact.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            status: OrderStatus::Pending,
            gateway_ref: None,
            line_items: order.line_items.clone(),
            created_at: Utc::now(),
        };
        orders.insert(order.order_ref.clone(), created.clone());
        Ok(created)
    }

    fn find_by_ref(&self, order_ref: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().get(order_ref).cloned())
    }

    fn mark_paid(&self, order_ref: &str, gateway_ref: &str) -> Result<bool, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(order_ref) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Paid;
                order.gateway_ref = Some(gateway_ref.to_string());
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryTicketRepository {
    tickets: Mutex<Vec<Ticket>>,
}

impl MemoryTicketRepository {
    pub fn all(&self) -> Vec<Ticket> {
        self.tickets.lock().unwrap().clone()
    }
}

impl TicketRepository for MemoryTicketRepository {
    fn insert(&self, ticket: &Ticket) -> Result<(), DomainError> {
        let mut tickets = self.tickets.lock().unwrap();
        if tickets.iter().any(|t| t.ticket_code == ticket.ticket_code) {
            return Err(DomainError::Internal("duplicate ticket_code".into()));
        }
        tickets.push(ticket.clone());
        Ok(())
    }

    fn count_for_order(&self, order_ref: &str) -> Result<i64, DomainError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.order_ref == order_ref)
            .count() as i64)
    }

    fn find_by_code(&self, ticket_code: &str) -> Result<Option<Ticket>, DomainError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.ticket_code == ticket_code)
            .cloned())
    }

    fn mark_used(&self, ticket_code: &str) -> Result<bool, DomainError> {
        let mut tickets = self.tickets.lock().unwrap();
        match tickets
            .iter_mut()
            .find(|t| t.ticket_code == ticket_code && t.status == TicketStatus::Active)
        {
            Some(ticket) => {
                ticket.status = TicketStatus::Used;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Scriptable gateway double. Signature verification uses the real HMAC path
/// so webhook tests exercise the production check.
pub struct FakeGateway {
    pub secret: String,
    pub verify_status: Mutex<String>,
    pub initiate_fails: AtomicBool,
    pub initiate_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub last_initiate: Mutex<Option<InitiatePayment>>,
}

impl FakeGateway {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            verify_status: Mutex::new("success".into()),
            initiate_fails: AtomicBool::new(false),
            initiate_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            last_initiate: Mutex::new(None),
        }
    }

    pub fn set_verify_status(&self, status: &str) {
        *self.verify_status.lock().unwrap() = status.to_string();
    }
}

impl PaymentGateway for FakeGateway {
    fn initiate(&self, request: &InitiatePayment) -> Result<String, DomainError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        if self.initiate_fails.load(Ordering::SeqCst) {
            return Err(DomainError::GatewayUnavailable("connection refused".into()));
        }
        *self.last_initiate.lock().unwrap() = Some(request.clone());
        Ok(format!("https://checkout.test/{}", request.reference))
    }

    fn verify(&self, reference: &str) -> Result<PaymentVerification, DomainError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentVerification {
            status: self.verify_status.lock().unwrap().clone(),
            gateway_ref: format!("PSK_{}", reference),
        })
    }

    fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        signature_matches(&self.secret, raw_body, signature)
    }
}

/// Records every send; can be told to fail for one recipient.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail_for: Mutex<Option<String>>,
}

impl FakeMailer {
    pub fn fail_deliveries_to(&self, recipient: &str) {
        *self.fail_for.lock().unwrap() = Some(recipient.to_string());
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == recipient)
            .cloned()
            .collect()
    }
}

impl Mailer for FakeMailer {
    fn send(&self, email: &OutboundEmail) -> Result<String, DomainError> {
        if self.fail_for.lock().unwrap().as_deref() == Some(email.to.as_str()) {
            return Err(DomainError::NotificationFailed(format!(
                "delivery to {} refused",
                email.to
            )));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(format!("mail_{}", self.sent.lock().unwrap().len()))
    }
}

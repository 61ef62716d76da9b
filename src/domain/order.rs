use chrono::{DateTime, Utc};

/// One-way status machine: PENDING → PAID. There is no reversal path; a
/// downstream fulfillment failure leaves the order PAID for re-drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "PAID" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

/// A purchased line at checkout time. Quantities are captured once and never
/// re-derived from the price table afterwards.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub ticket_type: String,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ContactDetails {
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_ref: String,
    pub contact: ContactDetails,
    pub amount: i64,
    pub currency: String,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub order_ref: String,
    pub contact: ContactDetails,
    pub amount: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub gateway_ref: Option<String>,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Number of seats this order bought across all line items. Fulfillment
    /// must mint exactly this many tickets, exactly once.
    pub fn seat_count(&self) -> i64 {
        self.line_items.iter().map(|l| i64::from(l.quantity)).sum()
    }

    pub fn attendee_name(&self) -> &str {
        self.contact
            .full_name
            .as_deref()
            .unwrap_or(&self.contact.email)
    }
}

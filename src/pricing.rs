use crate::domain::errors::DomainError;
use crate::domain::order::LineItem;

/// A sellable ticket category with a fixed unit price in major currency
/// units.
#[derive(Debug, Clone)]
pub struct TicketTypeDef {
    pub code: String,
    pub name: String,
    pub unit_price: i64,
}

/// Static price table. Orders snapshot prices at checkout time, so editing
/// this table never changes an already-created order's amount.
#[derive(Debug, Clone)]
pub struct PriceTable {
    types: Vec<TicketTypeDef>,
    currency: String,
}

impl PriceTable {
    pub fn new(types: Vec<TicketTypeDef>, currency: impl Into<String>) -> Self {
        Self {
            types,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn unit_price(&self, code: &str) -> Option<i64> {
        self.types.iter().find(|t| t.code == code).map(|t| t.unit_price)
    }

    /// Price the cart, rejecting unknown ticket-type codes and non-positive
    /// quantities. Returns the total in major units together with the priced
    /// line items that the order will carry from here on.
    pub fn price_items(&self, items: &[(String, i32)]) -> Result<(i64, Vec<LineItem>), DomainError> {
        if items.is_empty() {
            return Err(DomainError::InvalidInput("items must not be empty".into()));
        }
        let mut total = 0i64;
        let mut lines = Vec::with_capacity(items.len());
        for (code, qty) in items {
            if *qty < 1 {
                return Err(DomainError::InvalidInput(format!(
                    "quantity for '{}' must be at least 1",
                    code
                )));
            }
            let unit_price = self.unit_price(code).ok_or_else(|| {
                DomainError::InvalidInput(format!("unknown ticket type '{}'", code))
            })?;
            total += unit_price * i64::from(*qty);
            lines.push(LineItem {
                ticket_type: code.clone(),
                quantity: *qty,
                unit_price,
            });
        }
        Ok((total, lines))
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        PriceTable::new(
            vec![
                TicketTypeDef {
                    code: "BUSINESS".into(),
                    name: "Business Ticket".into(),
                    unit_price: 100,
                },
                TicketTypeDef {
                    code: "VIP".into(),
                    name: "VIP Ticket".into(),
                    unit_price: 3000,
                },
            ],
            "USD",
        )
    }
}

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{ContactDetails, LineItem, NewOrder, Order, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: &NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    order_ref: order.order_ref.clone(),
                    email: order.contact.email.clone(),
                    full_name: order.contact.full_name.clone(),
                    phone: order.contact.phone.clone(),
                    country: order.contact.country.clone(),
                    company: order.contact.company.clone(),
                    amount: order.amount,
                    currency: order.currency.clone(),
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .execute(conn)?;

            let new_lines: Vec<NewOrderLineRow> = order
                .line_items
                .iter()
                .map(|l| NewOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id,
                    ticket_type: l.ticket_type.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect();
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            Ok(())
        })?;

        self.find_by_ref(&order.order_ref)?
            .ok_or_else(|| DomainError::Internal("order vanished after insert".into()))
    }

    fn find_by_ref(&self, order_ref: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .filter(orders::order_ref.eq(order_ref))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = order_lines::table
            .filter(order_lines::order_id.eq(row.id))
            .order(order_lines::created_at.asc())
            .select(OrderLineRow::as_select())
            .load(&mut conn)?;

        Ok(Some(to_domain(row, lines)?))
    }

    fn mark_paid(&self, order_ref: &str, gateway_ref: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        // The conditional write: only one caller can move PENDING → PAID, and
        // only that caller is allowed to run fulfillment.
        let updated = diesel::update(
            orders::table
                .filter(orders::order_ref.eq(order_ref))
                .filter(orders::status.eq(OrderStatus::Pending.as_str())),
        )
        .set((
            orders::status.eq(OrderStatus::Paid.as_str()),
            orders::gateway_ref.eq(gateway_ref),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }
}

fn to_domain(row: OrderRow, lines: Vec<OrderLineRow>) -> Result<Order, DomainError> {
    let status = OrderStatus::parse(&row.status)
        .ok_or_else(|| DomainError::Internal(format!("unknown order status '{}'", row.status)))?;
    Ok(Order {
        order_ref: row.order_ref,
        contact: ContactDetails {
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            country: row.country,
            company: row.company,
        },
        amount: row.amount,
        currency: row.currency,
        status,
        gateway_ref: row.gateway_ref,
        line_items: lines
            .into_iter()
            .map(|l| LineItem {
                ticket_type: l.ticket_type,
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect(),
        created_at: row.created_at,
    })
}

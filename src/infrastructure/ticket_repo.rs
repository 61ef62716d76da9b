use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::TicketRepository;
use crate::domain::ticket::{Ticket, TicketStatus};
use crate::schema::tickets;

use super::models::{NewTicketRow, TicketRow};

pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TicketRepository for DieselTicketRepository {
    fn insert(&self, ticket: &Ticket) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(tickets::table)
            .values(&NewTicketRow {
                id: Uuid::new_v4(),
                order_ref: ticket.order_ref.clone(),
                ticket_code: ticket.ticket_code.clone(),
                ticket_type: ticket.ticket_type.clone(),
                attendee_name: ticket.attendee_name.clone(),
                email: ticket.email.clone(),
                qr_png: ticket.qr_png.clone(),
                status: ticket.status.as_str().to_string(),
            })
            .execute(&mut conn)?;

        Ok(())
    }

    fn count_for_order(&self, order_ref: &str) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        let count: i64 = tickets::table
            .filter(tickets::order_ref.eq(order_ref))
            .count()
            .get_result(&mut conn)?;

        Ok(count)
    }

    fn find_by_code(&self, ticket_code: &str) -> Result<Option<Ticket>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = tickets::table
            .filter(tickets::ticket_code.eq(ticket_code))
            .select(TicketRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(to_domain).transpose()
    }

    fn mark_used(&self, ticket_code: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        // Same shape as the order PAID gate: conditional on current status so
        // two concurrent scans cannot both admit.
        let updated = diesel::update(
            tickets::table
                .filter(tickets::ticket_code.eq(ticket_code))
                .filter(tickets::status.eq(TicketStatus::Active.as_str())),
        )
        .set((
            tickets::status.eq(TicketStatus::Used.as_str()),
            tickets::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }
}

fn to_domain(row: TicketRow) -> Result<Ticket, DomainError> {
    let status = TicketStatus::parse(&row.status)
        .ok_or_else(|| DomainError::Internal(format!("unknown ticket status '{}'", row.status)))?;
    Ok(Ticket {
        ticket_code: row.ticket_code,
        order_ref: row.order_ref,
        ticket_type: row.ticket_type,
        attendee_name: row.attendee_name,
        email: row.email,
        qr_png: row.qr_png,
        status,
        created_at: row.created_at,
    })
}

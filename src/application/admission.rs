use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::ports::TicketRepository;
use crate::domain::ticket::TicketStatus;

/// What the door staff sees after a successful scan.
#[derive(Debug, Clone)]
pub struct AdmissionView {
    pub ticket_code: String,
    pub ticket_type: String,
    pub attendee_name: String,
    pub email: String,
}

/// Admission-scan collaborator. Lives outside the fulfillment pipeline but
/// shares the ticket store and its ACTIVE → USED status machine.
pub struct AdmissionService {
    tickets: Arc<dyn TicketRepository>,
}

impl AdmissionService {
    pub fn new(tickets: Arc<dyn TicketRepository>) -> Self {
        Self { tickets }
    }

    /// Scan payload format: `"<ticket_code>|<email>"`. The email must match
    /// the one the ticket was minted with, and a ticket admits exactly once:
    /// the ACTIVE → USED transition is a conditional write, so concurrent
    /// scans of the same code cannot both succeed.
    pub fn scan(&self, qr_data: &str) -> Result<AdmissionView, DomainError> {
        let Some((ticket_code, email)) = qr_data.split_once('|') else {
            return Err(DomainError::InvalidInput(
                "expected scan payload '<code>|<email>'".into(),
            ));
        };

        let ticket = self
            .tickets
            .find_by_code(ticket_code)?
            .ok_or(DomainError::NotFound)?;

        if !ticket.email.eq_ignore_ascii_case(email.trim()) {
            return Err(DomainError::InvalidInput("ticket email mismatch".into()));
        }

        match ticket.status {
            TicketStatus::Used => Err(DomainError::InvalidInput("ticket already used".into())),
            TicketStatus::Void => Err(DomainError::InvalidInput("ticket is void".into())),
            TicketStatus::Active => {
                if !self.tickets.mark_used(ticket_code)? {
                    // Lost a race with another scanner.
                    return Err(DomainError::InvalidInput("ticket already used".into()));
                }
                Ok(AdmissionView {
                    ticket_code: ticket.ticket_code,
                    ticket_type: ticket.ticket_type,
                    attendee_name: ticket.attendee_name,
                    email: ticket.email,
                })
            }
        }
    }
}

use chrono::{DateTime, Utc};

/// ACTIVE → USED happens at admission scan; VOID is an operator action.
/// Neither transition is reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Active,
    Used,
    Void,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "ACTIVE",
            TicketStatus::Used => "USED",
            TicketStatus::Void => "VOID",
        }
    }

    pub fn parse(s: &str) -> Option<TicketStatus> {
        match s {
            "ACTIVE" => Some(TicketStatus::Active),
            "USED" => Some(TicketStatus::Used),
            "VOID" => Some(TicketStatus::Void),
            _ => None,
        }
    }
}

/// One admission credential. `ticket_code` doubles as the QR payload; the
/// rendered QR PNG is generated once at mint time and stored alongside.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub ticket_code: String,
    pub order_ref: String,
    pub ticket_type: String,
    pub attendee_name: String,
    pub email: String,
    pub qr_png: Vec<u8>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_representation() {
        for status in [TicketStatus::Active, TicketStatus::Used, TicketStatus::Void] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("EXPIRED"), None);
    }
}

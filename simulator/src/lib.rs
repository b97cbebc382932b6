//! In-memory ticket backend.
//!
//! Stands in for the production verification service: tickets are
//! registered with their two QR codes and walk the
//! `Valid -> Switched -> Used` lifecycle as the gate verifies them. The
//! HTTP surface lives in [`api`]; the store itself is directly usable from
//! tests.

pub mod api;
pub use api::Api;

use aboor_types::{MatchInfo, Seat, Ticket, User};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// Lifecycle of one registered ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketStatus {
    /// Issued, first code never verified.
    Valid,
    /// First code verified; awaiting the second scan.
    Switched,
    /// Admitted.
    Used,
}

#[derive(Clone, Debug)]
struct TicketEntry {
    qr1: String,
    qr2: String,
    ticket: Ticket,
    status: TicketStatus,
}

/// Outcome of one verification against the store.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Accepted(Ticket),
    NotFound,
    AlreadyUsed,
    /// Secondary code presented before the primary was verified.
    NotSwitched,
}

/// The ticket store.
#[derive(Default)]
pub struct Simulator {
    tickets: Mutex<Vec<TicketEntry>>,
    primary_calls: AtomicUsize,
    secondary_calls: AtomicUsize,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ticket under its two codes. The `user` field of `ticket`
    /// is withheld from primary responses and only revealed on admission.
    pub fn register(&self, qr1: impl Into<String>, qr2: impl Into<String>, ticket: Ticket) {
        let entry = TicketEntry {
            qr1: qr1.into(),
            qr2: qr2.into(),
            ticket,
            status: TicketStatus::Valid,
        };
        self.tickets.lock().unwrap().push(entry);
    }

    /// Seed a pair of demo tickets, returning their `(qr1, qr2)` codes.
    pub fn seed_demo(&self) -> Vec<(String, String)> {
        let fixtures = [
            ("1DEMO0001", "2DEMO0001", "T-DEMO0001", "Salem"),
            ("1DEMO0002", "2DEMO0002", "T-DEMO0002", "Noura"),
        ];
        fixtures
            .iter()
            .map(|(qr1, qr2, ticket_id, holder)| {
                let ticket = Ticket {
                    ticket_id: Some(ticket_id.to_string()),
                    match_info: Some(MatchInfo {
                        home_team: "Al Hilal".to_string(),
                        away_team: "Al Nassr".to_string(),
                    }),
                    seat: Some(Seat {
                        zone: "B".to_string(),
                        area: "12".to_string(),
                    }),
                    status: Some("valid".to_string()),
                    user: Some(User {
                        name: holder.to_string(),
                    }),
                    ..Ticket::default()
                };
                self.register(*qr1, *qr2, ticket);
                (qr1.to_string(), qr2.to_string())
            })
            .collect()
    }

    /// Verify a first-scan code: `Valid -> Switched`.
    pub fn verify_primary(&self, code: &str) -> Verdict {
        self.primary_calls.fetch_add(1, Ordering::SeqCst);
        let mut tickets = self.tickets.lock().unwrap();
        let Some(entry) = tickets.iter_mut().find(|entry| entry.qr1 == code) else {
            return Verdict::NotFound;
        };
        match entry.status {
            TicketStatus::Valid => {
                entry.status = TicketStatus::Switched;
                info!(ticket_id = entry.ticket.ticket_id.as_deref().unwrap_or(""), "primary code verified");
                let mut ticket = entry.ticket.clone();
                ticket.user = None;
                Verdict::Accepted(ticket)
            }
            TicketStatus::Switched | TicketStatus::Used => Verdict::AlreadyUsed,
        }
    }

    /// Verify a second-scan code: `Switched -> Used`.
    pub fn verify_secondary(&self, code: &str) -> Verdict {
        self.secondary_calls.fetch_add(1, Ordering::SeqCst);
        let mut tickets = self.tickets.lock().unwrap();
        let Some(entry) = tickets.iter_mut().find(|entry| entry.qr2 == code) else {
            return Verdict::NotFound;
        };
        match entry.status {
            TicketStatus::Valid => Verdict::NotSwitched,
            TicketStatus::Switched => {
                entry.status = TicketStatus::Used;
                let mut ticket = entry.ticket.clone();
                ticket.status = Some("used".to_string());
                info!(ticket_id = ticket.ticket_id.as_deref().unwrap_or(""), "ticket admitted");
                Verdict::Accepted(ticket)
            }
            TicketStatus::Used => Verdict::AlreadyUsed,
        }
    }

    pub fn status_of(&self, ticket_id: &str) -> Option<TicketStatus> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.ticket.ticket_id.as_deref() == Some(ticket_id))
            .map(|entry| entry.status)
    }

    pub fn primary_calls(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }

    pub fn secondary_calls(&self) -> usize {
        self.secondary_calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str, holder: &str) -> Ticket {
        Ticket {
            ticket_id: Some(id.to_string()),
            status: Some("valid".to_string()),
            user: Some(User {
                name: holder.to_string(),
            }),
            ..Ticket::default()
        }
    }

    #[test]
    fn lifecycle_valid_switched_used() {
        let simulator = Simulator::new();
        simulator.register("1AAA", "2BBB", ticket("T-1", "Salem"));
        assert_eq!(simulator.status_of("T-1"), Some(TicketStatus::Valid));

        let Verdict::Accepted(data) = simulator.verify_primary("1AAA") else {
            panic!("expected acceptance");
        };
        assert_eq!(simulator.status_of("T-1"), Some(TicketStatus::Switched));
        // Holder identity is withheld until admission.
        assert!(data.user.is_none());

        let Verdict::Accepted(data) = simulator.verify_secondary("2BBB") else {
            panic!("expected acceptance");
        };
        assert_eq!(simulator.status_of("T-1"), Some(TicketStatus::Used));
        assert_eq!(data.user.as_ref().unwrap().name, "Salem");
        assert_eq!(data.status.as_deref(), Some("used"));
    }

    #[test]
    fn primary_verify_transitions_exactly_once() {
        let simulator = Simulator::new();
        simulator.register("1AAA", "2BBB", ticket("T-1", "Salem"));

        assert!(matches!(simulator.verify_primary("1AAA"), Verdict::Accepted(_)));
        assert_eq!(simulator.verify_primary("1AAA"), Verdict::AlreadyUsed);
        assert_eq!(simulator.status_of("T-1"), Some(TicketStatus::Switched));
    }

    #[test]
    fn secondary_requires_switched_state() {
        let simulator = Simulator::new();
        simulator.register("1AAA", "2BBB", ticket("T-1", "Salem"));

        assert_eq!(simulator.verify_secondary("2BBB"), Verdict::NotSwitched);

        simulator.verify_primary("1AAA");
        assert!(matches!(simulator.verify_secondary("2BBB"), Verdict::Accepted(_)));
        assert_eq!(simulator.verify_secondary("2BBB"), Verdict::AlreadyUsed);
    }

    #[test]
    fn unknown_codes_are_not_found() {
        let simulator = Simulator::new();
        assert_eq!(simulator.verify_primary("NOPE"), Verdict::NotFound);
        assert_eq!(simulator.verify_secondary("NOPE"), Verdict::NotFound);
        assert_eq!(simulator.primary_calls(), 1);
        assert_eq!(simulator.secondary_calls(), 1);
    }

    #[test]
    fn seed_demo_registers_usable_tickets() {
        let simulator = Simulator::new();
        let codes = simulator.seed_demo();
        assert_eq!(codes.len(), 2);
        let (qr1, qr2) = &codes[0];
        assert!(matches!(simulator.verify_primary(qr1), Verdict::Accepted(_)));
        assert!(matches!(simulator.verify_secondary(qr2), Verdict::Accepted(_)));
    }
}

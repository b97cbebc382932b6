//! Terminal rendering of the gate session.

use aboor_gate::GateSession;
use aboor_types::Ticket;

const STEPS: [(u8, &str); 3] = [(1, "Scan QR 1"), (2, "Wait"), (3, "Scan QR 2")];

/// Three-step progress indicator, e.g. `[✔ Scan QR 1] [● Wait] [○ Scan QR 2]`.
pub fn step_line(session: &GateSession) -> String {
    let current = session.step().indicator();
    STEPS
        .iter()
        .map(|(number, label)| {
            let mark = if *number < current {
                '✔'
            } else if *number == current {
                '●'
            } else {
                '○'
            };
            format!("[{mark} {label}]")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ticket summary rows, one per known attribute.
pub fn ticket_lines(ticket: &Ticket) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "رقم التذكرة: {}",
        ticket.short_id().unwrap_or("-")
    ));
    if let Some(match_info) = &ticket.match_info {
        lines.push(format!(
            "المباراة: {} vs {}",
            match_info.home_team, match_info.away_team
        ));
    }
    if let Some(seat) = &ticket.seat {
        lines.push(format!("المقعد: {} - {}", seat.zone, seat.area));
    }
    lines.push(format!(
        "الحالة: {}",
        ticket.status.as_deref().unwrap_or("-")
    ));
    lines
}

/// Redraw the operator view after a transition.
pub fn draw(session: &GateSession) {
    println!();
    println!("{}", step_line(session));
    println!("{}", session.instruction());
    if let Some(status) = session.status() {
        if status.details.is_empty() {
            println!("{} {}", status.icon, status.message);
        } else {
            println!("{} {} - {}", status.icon, status.message, status.details);
        }
    }
    if let Some(remaining) = session.countdown() {
        println!("   {remaining}");
    }
    if let Some(raw) = session.last_scan() {
        println!("   {raw}");
    }
    if let Some(ticket) = session.ticket() {
        for line in ticket_lines(ticket) {
            println!("   {line}");
        }
    }
    if session.reset_available() {
        println!("🔄 /reset لفحص تذكرة جديدة");
    }
}

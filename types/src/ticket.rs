//! Ticket attributes returned by the verification backend.
//!
//! The backend owns this shape; the client only reads optional fields for
//! display and passes everything else through unmodified. Unknown fields are
//! preserved in `extra` so a newer backend never loses data through an older
//! scanner.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_info: Option<MatchInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub home_team: String,
    pub away_team: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub zone: String,
    pub area: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
}

impl Ticket {
    /// Overlay `other` on top of `self`, field by field at the top level.
    ///
    /// Fields present in `other` replace the current value; absent fields
    /// keep what the first scan returned. Unknown backend fields merge the
    /// same way.
    pub fn merge(&mut self, other: Ticket) {
        if other.ticket_id.is_some() {
            self.ticket_id = other.ticket_id;
        }
        if other.match_info.is_some() {
            self.match_info = other.match_info;
        }
        if other.seat.is_some() {
            self.seat = other.seat;
        }
        if other.status.is_some() {
            self.status = other.status;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        self.extra.extend(other.extra);
    }

    /// Last 8 characters of the ticket id, the form shown to operators.
    pub fn short_id(&self) -> Option<&str> {
        self.ticket_id.as_deref().map(|id| {
            // Ticket ids are ASCII, but don't split a multibyte char if one
            // ever shows up.
            let mut start = id.len().saturating_sub(8);
            while !id.is_char_boundary(start) {
                start += 1;
            }
            &id[start..]
        })
    }
}

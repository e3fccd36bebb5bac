//! Clan directory entities
//!
//! These mirror the relational rows one-to-one; the store crate maps
//! them with plain queries rather than an ORM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clan privacy mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Open,
    Closed,
    Invite,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Invite => "invite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "invite" => Some(Self::Invite),
            _ => None,
        }
    }
}

impl Default for Privacy {
    fn default() -> Self {
        Self::Open
    }
}

/// A clan record. `name` is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clan {
    pub name: String,
    pub founder: String,
    pub leader: String,
    pub money: f64,
    pub privacy: Privacy,
}

impl Clan {
    /// New clan with the founder as leader, empty treasury, open doors.
    pub fn new(name: impl Into<String>, founder: impl Into<String>) -> Self {
        let founder = founder.into();
        Self {
            name: name.into(),
            leader: founder.clone(),
            founder,
            money: 0.0,
            privacy: Privacy::Open,
        }
    }
}

/// Membership of a player in a clan. Composite key (clan, username);
/// a player belongs to at most one clan, enforced by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub clan: String,
    pub username: String,
}

/// Confirmed alliance between two clans.
///
/// Undirected relationship stored as an ordered pair; callers must not
/// store both orderings for the same pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alliance {
    pub clan1: String,
    pub clan2: String,
    pub friendly_fire: bool,
}

/// Unconfirmed alliance proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAlliance {
    pub requester: String,
    pub target: String,
}

/// A clan name barred from (re-)registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedClan {
    pub name: String,
    pub reason: String,
}

/// Append-only report filed against a clan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub clan: String,
    pub reason: String,
}

/// Per-player economy balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBalance {
    pub player: String,
    pub balance: f64,
}

/// One step in a player's clan history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub clan: String,
    pub joined_at: DateTime<Utc>,
}

/// A player's last-known display name, current clan, and full history.
/// One row per player; the history only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerClanHistory {
    pub uuid: String,
    pub name: Option<String>,
    pub current_clan: Option<String>,
    pub history: Vec<HistoryEntry>,
}

/// An outstanding invitation of a player into a clan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClanInvite {
    pub clan: String,
    pub username: String,
    pub invited_at: DateTime<Utc>,
}

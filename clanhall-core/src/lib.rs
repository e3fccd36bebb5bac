//! Domain types for the clanhall directory.
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod clan;
pub mod config;
pub mod name;
pub mod validation;

pub use clan::{
    Alliance, BannedClan, Clan, ClanInvite, HistoryEntry, Membership, PendingAlliance,
    PlayerBalance, PlayerClanHistory, Privacy, Report,
};
pub use config::{CacheConfig, DatabaseConfig, StorageConfig};
pub use name::ClanName;
pub use validation::ValidationError;

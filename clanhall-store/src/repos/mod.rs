//! Repositories over the clan directory tables
//!
//! One repository per entity, all borrowing the shared pool. Queries are
//! plain sqlx with explicit binds; conflicts are handled in SQL
//! (ON CONFLICT), never check-then-insert.

pub mod alliances;
pub mod bans;
pub mod clans;
pub mod economy;
pub mod history;
pub mod invites;
pub mod members;
pub mod reports;

pub use alliances::AllianceRepo;
pub use bans::BanRepo;
pub use clans::ClanRepo;
pub use economy::EconomyRepo;
pub use history::HistoryRepo;
pub use invites::InviteRepo;
pub use members::MemberRepo;
pub use reports::ReportRepo;

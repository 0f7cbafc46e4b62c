//! Wire types for the club dashboard REST contract.
//!
//! Field names follow the backend verbatim. Every endpoint has exactly one
//! response type in [`envelope`]; nothing downstream of the client should
//! ever look at raw JSON.

mod club;
mod dates;
pub mod envelope;
mod event;
mod finance;
mod member;
mod officer;
mod sponsor;

pub use club::*;
pub use dates::LenientDate;
pub use event::*;
pub use finance::*;
pub use member::*;
pub use officer::*;
pub use sponsor::*;

pub type ClubId = i64;
pub type EventId = i64;
pub type AttendanceId = i64;
pub type RoleId = i64;
pub type SponsorshipId = i64;
pub type ExpenseId = i64;
pub type StudentId = String;

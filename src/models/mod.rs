//! Record types for the campus and league domains
//!
//! Plain value records produced by the importers and consumed by the loader.
//! Labels that point at other entities (a student's major, an enrollment's
//! section code) are kept as text here; the loader resolves them to
//! surrogate ids.

pub mod association;
pub mod league;
pub mod offering;
pub mod organization;
pub mod person;

pub use association::{Enrollment, PersonRef, SectionEntry};
pub use league::{Address, Player, Team};
pub use offering::Course;
pub use organization::{Department, Location, Major, Semester};
pub use person::{Faculty, Student};

//! Domain primitives, permission rules, ports, and services.
//!
//! Everything here is transport agnostic: entities carry their invariants,
//! the permission predicates are pure functions, and the services speak only
//! to ports. The HTTP adapter in `inbound::http` and the PostgreSQL adapters
//! in `outbound::persistence` plug into this module from the outside.

pub mod error;
pub mod event;
pub mod event_service;
pub mod permissions;
pub mod ports;
pub mod profile_service;
pub mod review;
pub mod rsvp;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::event::{Event, EventDraft, EventId, EventPatch, EventValidationError};
pub use self::event_service::EventService;
pub use self::profile_service::ProfileService;
pub use self::review::{Rating, RatingOutOfRange, Review};
pub use self::rsvp::{InvalidRsvpStatus, Rsvp, RsvpStatus};
pub use self::user::{User, UserId, UserProfile, UserValidationError, Username};

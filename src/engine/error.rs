use ulid::Ulid;

use crate::model::BookingStatus;

/// Why a requested interval cannot be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// A manager override marks the interval unavailable.
    BlockedBySchedule(Ulid),
    /// A pending or confirmed booking occupies the interval.
    OverlapsBooking(Ulid),
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::BlockedBySchedule(_) => "blocked_by_schedule",
            ConflictReason::OverlapsBooking(_) => "overlaps_booking",
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    NotFound(Ulid),
    AlreadyExists(Ulid),
    Validation(&'static str),
    SlotConflict { reason: ConflictReason },
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    FieldInactive(Ulid),
    HasActiveBookings(Ulid),
    LimitExceeded(&'static str),
    WalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::Validation(msg) => write!(f, "validation: {msg}"),
            EngineError::SlotConflict { reason } => match reason {
                ConflictReason::BlockedBySchedule(id) => {
                    write!(f, "slot conflict: blocked_by_schedule (override {id})")
                }
                ConflictReason::OverlapsBooking(id) => {
                    write!(f, "slot conflict: overlaps_booking (booking {id})")
                }
            },
            EngineError::InvalidTransition { from, to } => {
                write!(
                    f,
                    "invalid transition: {} -> {}",
                    from.as_str(),
                    to.as_str()
                )
            }
            EngineError::FieldInactive(id) => write!(f, "field inactive: {id}"),
            EngineError::HasActiveBookings(id) => {
                write!(f, "cannot delete field {id}: active bookings exist")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

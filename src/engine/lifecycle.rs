//! Booking state machine. `Pending` is the initial state; `Rejected`,
//! `Cancelled`, and `Completed` are terminal and accept nothing — including a
//! resubmission of the transition that got there.

use crate::limits::MAX_REASON_LEN;
use crate::model::{ActorRole, BookingStatus};

use super::EngineError;

pub(crate) fn validate_transition(
    from: BookingStatus,
    to: BookingStatus,
    actor: ActorRole,
    reason: Option<&str>,
) -> Result<(), EngineError> {
    use crate::model::ActorRole::*;
    use crate::model::BookingStatus::*;

    let (allowed, reason_required): (&[ActorRole], bool) = match (from, to) {
        (Pending, Confirmed) => (&[Manager], false),
        (Pending, Rejected) => (&[Manager], true),
        (Pending, Cancelled) => (&[Customer, Manager], false),
        (Confirmed, Completed) => (&[Manager], false),
        (Confirmed, Cancelled) => (&[Customer, Manager], true),
        _ => return Err(EngineError::InvalidTransition { from, to }),
    };

    if !allowed.contains(&actor) {
        return Err(EngineError::Validation(
            "transition not permitted for actor",
        ));
    }
    if let Some(r) = reason
        && r.len() > MAX_REASON_LEN {
            return Err(EngineError::LimitExceeded("reason too long"));
        }
    if reason_required && reason.is_none() {
        return Err(EngineError::Validation("reason required"));
    }
    Ok(())
}

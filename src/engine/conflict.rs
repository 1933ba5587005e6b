use crate::limits::*;
use crate::model::*;

use super::error::ConflictReason;
use super::EngineError;

pub(crate) fn validate_span(start: Ms, end: Ms) -> Result<Span, EngineError> {
    if start >= end {
        return Err(EngineError::Validation("span start must precede end"));
    }
    if start < MIN_VALID_TIMESTAMP_MS || end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    if end - start > MAX_SPAN_DURATION_MS {
        return Err(EngineError::LimitExceeded("span too wide"));
    }
    Ok(Span::new(start, end))
}

pub(crate) fn validate_price(price: i64) -> Result<(), EngineError> {
    if price <= 0 {
        return Err(EngineError::Validation("price must be positive"));
    }
    Ok(())
}

/// The conflict guard. Runs on the read path and, under the field write lock,
/// immediately before every booking insert. Check order is part of the
/// contract: a blocking override is reported before a booking overlap.
pub(crate) fn check_slot_free(fs: &FieldState, span: &Span) -> Result<(), EngineError> {
    if let Some(ov) = fs.overrides_overlapping(span).find(|o| !o.available) {
        return Err(EngineError::SlotConflict {
            reason: ConflictReason::BlockedBySchedule(ov.id),
        });
    }
    if let Some(b) = fs.active_overlapping(span).next() {
        return Err(EngineError::SlotConflict {
            reason: ConflictReason::OverlapsBooking(b.id),
        });
    }
    Ok(())
}

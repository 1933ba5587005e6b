use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::shifts::DAY_MS;

use super::availability;
use super::conflict::{check_slot_free, validate_span};
use super::error::ConflictReason;
use super::{Engine, EngineError};

impl Engine {
    /// One calendar day of a field as ordered, annotated slots. Read lock only;
    /// a booking committed a moment ago may be missed here but never by the
    /// write-path guard.
    pub async fn resolve_day(
        &self,
        field_id: Ulid,
        day_start: Ms,
    ) -> Result<Vec<SlotView>, EngineError> {
        if day_start < MIN_VALID_TIMESTAMP_MS || day_start > MAX_VALID_TIMESTAMP_MS - DAY_MS {
            return Err(EngineError::LimitExceeded("timestamp out of range"));
        }
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let guard = fs.read().await;
        Ok(availability::resolve_day(&guard, day_start))
    }

    /// Read-only probe of the conflict guard: `None` means the span is free.
    pub async fn check_availability(
        &self,
        field_id: Ulid,
        start: Ms,
        end: Ms,
    ) -> Result<Option<ConflictReason>, EngineError> {
        let span = validate_span(start, end)?;
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let guard = fs.read().await;
        match check_slot_free(&guard, &span) {
            Ok(()) => Ok(None),
            Err(EngineError::SlotConflict { reason }) => Ok(Some(reason)),
            Err(e) => Err(e),
        }
    }

    pub async fn list_fields(&self) -> Vec<FieldInfo> {
        let mut fields = Vec::new();
        for id in self.store.field_ids() {
            let Some(fs) = self.store.get_field(&id) else {
                continue;
            };
            let guard = fs.read().await;
            fields.push(FieldInfo {
                id: guard.id,
                name: guard.name.clone(),
                location: guard.location.clone(),
                status: guard.status,
                manager_id: guard.manager_id,
                base_price: guard.base_price,
            });
        }
        fields.sort_by_key(|f| f.id);
        fields
    }

    pub async fn get_bookings(&self, field_id: Ulid) -> Result<Vec<BookingInfo>, EngineError> {
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let guard = fs.read().await;
        Ok(guard
            .bookings
            .iter()
            .map(|b| booking_info(field_id, b))
            .collect())
    }

    pub async fn get_booking(&self, id: Ulid) -> Result<BookingInfo, EngineError> {
        let field_id = self
            .field_for_entity(&id)
            .ok_or(EngineError::NotFound(id))?;
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let guard = fs.read().await;
        guard
            .booking(id)
            .map(|b| booking_info(field_id, b))
            .ok_or(EngineError::NotFound(id))
    }

    pub async fn get_overrides(&self, field_id: Ulid) -> Result<Vec<OverrideInfo>, EngineError> {
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let guard = fs.read().await;
        Ok(guard
            .overrides
            .iter()
            .map(|o| OverrideInfo {
                id: o.id,
                field_id,
                start: o.span.start,
                end: o.span.end,
                available: o.available,
            })
            .collect())
    }
}

fn booking_info(field_id: Ulid, b: &Booking) -> BookingInfo {
    BookingInfo {
        id: b.id,
        field_id,
        customer_id: b.customer_id,
        start: b.span.start,
        end: b.span.end,
        status: b.status,
        price: b.price,
        note: b.note.clone(),
        actioned_by: b.actioned_by,
        reason: b.reason.clone(),
    }
}

use dashmap::DashMap;
use ulid::Ulid;

use crate::model::*;

use super::SharedFieldState;

/// Shared field map plus the booking/override → field index. The engine owns
/// exactly one of these per tenant; all event application funnels through it.
pub struct FieldStore {
    fields: DashMap<Ulid, SharedFieldState>,
    entity_to_field: DashMap<Ulid, Ulid>,
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldStore {
    pub fn new() -> Self {
        Self {
            fields: DashMap::new(),
            entity_to_field: DashMap::new(),
        }
    }

    // ── Field map ────────────────────────────────────────────

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn contains_field(&self, id: &Ulid) -> bool {
        self.fields.contains_key(id)
    }

    pub fn get_field(&self, id: &Ulid) -> Option<SharedFieldState> {
        self.fields.get(id).map(|e| e.value().clone())
    }

    pub fn insert_field(&self, id: Ulid, state: SharedFieldState) {
        self.fields.insert(id, state);
    }

    pub fn remove_field(&self, id: &Ulid) -> Option<(Ulid, SharedFieldState)> {
        self.fields.remove(id)
    }

    pub fn field_ids(&self) -> Vec<Ulid> {
        self.fields.iter().map(|e| *e.key()).collect()
    }

    // ── Entity index ─────────────────────────────────────────

    pub fn field_for_entity(&self, entity_id: &Ulid) -> Option<Ulid> {
        self.entity_to_field.get(entity_id).map(|e| *e.value())
    }

    pub fn map_entity(&self, entity_id: Ulid, field_id: Ulid) {
        self.entity_to_field.insert(entity_id, field_id);
    }

    pub fn unmap_entity(&self, entity_id: &Ulid) {
        self.entity_to_field.remove(entity_id);
    }

    // ── Event application ────────────────────────────────────

    /// Apply an event to a FieldState (no locking — caller holds the lock).
    /// Field create/delete are handled at the map level, not here.
    pub fn apply_event(&self, fs: &mut FieldState, event: &Event) {
        match event {
            Event::OverrideSet {
                id,
                field_id,
                span,
                available,
            } => {
                // Set semantics: same id replaces the previous record.
                fs.remove_override(*id);
                fs.insert_override(ScheduleOverride {
                    id: *id,
                    span: *span,
                    available: *available,
                });
                self.map_entity(*id, *field_id);
            }
            Event::OverrideRemoved { id, .. } => {
                fs.remove_override(*id);
                self.unmap_entity(id);
            }
            Event::BookingCreated {
                id,
                field_id,
                customer_id,
                span,
                price,
                note,
            } => {
                fs.insert_booking(Booking {
                    id: *id,
                    customer_id: *customer_id,
                    span: *span,
                    status: BookingStatus::Pending,
                    price: *price,
                    note: note.clone(),
                    actioned_by: None,
                    reason: None,
                });
                self.map_entity(*id, *field_id);
            }
            Event::BookingTransitioned {
                id,
                status,
                actioned_by,
                reason,
                ..
            } => {
                if let Some(b) = fs.booking_mut(*id) {
                    b.status = *status;
                    b.actioned_by = *actioned_by;
                    b.reason = reason.clone();
                }
            }
            Event::FieldUpdated {
                name,
                location,
                status,
                base_price,
                ..
            } => {
                fs.name = name.clone();
                fs.location = location.clone();
                fs.status = *status;
                fs.base_price = *base_price;
            }
            Event::FieldCreated { .. } | Event::FieldDeleted { .. } => {}
        }
    }
}

use std::sync::Arc;

use tokio::sync::{oneshot, RwLock};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::conflict::{check_slot_free, validate_price, validate_span};
use super::lifecycle::validate_transition;
use super::{Engine, EngineError, WalCommand};

impl Engine {
    pub async fn create_field(
        &self,
        id: Ulid,
        name: String,
        location: Option<String>,
        manager_id: Ulid,
        base_price: i64,
    ) -> Result<(), EngineError> {
        if self.store.field_count() >= MAX_FIELDS_PER_TENANT {
            return Err(EngineError::LimitExceeded("too many fields"));
        }
        if name.is_empty() {
            return Err(EngineError::Validation("field name required"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("field name too long"));
        }
        if let Some(ref l) = location
            && l.len() > MAX_LOCATION_LEN {
                return Err(EngineError::LimitExceeded("location too long"));
            }
        validate_price(base_price)?;
        if self.store.contains_field(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        let event = Event::FieldCreated {
            id,
            name: name.clone(),
            location: location.clone(),
            manager_id,
            base_price,
        };
        self.wal_append(&event).await?;
        let fs = FieldState::new(id, name, location, manager_id, base_price);
        self.store.insert_field(id, Arc::new(RwLock::new(fs)));
        self.notify.send(id, &event);
        Ok(())
    }

    /// Partial update: unset parameters keep their current value. The emitted
    /// event always carries the full post-update state.
    pub async fn update_field(
        &self,
        id: Ulid,
        name: Option<String>,
        location: Option<String>,
        status: Option<FieldStatus>,
        base_price: Option<i64>,
    ) -> Result<(), EngineError> {
        if let Some(ref n) = name {
            if n.is_empty() {
                return Err(EngineError::Validation("field name required"));
            }
            if n.len() > MAX_NAME_LEN {
                return Err(EngineError::LimitExceeded("field name too long"));
            }
        }
        if let Some(ref l) = location
            && l.len() > MAX_LOCATION_LEN {
                return Err(EngineError::LimitExceeded("location too long"));
            }
        if let Some(p) = base_price {
            validate_price(p)?;
        }
        let fs = self.get_field(&id).ok_or(EngineError::NotFound(id))?;
        let mut guard = fs.write().await;

        let event = Event::FieldUpdated {
            id,
            name: name.unwrap_or_else(|| guard.name.clone()),
            location: location.or_else(|| guard.location.clone()),
            status: status.unwrap_or(guard.status),
            base_price: base_price.unwrap_or(guard.base_price),
        };
        self.persist_and_apply(id, &mut guard, &event).await
    }

    /// A field is never deleted out from under an active booking; history-only
    /// fields go away together with their records.
    pub async fn delete_field(&self, id: Ulid) -> Result<(), EngineError> {
        let fs = self.get_field(&id).ok_or(EngineError::NotFound(id))?;
        let guard = fs.write().await;
        if guard.has_active_bookings() {
            return Err(EngineError::HasActiveBookings(id));
        }
        let entity_ids: Vec<Ulid> = guard
            .bookings
            .iter()
            .map(|b| b.id)
            .chain(guard.overrides.iter().map(|o| o.id))
            .collect();

        let event = Event::FieldDeleted { id };
        self.wal_append(&event).await?;
        self.store.remove_field(&id);
        for eid in &entity_ids {
            self.store.unmap_entity(eid);
        }
        drop(guard);
        self.notify.send(id, &event);
        Ok(())
    }

    /// Create or replace a schedule override. Advisory against bookings that
    /// already exist: no conflict check here, the guard runs at booking time.
    pub async fn set_override(
        &self,
        id: Ulid,
        field_id: Ulid,
        start: Ms,
        end: Ms,
        available: bool,
    ) -> Result<(), EngineError> {
        let span = validate_span(start, end)?;
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let mut guard = fs.write().await;
        let replacing = guard.overrides.iter().any(|o| o.id == id);
        if !replacing && guard.overrides.len() >= MAX_OVERRIDES_PER_FIELD {
            return Err(EngineError::LimitExceeded("too many overrides on field"));
        }

        let event = Event::OverrideSet {
            id,
            field_id,
            span,
            available,
        };
        self.persist_and_apply(field_id, &mut guard, &event).await
    }

    pub async fn remove_override(&self, id: Ulid) -> Result<Ulid, EngineError> {
        let (field_id, mut guard) = self.resolve_entity_write(&id).await?;
        if !guard.overrides.iter().any(|o| o.id == id) {
            return Err(EngineError::NotFound(id));
        }
        let event = Event::OverrideRemoved { id, field_id };
        self.persist_and_apply(field_id, &mut guard, &event).await?;
        Ok(field_id)
    }

    /// The atomic check-and-reserve. The field write lock is held across the
    /// conflict check, the WAL append, and the in-memory insert, so two
    /// concurrent requests for overlapping spans cannot both pass the guard.
    /// The booking is born `Pending`.
    pub async fn create_booking(
        &self,
        id: Ulid,
        field_id: Ulid,
        customer_id: Ulid,
        start: Ms,
        end: Ms,
        price: i64,
        note: Option<String>,
    ) -> Result<(), EngineError> {
        let span = validate_span(start, end)?;
        validate_price(price)?;
        if let Some(ref n) = note
            && n.len() > MAX_NOTE_LEN {
                return Err(EngineError::LimitExceeded("note too long"));
            }
        let fs = self
            .get_field(&field_id)
            .ok_or(EngineError::NotFound(field_id))?;
        let mut guard = fs.write().await;
        if guard.status != FieldStatus::Active {
            return Err(EngineError::FieldInactive(field_id));
        }
        if guard.bookings.len() >= MAX_BOOKINGS_PER_FIELD {
            return Err(EngineError::LimitExceeded("too many bookings on field"));
        }
        if self.field_for_entity(&id).is_some() {
            return Err(EngineError::AlreadyExists(id));
        }

        if let Err(e) = check_slot_free(&guard, &span) {
            if let EngineError::SlotConflict { reason } = &e {
                metrics::counter!(
                    crate::observability::SLOT_CONFLICTS_TOTAL,
                    "reason" => reason.as_str()
                )
                .increment(1);
            }
            return Err(e);
        }

        let event = Event::BookingCreated {
            id,
            field_id,
            customer_id,
            span,
            price,
            note,
        };
        self.persist_and_apply(field_id, &mut guard, &event).await
    }

    /// Drive a lifecycle transition. Illegal pairs, wrong actors, and missing
    /// reasons are rejected before anything is persisted.
    pub async fn transition_booking(
        &self,
        id: Ulid,
        actor: ActorRole,
        target: BookingStatus,
        actioned_by: Option<Ulid>,
        reason: Option<String>,
    ) -> Result<Ulid, EngineError> {
        let (field_id, mut guard) = self.resolve_entity_write(&id).await?;
        let booking = guard.booking(id).ok_or(EngineError::NotFound(id))?;
        validate_transition(booking.status, target, actor, reason.as_deref())?;

        let event = Event::BookingTransitioned {
            id,
            field_id,
            status: target,
            actioned_by,
            reason,
        };
        self.persist_and_apply(field_id, &mut guard, &event).await?;
        Ok(field_id)
    }

    /// Compact the WAL by rewriting it with only the events needed to recreate
    /// the current state. Terminal bookings survive as create + transition so
    /// history outlives compaction.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let mut events = Vec::new();

        for id in self.store.field_ids() {
            let Some(fs_arc) = self.store.get_field(&id) else {
                continue;
            };
            let guard = fs_arc.read().await;

            events.push(Event::FieldCreated {
                id: guard.id,
                name: guard.name.clone(),
                location: guard.location.clone(),
                manager_id: guard.manager_id,
                base_price: guard.base_price,
            });
            if guard.status != FieldStatus::Active {
                events.push(Event::FieldUpdated {
                    id: guard.id,
                    name: guard.name.clone(),
                    location: guard.location.clone(),
                    status: guard.status,
                    base_price: guard.base_price,
                });
            }
            for ov in &guard.overrides {
                events.push(Event::OverrideSet {
                    id: ov.id,
                    field_id: guard.id,
                    span: ov.span,
                    available: ov.available,
                });
            }
            for b in &guard.bookings {
                events.push(Event::BookingCreated {
                    id: b.id,
                    field_id: guard.id,
                    customer_id: b.customer_id,
                    span: b.span,
                    price: b.price,
                    note: b.note.clone(),
                });
                if b.status != BookingStatus::Pending {
                    events.push(Event::BookingTransitioned {
                        id: b.id,
                        field_id: guard.id,
                        status: b.status,
                        actioned_by: b.actioned_by,
                        reason: b.reason.clone(),
                    });
                }
            }
        }

        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact {
                events,
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

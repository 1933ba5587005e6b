use crate::model::*;
use crate::shifts::{self, DAY_MS, H};

// ── Day resolution ────────────────────────────────────────────────

/// Resolve one calendar day of a field into ordered slots.
///
/// Slot skeleton: the field's schedule overrides win over the default shift
/// catalog — if any override intersects the day, each override interval is one
/// slot; otherwise one slot per catalog entry. Active bookings then mark slots
/// unavailable; a partial overlap blocks the whole slot, no splitting.
///
/// `day_start` is supplied by the caller (midnight UTC of the requested day).
/// No ambient clock is read, so identical inputs resolve identically.
pub fn resolve_day(fs: &FieldState, day_start: Ms) -> Vec<SlotView> {
    let day = Span::new(day_start, day_start + DAY_MS);

    let mut slots: Vec<SlotView> = Vec::new();
    let mut has_overrides = false;
    for ov in fs.overrides_overlapping(&day) {
        has_overrides = true;
        slots.push(SlotView {
            span: ov.span,
            label: shifts::label_for(ov.span.start),
            price: slot_price(fs.base_price, shifts::multiplier_for(ov.span.start), &ov.span),
            is_available: ov.available,
            occupied_by: None,
        });
    }
    if !has_overrides {
        for (span, shift) in shifts::slot_spans(day_start) {
            slots.push(SlotView {
                span,
                label: shift.label,
                price: slot_price(fs.base_price, shift.price_multiplier, &span),
                is_available: true,
                occupied_by: None,
            });
        }
    }

    let active: Vec<&Booking> = fs.active_overlapping(&day).collect();
    for slot in &mut slots {
        if let Some(b) = active.iter().find(|b| b.span.overlaps(&slot.span)) {
            slot.is_available = false;
            slot.occupied_by = Some(b.id);
        }
    }

    // An inactive field still renders its day, but nothing is bookable.
    if fs.status == FieldStatus::Inactive {
        for slot in &mut slots {
            slot.is_available = false;
        }
    }

    slots.sort_by_key(|s| (s.span.start, s.span.end));
    slots
}

/// Slot price in minor units, rounded up.
pub fn slot_price(base_price: i64, multiplier: f64, span: &Span) -> i64 {
    let hours = span.duration_ms() as f64 / H as f64;
    (base_price as f64 * multiplier * hours).ceil() as i64
}

//! Static shift catalog: the default partition of a day into labeled,
//! price-weighted slots. Field-specific schedule overrides take precedence
//! over this catalog at slot generation (see `engine::availability`).

use crate::model::{Ms, Span};

pub const H: Ms = 3_600_000;
pub const DAY_MS: Ms = 24 * H;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shift {
    pub start_hour: u8,
    pub end_hour: u8,
    pub label: &'static str,
    pub price_multiplier: f64,
}

/// Ordered by start_hour, gap-free over 06:00–22:00 UTC.
pub const SHIFTS: [Shift; 6] = [
    Shift { start_hour: 6, end_hour: 8, label: "early_morning", price_multiplier: 0.8 },
    Shift { start_hour: 8, end_hour: 11, label: "morning", price_multiplier: 1.0 },
    Shift { start_hour: 11, end_hour: 14, label: "midday", price_multiplier: 1.0 },
    Shift { start_hour: 14, end_hour: 17, label: "afternoon", price_multiplier: 1.1 },
    Shift { start_hour: 17, end_hour: 20, label: "evening", price_multiplier: 1.5 },
    Shift { start_hour: 20, end_hour: 22, label: "night", price_multiplier: 1.3 },
];

/// Hours outside the catalog (22:00–06:00) fall here.
pub const DEFAULT_LABEL: &str = "other";
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

fn hour_of_day(ts: Ms) -> u8 {
    (ts.rem_euclid(DAY_MS) / H) as u8
}

/// The shift containing the hour this timestamp falls into, if any.
pub fn shift_for(ts: Ms) -> Option<&'static Shift> {
    let hour = hour_of_day(ts);
    SHIFTS
        .iter()
        .find(|s| s.start_hour <= hour && hour < s.end_hour)
}

pub fn label_for(ts: Ms) -> &'static str {
    shift_for(ts).map_or(DEFAULT_LABEL, |s| s.label)
}

pub fn multiplier_for(ts: Ms) -> f64 {
    shift_for(ts).map_or(DEFAULT_MULTIPLIER, |s| s.price_multiplier)
}

/// One span per catalog entry, anchored at the given day start
/// (expected to be midnight UTC of the day being resolved).
pub fn slot_spans(day_start: Ms) -> Vec<(Span, &'static Shift)> {
    SHIFTS
        .iter()
        .map(|s| {
            (
                Span::new(
                    day_start + Ms::from(s.start_hour) * H,
                    day_start + Ms::from(s.end_hour) * H,
                ),
                s,
            )
        })
        .collect()
}

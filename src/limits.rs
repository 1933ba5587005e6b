//! Hard limits. Everything a client can grow is bounded.

use crate::model::Ms;

pub const MAX_TENANTS: usize = 64;
pub const MAX_TENANT_NAME_LEN: usize = 256;

pub const MAX_FIELDS_PER_TENANT: usize = 4096;
pub const MAX_BOOKINGS_PER_FIELD: usize = 65_536;
pub const MAX_OVERRIDES_PER_FIELD: usize = 4096;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_LOCATION_LEN: usize = 512;
pub const MAX_NOTE_LEN: usize = 1024;
pub const MAX_REASON_LEN: usize = 1024;

/// 1970-01-01. Negative timestamps are always a client bug.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
/// 2100-01-01. Far enough for any real reservation.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// A single booking or override span may not exceed 7 days.
pub const MAX_SPAN_DURATION_MS: Ms = 7 * 24 * 3_600_000;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// The one conflict predicate. Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

/// Booking lifecycle states. `Pending` and `Confirmed` occupy their slot;
/// the rest are history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

/// Who is driving a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Customer,
    Manager,
}

impl ActorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorRole::Customer => "customer",
            ActorRole::Manager => "manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(ActorRole::Customer),
            "manager" => Some(ActorRole::Manager),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldStatus {
    Active,
    Inactive,
}

impl FieldStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldStatus::Active => "active",
            FieldStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(FieldStatus::Active),
            "inactive" => Some(FieldStatus::Inactive),
            _ => None,
        }
    }
}

/// A reservation on a field. The span is fixed at creation; only status and the
/// transition audit fields ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub customer_id: Ulid,
    pub span: Span,
    pub status: BookingStatus,
    /// Minor currency units, > 0.
    pub price: i64,
    pub note: Option<String>,
    /// Manager who drove the last transition, if any.
    pub actioned_by: Option<Ulid>,
    /// Rejection or cancellation reason.
    pub reason: Option<String>,
}

/// Manager-defined interval marking a field available or blocked regardless of
/// bookings (maintenance, block-out). Advisory against bookings that already
/// exist; binding for future ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub id: Ulid,
    pub span: Span,
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct FieldState {
    pub id: Ulid,
    pub name: String,
    pub location: Option<String>,
    pub status: FieldStatus,
    pub manager_id: Ulid,
    /// Price per hour in minor currency units.
    pub base_price: i64,
    /// Sorted by `span.start`.
    pub overrides: Vec<ScheduleOverride>,
    /// Sorted by `span.start`. All statuses retained, active or not.
    pub bookings: Vec<Booking>,
}

impl FieldState {
    pub fn new(
        id: Ulid,
        name: String,
        location: Option<String>,
        manager_id: Ulid,
        base_price: i64,
    ) -> Self {
        Self {
            id,
            name,
            location,
            status: FieldStatus::Active,
            manager_id,
            base_price,
            overrides: Vec::new(),
            bookings: Vec::new(),
        }
    }

    /// Insert booking maintaining sort order by span.start.
    pub fn insert_booking(&mut self, booking: Booking) {
        let pos = self
            .bookings
            .binary_search_by_key(&booking.span.start, |b| b.span.start)
            .unwrap_or_else(|e| e);
        self.bookings.insert(pos, booking);
    }

    pub fn booking(&self, id: Ulid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn booking_mut(&mut self, id: Ulid) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|b| b.id == id)
    }

    /// Bookings whose span overlaps the query window, any status.
    /// Binary search skips bookings starting at or after `query.end`.
    pub fn bookings_overlapping(&self, query: &Span) -> impl Iterator<Item = &Booking> {
        let right_bound = self
            .bookings
            .partition_point(|b| b.span.start < query.end);
        self.bookings[..right_bound]
            .iter()
            .filter(move |b| b.span.end > query.start)
    }

    /// Active (pending/confirmed) bookings overlapping the query window.
    pub fn active_overlapping(&self, query: &Span) -> impl Iterator<Item = &Booking> {
        self.bookings_overlapping(query)
            .filter(|b| b.status.is_active())
    }

    pub fn has_active_bookings(&self) -> bool {
        self.bookings.iter().any(|b| b.status.is_active())
    }

    /// Insert override maintaining sort order by span.start.
    pub fn insert_override(&mut self, ov: ScheduleOverride) {
        let pos = self
            .overrides
            .binary_search_by_key(&ov.span.start, |o| o.span.start)
            .unwrap_or_else(|e| e);
        self.overrides.insert(pos, ov);
    }

    pub fn remove_override(&mut self, id: Ulid) -> Option<ScheduleOverride> {
        if let Some(pos) = self.overrides.iter().position(|o| o.id == id) {
            Some(self.overrides.remove(pos))
        } else {
            None
        }
    }

    /// Overrides whose span overlaps the query window.
    pub fn overrides_overlapping(&self, query: &Span) -> impl Iterator<Item = &ScheduleOverride> {
        let right_bound = self
            .overrides
            .partition_point(|o| o.span.start < query.end);
        self.overrides[..right_bound]
            .iter()
            .filter(move |o| o.span.end > query.start)
    }
}

/// The event types — flat, no nesting. This is the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    FieldCreated {
        id: Ulid,
        name: String,
        location: Option<String>,
        manager_id: Ulid,
        base_price: i64,
    },
    FieldUpdated {
        id: Ulid,
        name: String,
        location: Option<String>,
        status: FieldStatus,
        base_price: i64,
    },
    FieldDeleted {
        id: Ulid,
    },
    OverrideSet {
        id: Ulid,
        field_id: Ulid,
        span: Span,
        available: bool,
    },
    OverrideRemoved {
        id: Ulid,
        field_id: Ulid,
    },
    /// A booking is born `Pending`.
    BookingCreated {
        id: Ulid,
        field_id: Ulid,
        customer_id: Ulid,
        span: Span,
        price: i64,
        note: Option<String>,
    },
    BookingTransitioned {
        id: Ulid,
        field_id: Ulid,
        status: BookingStatus,
        actioned_by: Option<Ulid>,
        reason: Option<String>,
    },
}

/// Extract the field id from an event (None for field create/delete, which are
/// handled at the map level).
pub fn event_field_id(event: &Event) -> Option<Ulid> {
    match event {
        Event::OverrideSet { field_id, .. }
        | Event::OverrideRemoved { field_id, .. }
        | Event::BookingCreated { field_id, .. }
        | Event::BookingTransitioned { field_id, .. } => Some(*field_id),
        Event::FieldUpdated { id, .. } => Some(*id),
        Event::FieldCreated { .. } | Event::FieldDeleted { .. } => None,
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub id: Ulid,
    pub name: String,
    pub location: Option<String>,
    pub status: FieldStatus,
    pub manager_id: Ulid,
    pub base_price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingInfo {
    pub id: Ulid,
    pub field_id: Ulid,
    pub customer_id: Ulid,
    pub start: Ms,
    pub end: Ms,
    pub status: BookingStatus,
    pub price: i64,
    pub note: Option<String>,
    pub actioned_by: Option<Ulid>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideInfo {
    pub id: Ulid,
    pub field_id: Ulid,
    pub start: Ms,
    pub end: Ms,
    pub available: bool,
}

/// One row of a resolved day: a labeled slot, free or taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub span: Span,
    pub label: &'static str,
    /// Slot price in minor units: base hourly price × shift multiplier × hours.
    pub price: i64,
    pub is_available: bool,
    /// Active booking overlapping this slot, if any.
    pub occupied_by: Option<Ulid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(start: Ms, end: Ms, status: BookingStatus) -> Booking {
        Booking {
            id: Ulid::new(),
            customer_id: Ulid::new(),
            span: Span::new(start, end),
            status,
            price: 100,
            note: None,
            actioned_by: None,
            reason: None,
        }
    }

    fn field() -> FieldState {
        FieldState::new(Ulid::new(), "Pitch A".into(), None, Ulid::new(), 5000)
    }

    #[test]
    fn span_basics() {
        let s = Span::new(100, 200);
        assert_eq!(s.duration_ms(), 100);
        assert!(s.contains_instant(100));
        assert!(s.contains_instant(199));
        assert!(!s.contains_instant(200)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn status_classification() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::Rejected.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(!BookingStatus::Completed.is_active());

        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(BookingStatus::Rejected.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
    }

    #[test]
    fn status_string_roundtrip() {
        for s in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(BookingStatus::parse("PENDING"), None);
        assert_eq!(BookingStatus::parse("done"), None);
    }

    #[test]
    fn booking_ordering() {
        let mut fs = field();
        fs.insert_booking(booking(300, 400, BookingStatus::Pending));
        fs.insert_booking(booking(100, 200, BookingStatus::Confirmed));
        fs.insert_booking(booking(200, 300, BookingStatus::Cancelled));
        assert_eq!(fs.bookings[0].span.start, 100);
        assert_eq!(fs.bookings[1].span.start, 200);
        assert_eq!(fs.bookings[2].span.start, 300);
    }

    #[test]
    fn active_overlapping_filters_status() {
        let mut fs = field();
        fs.insert_booking(booking(100, 200, BookingStatus::Cancelled));
        fs.insert_booking(booking(100, 200, BookingStatus::Rejected));
        fs.insert_booking(booking(150, 250, BookingStatus::Confirmed));

        let query = Span::new(0, 1000);
        let hits: Vec<_> = fs.active_overlapping(&query).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].status, BookingStatus::Confirmed);
    }

    #[test]
    fn bookings_overlapping_adjacent_excluded() {
        // Booking ending exactly at query.start is NOT overlapping (half-open)
        let mut fs = field();
        fs.insert_booking(booking(100, 200, BookingStatus::Pending));
        let query = Span::new(200, 300);
        assert_eq!(fs.bookings_overlapping(&query).count(), 0);
    }

    #[test]
    fn bookings_overlapping_skips_future() {
        let mut fs = field();
        fs.insert_booking(booking(100, 200, BookingStatus::Pending));
        fs.insert_booking(booking(450, 600, BookingStatus::Pending));
        fs.insert_booking(booking(1000, 1100, BookingStatus::Pending));

        let query = Span::new(500, 800);
        let hits: Vec<_> = fs.bookings_overlapping(&query).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Span::new(450, 600));
    }

    #[test]
    fn has_active_bookings_only_counts_active() {
        let mut fs = field();
        fs.insert_booking(booking(100, 200, BookingStatus::Cancelled));
        fs.insert_booking(booking(300, 400, BookingStatus::Completed));
        assert!(!fs.has_active_bookings());
        fs.insert_booking(booking(500, 600, BookingStatus::Pending));
        assert!(fs.has_active_bookings());
    }

    #[test]
    fn override_ordering_and_remove() {
        let mut fs = field();
        let a = Ulid::new();
        fs.insert_override(ScheduleOverride {
            id: a,
            span: Span::new(500, 600),
            available: false,
        });
        fs.insert_override(ScheduleOverride {
            id: Ulid::new(),
            span: Span::new(100, 200),
            available: true,
        });
        assert_eq!(fs.overrides[0].span.start, 100);

        assert!(fs.remove_override(a).is_some());
        assert!(fs.remove_override(a).is_none());
        assert_eq!(fs.overrides.len(), 1);
    }

    #[test]
    fn overrides_overlapping_window() {
        let mut fs = field();
        fs.insert_override(ScheduleOverride {
            id: Ulid::new(),
            span: Span::new(0, 100),
            available: false,
        });
        fs.insert_override(ScheduleOverride {
            id: Ulid::new(),
            span: Span::new(150, 250),
            available: false,
        });
        let hits: Vec<_> = fs.overrides_overlapping(&Span::new(100, 200)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Span::new(150, 250));
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::BookingCreated {
            id: Ulid::new(),
            field_id: Ulid::new(),
            customer_id: Ulid::new(),
            span: Span::new(1000, 2000),
            price: 4500,
            note: Some("five-a-side".into()),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn event_field_id_extraction() {
        let fid = Ulid::new();
        assert_eq!(
            event_field_id(&Event::BookingTransitioned {
                id: Ulid::new(),
                field_id: fid,
                status: BookingStatus::Confirmed,
                actioned_by: None,
                reason: None,
            }),
            Some(fid)
        );
        assert_eq!(event_field_id(&Event::FieldDeleted { id: fid }), None);
    }
}

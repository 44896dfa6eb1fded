//! [`Rental`] definitions.

use common::{define_kind, unit, DateTime, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{customer, vehicle};
#[cfg(doc)]
use crate::domain::{Customer, Vehicle};

/// Rent of a [`Vehicle`] by a [`Customer`] for a [`Period`].
#[derive(Clone, Debug)]
pub struct Rental {
    /// ID of this [`Rental`].
    pub id: Id,

    /// ID of the [`Customer`] renting the [`Vehicle`].
    pub customer_id: customer::Id,

    /// ID of the rented [`Vehicle`].
    pub vehicle_id: vehicle::Id,

    /// [`Period`] of this [`Rental`].
    pub period: Period,

    /// Total price of this [`Rental`], fixed once it's created.
    pub total_price: Money,

    /// Current [`Status`] of this [`Rental`].
    pub status: Status,

    /// [`DateTime`] when this [`Rental`] was created.
    pub created_at: CreationDateTime,
}

impl Rental {
    /// Indicates whether this [`Rental`] is [`Status::Active`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Indicates whether this [`Rental`] is active and ends before the
    /// provided `now`.
    #[must_use]
    pub fn is_overdue<Of: ?Sized>(&self, now: &DateTimeOf<Of>) -> bool {
        self.is_active() && self.period.end.coerce::<Of>() < *now
    }

    /// Closes this [`Rental`] with the provided [`Outcome`].
    ///
    /// # Errors
    ///
    /// With the current [`Status`] if this [`Rental`] is not active anymore.
    pub fn close(&mut self, outcome: Outcome) -> Result<(), Status> {
        if !self.is_active() {
            return Err(self.status);
        }
        self.status = outcome.into();
        Ok(())
    }
}

/// ID of a [`Rental`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Time period a [`Vehicle`] is rented for.
///
/// Always ends strictly after it starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    /// [`DateTime`] when this [`Period`] starts.
    start: StartDateTime,

    /// [`DateTime`] when this [`Period`] ends.
    end: EndDateTime,
}

impl Period {
    /// Creates a new [`Period`] if the provided `end` is strictly after the
    /// `start`.
    #[must_use]
    pub fn new(start: StartDateTime, end: EndDateTime) -> Option<Self> {
        (end.coerce::<()>() > start.coerce()).then_some(Self { start, end })
    }

    /// Creates a new [`Period`] without checking its boundaries.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the `end` is strictly after the `start`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(
        start: StartDateTime,
        end: EndDateTime,
    ) -> Self {
        Self { start, end }
    }

    /// Returns the [`DateTime`] when this [`Period`] starts.
    #[must_use]
    pub fn start(&self) -> StartDateTime {
        self.start
    }

    /// Returns the [`DateTime`] when this [`Period`] ends.
    #[must_use]
    pub fn end(&self) -> EndDateTime {
        self.end
    }

    /// Returns the number of whole days in this [`Period`], truncating any
    /// fractional remainder.
    #[must_use]
    pub fn days(&self) -> i64 {
        self.end.whole_days_since(&self.start)
    }

    /// Checks whether the `other` [`Period`] conflicts with this one.
    ///
    /// Conflict means that either the start or the end of the `other`
    /// [`Period`] lies within this one, boundaries included. The `other`
    /// [`Period`] strictly containing this one is not a conflict.
    #[must_use]
    pub fn is_overlapped_by(&self, other: &Self) -> bool {
        let contains = |dt: DateTime| {
            self.start.coerce::<()>() <= dt && dt <= self.end.coerce()
        };
        contains(other.start.coerce()) || contains(other.end.coerce())
    }
}

define_kind! {
    #[doc = "Status of a [`Rental`]."]
    enum Status {
        #[doc = "[`Rental`] is in progress."]
        Active = 1,

        #[doc = "[`Vehicle`] was returned and the [`Rental`] is finished."]
        Completed = 2,

        #[doc = "[`Rental`] was called off."]
        Cancelled = 3,
    }
}

/// Terminal [`Status`] a [`Rental`] may be closed with.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Outcome {
    /// [`Rental`] is [`Status::Completed`].
    #[display("complete")]
    Completed,

    /// [`Rental`] is [`Status::Cancelled`].
    #[display("cancel")]
    Cancelled,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => Self::Completed,
            Outcome::Cancelled => Self::Cancelled,
        }
    }
}

/// [`DateTime`] when a [`Rental`] was created.
pub type CreationDateTime = DateTimeOf<(Rental, unit::Creation)>;

/// [`DateTime`] when a [`Rental`] starts.
pub type StartDateTime = DateTimeOf<(Rental, unit::Start)>;

/// [`DateTime`] when a [`Rental`] ends.
pub type EndDateTime = DateTimeOf<(Rental, unit::End)>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};

    use crate::domain::{customer, vehicle};

    use super::{Id, Outcome, Period, Rental, Status};

    fn at(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn period(start: &str, end: &str) -> Period {
        Period::new(at(start).coerce(), at(end).coerce()).unwrap()
    }

    fn rental(status: Status, end: &str) -> Rental {
        Rental {
            id: Id::new(),
            customer_id: customer::Id::new(),
            vehicle_id: vehicle::Id::new(),
            period: period("2024-05-01T00:00:00Z", end),
            total_price: Money::ZERO,
            status,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn period_ends_strictly_after_start() {
        let start = at("2024-05-01T10:00:00Z").coerce();
        let new = |end| Period::new(start, at(end).coerce());

        assert!(new("2024-05-01T10:00:00Z").is_none());
        assert!(new("2024-05-01T09:59:59Z").is_none());
        assert!(new("2024-05-01T10:00:01Z").is_some());
    }

    #[test]
    fn counts_truncated_days() {
        assert_eq!(
            period("2024-05-01T10:00:00Z", "2024-05-04T10:00:00Z").days(),
            3,
        );
        assert_eq!(
            period("2024-05-01T10:00:00Z", "2024-05-04T09:00:00Z").days(),
            2,
        );
        assert_eq!(
            period("2024-05-01T10:00:00Z", "2024-05-01T20:00:00Z").days(),
            0,
        );
    }

    #[test]
    fn detects_endpoint_containment() {
        let existing = period("2024-05-10T00:00:00Z", "2024-05-20T00:00:00Z");

        // Identical.
        assert!(existing.is_overlapped_by(&existing));
        // Starts inside.
        assert!(existing.is_overlapped_by(&period(
            "2024-05-15T00:00:00Z",
            "2024-05-25T00:00:00Z",
        )));
        // Ends inside.
        assert!(existing.is_overlapped_by(&period(
            "2024-05-05T00:00:00Z",
            "2024-05-12T00:00:00Z",
        )));
        // Touches the boundary.
        assert!(existing.is_overlapped_by(&period(
            "2024-05-20T00:00:00Z",
            "2024-05-22T00:00:00Z",
        )));
        // Fully inside.
        assert!(existing.is_overlapped_by(&period(
            "2024-05-12T00:00:00Z",
            "2024-05-14T00:00:00Z",
        )));
    }

    #[test]
    fn ignores_disjoint_and_enclosing_periods() {
        let existing = period("2024-05-10T00:00:00Z", "2024-05-20T00:00:00Z");

        assert!(!existing.is_overlapped_by(&period(
            "2024-05-01T00:00:00Z",
            "2024-05-09T23:59:59Z",
        )));
        assert!(!existing.is_overlapped_by(&period(
            "2024-05-20T00:00:01Z",
            "2024-05-30T00:00:00Z",
        )));
        assert!(!existing.is_overlapped_by(&period(
            "2024-05-01T00:00:00Z",
            "2024-05-30T00:00:00Z",
        )));
    }

    #[test]
    fn closes_only_active_rental() {
        let mut r = rental(Status::Active, "2024-05-03T00:00:00Z");
        assert_eq!(r.close(Outcome::Completed), Ok(()));
        assert_eq!(r.status, Status::Completed);
        assert_eq!(r.close(Outcome::Completed), Err(Status::Completed));
        assert_eq!(r.close(Outcome::Cancelled), Err(Status::Completed));
        assert_eq!(r.status, Status::Completed);

        let mut r = rental(Status::Active, "2024-05-03T00:00:00Z");
        assert_eq!(r.close(Outcome::Cancelled), Ok(()));
        assert_eq!(r.status, Status::Cancelled);
        assert_eq!(r.close(Outcome::Completed), Err(Status::Cancelled));
    }

    #[test]
    fn reports_overdue() {
        let now = at("2024-05-05T00:00:00Z");

        let overdue = |status, end| rental(status, end).is_overdue(&now);

        assert!(overdue(Status::Active, "2024-05-04T23:59:59Z"));
        assert!(!overdue(Status::Active, "2024-05-05T00:00:00Z"));
        assert!(!overdue(Status::Active, "2024-05-06T00:00:00Z"));
        assert!(!overdue(Status::Completed, "2024-05-02T00:00:00Z"));
        assert!(!overdue(Status::Cancelled, "2024-05-02T00:00:00Z"));
    }
}

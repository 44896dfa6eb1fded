//! [`Rental`] read model definition.

use crate::domain::{rental, vehicle};
#[cfg(doc)]
use crate::domain::{rental::Status, Rental, Vehicle};

/// Selector of [`Status::Active`] [`Rental`]s of a [`Vehicle`], whose
/// [`rental::Period`] either starts or ends within the provided one.
///
/// See [`rental::Period::is_overlapped_by()`] for the exact semantics.
#[derive(Clone, Copy, Debug)]
pub struct Overlapping {
    /// ID of the [`Vehicle`] to select [`Rental`]s of.
    pub vehicle_id: vehicle::Id,

    /// [`rental::Period`] to check.
    pub period: rental::Period,
}

pub mod list {
    //! [`Rental`]s list definitions.

    use common::DateTime;

    use crate::domain::{customer, rental, vehicle, Rental};
    #[cfg(doc)]
    use crate::domain::{Customer, Vehicle};

    /// Filter of a [`Rental`]s list, ordered by creation time.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Customer`] to list [`Rental`]s of.
        pub customer_id: Option<customer::Id>,

        /// ID of the [`Vehicle`] to list [`Rental`]s of.
        pub vehicle_id: Option<vehicle::Id>,

        /// [`rental::Status`] of the listed [`Rental`]s.
        pub status: Option<rental::Status>,

        /// [`DateTime`] the listed [`Rental`]s must end strictly before.
        pub ends_before: Option<DateTime>,
    }

    impl Filter {
        /// Creates a new [`Filter`] matching active [`Rental`]s, which should
        /// have ended before the provided `now`.
        #[must_use]
        pub fn overdue(now: DateTime) -> Self {
            Self {
                status: Some(rental::Status::Active),
                ends_before: Some(now),
                ..Self::default()
            }
        }

        /// Checks whether the provided [`Rental`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, rental: &Rental) -> bool {
            let Self {
                customer_id,
                vehicle_id,
                status,
                ends_before,
            } = self;

            customer_id.map_or(true, |id| rental.customer_id == id)
                && vehicle_id.map_or(true, |id| rental.vehicle_id == id)
                && status.map_or(true, |s| rental.status == s)
                && ends_before
                    .map_or(true, |dt| rental.period.end().coerce() < dt)
        }
    }
}

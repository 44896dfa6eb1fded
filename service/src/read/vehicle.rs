//! [`Vehicle`] read model definition.

use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::{Rental, Vehicle};

/// Indicator whether a [`Vehicle`] is referenced by any [`Rental`], regardless
/// of its status.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct HasRentals(pub bool);

pub mod list {
    //! [`Vehicle`]s list definitions.

    use common::Money;

    use crate::domain::Vehicle;

    /// Filter of a [`Vehicle`]s list.
    ///
    /// Every provided criterion must be satisfied, while [`None`] ones are
    /// ignored. The list is ordered by creation time.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Part of a [`Vehicle`] brand to search for, ignoring case.
        pub brand: Option<String>,

        /// Part of a [`Vehicle`] model to search for, ignoring case.
        pub model: Option<String>,

        /// Minimal production year of a [`Vehicle`], inclusive.
        pub min_year: Option<i32>,

        /// Maximal production year of a [`Vehicle`], inclusive.
        pub max_year: Option<i32>,

        /// Minimal daily rate of a [`Vehicle`], inclusive.
        pub min_daily_rate: Option<Money>,

        /// Maximal daily rate of a [`Vehicle`], inclusive.
        pub max_daily_rate: Option<Money>,

        /// Required availability of a [`Vehicle`].
        pub available: Option<bool>,
    }

    impl Filter {
        /// Creates a new [`Filter`] matching available [`Vehicle`]s only.
        #[must_use]
        pub fn available() -> Self {
            Self {
                available: Some(true),
                ..Self::default()
            }
        }

        /// Checks whether the provided [`Vehicle`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, vehicle: &Vehicle) -> bool {
            let Self {
                brand,
                model,
                min_year,
                max_year,
                min_daily_rate,
                max_daily_rate,
                available,
            } = self;

            let year = i32::from(vehicle.year);
            let rate = vehicle.daily_rate.into_inner();

            brand.as_ref().map_or(true, |b| {
                contains_ignore_case(vehicle.brand.as_ref(), b)
            }) && model.as_ref().map_or(true, |m| {
                contains_ignore_case(vehicle.model.as_ref(), m)
            }) && min_year.map_or(true, |y| year >= y)
                && max_year.map_or(true, |y| year <= y)
                && min_daily_rate.map_or(true, |r| rate >= r)
                && max_daily_rate.map_or(true, |r| rate <= r)
                && available.map_or(true, |a| vehicle.available == a)
        }
    }

    /// Checks whether the `haystack` contains the `needle`, ignoring case.
    pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

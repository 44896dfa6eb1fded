//! [`Customer`] read model definition.

use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::{Customer, Rental};

/// Indicator whether a [`Customer`] is referenced by any [`Rental`],
/// regardless of its status.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct HasRentals(pub bool);

pub mod list {
    //! [`Customer`]s list definitions.

    use crate::{domain::Customer, read::vehicle::list::contains_ignore_case};

    /// Filter of a [`Customer`]s list, ordered by creation time.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Part of either the first or the last name of a [`Customer`] to
        /// search for, ignoring case.
        pub name: Option<String>,
    }

    impl Filter {
        /// Checks whether the provided [`Customer`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, customer: &Customer) -> bool {
            self.name.as_ref().map_or(true, |n| {
                contains_ignore_case(customer.first_name.as_ref(), n)
                    || contains_ignore_case(customer.last_name.as_ref(), n)
            })
        }
    }
}

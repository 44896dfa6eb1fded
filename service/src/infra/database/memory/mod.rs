//! In-memory [`Database`] implementation.
//!
//! All the data lives in a single [`State`] guarded by a mutex, so every
//! transaction is serialized with the others.

pub mod client;
mod impls;

use std::collections::HashMap;

use derive_more::{Deref, Display, Error as StdError};

#[cfg(doc)]
use crate::infra::Database;
use crate::domain::{customer, rental, vehicle, Customer, Rental, Vehicle};

pub use self::client::{NonTx, Storage, Tx};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whole data stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`Vehicle`]s.
    pub(crate) vehicles: HashMap<vehicle::Id, Vehicle>,

    /// Stored [`Customer`]s.
    pub(crate) customers: HashMap<customer::Id, Customer>,

    /// Stored [`Rental`]s.
    pub(crate) rentals: HashMap<rental::Id, Rental>,
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint was violated.
    #[display("Unique constraint `{_0}` violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            Self::UniqueViolation(c) => *c == constraint,
        }
    }
}

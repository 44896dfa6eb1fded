//! [`Query`] collection related to a single [`Customer`].

use common::operations::By;

use crate::domain::{customer, Customer};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Customer`] by its [`customer::Id`].
pub type ById = DatabaseQuery<By<Option<Customer>, customer::Id>>;

//! [`Query`] collection related to the multiple [`Customer`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{customer, Customer},
    read,
};

use super::DatabaseQuery;

/// Queries multiple [`Customer`]s by their [`customer::Id`]s.
pub type ByIds =
    DatabaseQuery<By<HashMap<customer::Id, Customer>, Vec<customer::Id>>>;

/// Queries a list of [`Customer`]s.
pub type List =
    DatabaseQuery<By<Vec<Customer>, read::customer::list::Filter>>;

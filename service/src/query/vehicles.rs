//! [`Query`] collection related to the multiple [`Vehicle`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{vehicle, Vehicle},
    read,
};

use super::DatabaseQuery;

/// Queries multiple [`Vehicle`]s by their [`vehicle::Id`]s.
pub type ByIds =
    DatabaseQuery<By<HashMap<vehicle::Id, Vehicle>, Vec<vehicle::Id>>>;

/// Queries a list of [`Vehicle`]s.
pub type List = DatabaseQuery<By<Vec<Vehicle>, read::vehicle::list::Filter>>;

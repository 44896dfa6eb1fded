//! [`Vehicle`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read,
};

impl<S, IDs> Database<Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>>
    for Memory<S>
where
    S: Storage,
    IDs: AsRef<[vehicle::Id]>,
{
    type Ok = HashMap<vehicle::Id, Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .read(|s| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| Some((*id, s.vehicles.get(id)?.clone())))
                    .collect()
            })
            .await)
    }
}

impl<S: Storage> Database<Select<By<Option<Vehicle>, vehicle::Id>>>
    for Memory<S>
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.read(|s| s.vehicles.get(&id).cloned()).await)
    }
}

impl<S: Storage> Database<Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>>
    for Memory<S>
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut list: Vec<_> = self
            .read(|s| {
                s.vehicles
                    .values()
                    .filter(|v| filter.matches(v))
                    .cloned()
                    .collect()
            })
            .await;
        list.sort_by_key(|v| (v.created_at, v.id));
        Ok(list)
    }
}

impl<S: Storage> Database<Select<By<read::vehicle::HasRentals, vehicle::Id>>>
    for Memory<S>
{
    type Ok = read::vehicle::HasRentals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::vehicle::HasRentals, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .read(|s| s.rentals.values().any(|r| r.vehicle_id == id))
            .await
            .into())
    }
}

impl<S: Storage> Database<Insert<Vehicle>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(vehicle))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Vehicle>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| drop(s.vehicles.insert(vehicle.id, vehicle)))
            .await;
        Ok(())
    }
}

impl<S: Storage> Database<Delete<By<Vehicle, vehicle::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|s| drop(s.vehicles.remove(&id))).await;
        Ok(())
    }
}

impl<S: Storage> Database<Lock<By<Vehicle, vehicle::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(_): Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions already hold the whole `State` exclusively.
        self.read(|_| ()).await;
        Ok(())
    }
}

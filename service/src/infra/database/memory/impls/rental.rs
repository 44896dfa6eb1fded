//! [`Rental`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{rental, Rental},
    infra::{
        database::{self, memory::Storage, Memory},
        Database,
    },
    read,
};

impl<S: Storage> Database<Select<By<Option<Rental>, rental::Id>>>
    for Memory<S>
{
    type Ok = Option<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rental>, rental::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.read(|s| s.rentals.get(&id).cloned()).await)
    }
}

impl<S: Storage> Database<Select<By<Vec<Rental>, read::rental::list::Filter>>>
    for Memory<S>
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut list: Vec<_> = self
            .read(|s| {
                s.rentals
                    .values()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .await;
        list.sort_by_key(|r| (r.created_at, r.id));
        Ok(list)
    }
}

impl<S: Storage> Database<Select<By<Vec<Rental>, read::rental::Overlapping>>>
    for Memory<S>
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::Overlapping>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::Overlapping { vehicle_id, period } = by.into_inner();
        let mut list: Vec<_> = self
            .read(|s| {
                s.rentals
                    .values()
                    .filter(|r| {
                        r.vehicle_id == vehicle_id
                            && r.is_active()
                            && period.is_overlapped_by(&r.period)
                    })
                    .cloned()
                    .collect()
            })
            .await;
        list.sort_by_key(|r| (r.created_at, r.id));
        Ok(list)
    }
}

impl<S: Storage> Database<Insert<Rental>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rental): Insert<Rental>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(rental))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Rental>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rental): Update<Rental>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| drop(s.rentals.insert(rental.id, rental))).await;
        Ok(())
    }
}

impl<S: Storage> Database<Lock<By<Rental, rental::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(_): Lock<By<Rental, rental::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions already hold the whole `State` exclusively.
        self.read(|_| ()).await;
        Ok(())
    }
}

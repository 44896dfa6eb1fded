//! [`Customer`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{customer, Customer},
    infra::{
        database::{
            self,
            memory::{self, State, Storage},
            Memory, CUSTOMER_DRIVER_LICENSE_CONSTRAINT,
            CUSTOMER_EMAIL_CONSTRAINT,
        },
        Database,
    },
    read,
};

impl<S, IDs> Database<Select<By<HashMap<customer::Id, Customer>, IDs>>>
    for Memory<S>
where
    S: Storage,
    IDs: AsRef<[customer::Id]>,
{
    type Ok = HashMap<customer::Id, Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<customer::Id, Customer>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .read(|s| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| Some((*id, s.customers.get(id)?.clone())))
                    .collect()
            })
            .await)
    }
}

impl<S: Storage> Database<Select<By<Option<Customer>, customer::Id>>>
    for Memory<S>
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.read(|s| s.customers.get(&id).cloned()).await)
    }
}

impl<'l, S: Storage> Database<Select<By<Option<Customer>, &'l customer::Email>>>
    for Memory<S>
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, &'l customer::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .read(|s| {
                s.customers.values().find(|c| &c.email == email).cloned()
            })
            .await)
    }
}

impl<'l, S: Storage>
    Database<Select<By<Option<Customer>, &'l customer::DriverLicenseNumber>>>
    for Memory<S>
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<Customer>, &'l customer::DriverLicenseNumber>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let number = by.into_inner();
        Ok(self
            .read(|s| {
                s.customers
                    .values()
                    .find(|c| &c.driver_license_number == number)
                    .cloned()
            })
            .await)
    }
}

impl<S: Storage>
    Database<Select<By<Vec<Customer>, read::customer::list::Filter>>>
    for Memory<S>
{
    type Ok = Vec<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Customer>, read::customer::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut list: Vec<_> = self
            .read(|s| {
                s.customers
                    .values()
                    .filter(|c| filter.matches(c))
                    .cloned()
                    .collect()
            })
            .await;
        list.sort_by_key(|c| (c.created_at, c.id));
        Ok(list)
    }
}

impl<S: Storage>
    Database<Select<By<read::customer::HasRentals, customer::Id>>>
    for Memory<S>
{
    type Ok = read::customer::HasRentals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::customer::HasRentals, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .read(|s| s.rentals.values().any(|r| r.customer_id == id))
            .await
            .into())
    }
}

impl<S: Storage> Database<Insert<Customer>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(customer): Insert<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(customer))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<S: Storage> Database<Update<Customer>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(customer): Update<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            check_unique(s, &customer)?;
            drop(s.customers.insert(customer.id, customer));
            Ok::<_, memory::Error>(())
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<S: Storage> Database<Delete<By<Customer, customer::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Customer, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|s| drop(s.customers.remove(&id))).await;
        Ok(())
    }
}

impl<S: Storage> Database<Lock<By<Customer, customer::Id>>> for Memory<S> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(_): Lock<By<Customer, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Transactions already hold the whole `State` exclusively.
        self.read(|_| ()).await;
        Ok(())
    }
}

/// Checks that no other [`Customer`] in the [`State`] shares an email or a
/// driver license number with the provided one.
fn check_unique(
    state: &State,
    customer: &Customer,
) -> Result<(), memory::Error> {
    for other in state.customers.values().filter(|c| c.id != customer.id) {
        if other.email == customer.email {
            return Err(memory::Error::UniqueViolation(
                CUSTOMER_EMAIL_CONSTRAINT,
            ));
        }
        if other.driver_license_number == customer.driver_license_number {
            return Err(memory::Error::UniqueViolation(
                CUSTOMER_DRIVER_LICENSE_CONSTRAINT,
            ));
        }
    }
    Ok(())
}

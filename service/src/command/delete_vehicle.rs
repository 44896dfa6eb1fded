//! [`Command`] for deleting a [`Vehicle`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Rental;
use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`Vehicle`] never been rented.
#[derive(Clone, Copy, Debug)]
pub struct DeleteVehicle {
    /// ID of the [`Vehicle`] to delete.
    pub vehicle_id: vehicle::Id,
}

impl<Db> Command<DeleteVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::vehicle::HasRentals, vehicle::Id>>,
            Ok = read::vehicle::HasRentals,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteVehicle { vehicle_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent rentals of the `Vehicle` being deleted.
        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        let read::vehicle::HasRentals(has_rentals) = tx
            .execute(Select(
                By::<read::vehicle::HasRentals, _>::new(vehicle_id),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if has_rentals {
            return Err(tracerr::new!(E::VehicleHasRentals(vehicle_id)));
        }

        tx.execute(Delete(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(vehicle)
    }
}

/// Error of [`DeleteVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Vehicle`] doesn't exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] is referenced by [`Rental`]s.
    #[display("`Vehicle(id: {_0})` has rentals")]
    #[from(ignore)]
    VehicleHasRentals(#[error(not(source))] vehicle::Id),
}

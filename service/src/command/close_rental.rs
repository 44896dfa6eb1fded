//! [`Command`] for closing a [`Rental`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::rental::Status;
use crate::{
    domain::{rental, vehicle, Rental, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for closing a [`Status::Active`] [`Rental`] with the provided
/// [`rental::Outcome`], releasing the rented [`Vehicle`].
#[derive(Clone, Copy, Debug)]
pub struct CloseRental {
    /// ID of the [`Rental`] to close.
    pub rental_id: rental::Id,

    /// [`rental::Outcome`] to close the [`Rental`] with.
    pub outcome: rental::Outcome,
}

impl<Db> Command<CloseRental> for Service<Db>
where
    Db: Database<
            Select<By<Option<Rental>, rental::Id>>,
            Ok = Option<Rental>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Rental>, rental::Id>>,
            Ok = Option<Rental>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Rental, rental::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Rental>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Rental;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CloseRental) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CloseRental { rental_id, outcome } = cmd;

        // `Vehicle` of a `Rental` never changes, so it's safe to learn it
        // before locking.
        let vehicle_id = self
            .database()
            .execute(Select(By::<Option<Rental>, _>::new(rental_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RentalNotExists(rental_id))
            .map_err(tracerr::wrap!())?
            .vehicle_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Locking order is `Vehicle` first, then `Rental`, the same as when
        // creating a `Rental`.
        tx.execute(Lock(By::<Vehicle, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::<Rental, _>::new(rental_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut rental = tx
            .execute(Select(By::<Option<Rental>, _>::new(rental_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RentalNotExists(rental_id))
            .map_err(tracerr::wrap!())?;
        rental
            .close(outcome)
            .map_err(|status| E::RentalNotActive {
                rental_id,
                status,
            })
            .map_err(tracerr::wrap!())?;

        tx.execute(Update(rental.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(mut vehicle) = vehicle {
            vehicle.available = true;
            tx.execute(Update(vehicle))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        } else {
            log::warn!(
                "`Vehicle(id: {vehicle_id})` of `Rental(id: {rental_id})` \
                 does not exist",
            );
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::debug!(
            "`Rental(id: {rental_id})` closed as `{}`, `Vehicle(id: \
             {vehicle_id})` is available again",
            rental.status,
        );

        Ok(rental)
    }
}

/// Error of [`CloseRental`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Rental`] doesn't exist.
    #[display("`Rental(id: {_0})` does not exist")]
    RentalNotExists(#[error(not(source))] rental::Id),

    /// [`Rental`] is not [`Status::Active`] anymore.
    #[display("`Rental(id: {rental_id})` is already `{status}`")]
    RentalNotActive {
        /// ID of the [`Rental`].
        rental_id: rental::Id,

        /// Current [`rental::Status`] of the [`Rental`].
        status: rental::Status,
    },
}

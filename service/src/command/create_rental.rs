//! [`Command`] for renting a [`Vehicle`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::rental::{Period, Status};
use crate::{
    domain::{customer, rental, vehicle, Customer, Rental, Vehicle},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for renting a [`Vehicle`] by a [`Customer`].
///
/// Checks, in order, that:
/// 1. both the [`Customer`] and the [`Vehicle`] exist;
/// 2. the [`Vehicle`] is available;
/// 3. the rent ends strictly after it starts;
/// 4. no [`Status::Active`] [`Rental`] of the [`Vehicle`] starts or ends
///    within the requested [`Period`].
///
/// On success the [`Vehicle`] becomes unavailable.
#[derive(Clone, Copy, Debug)]
pub struct CreateRental {
    /// ID of the renting [`Customer`].
    pub customer_id: customer::Id,

    /// ID of the [`Vehicle`] to rent.
    pub vehicle_id: vehicle::Id,

    /// [`DateTime`] the rent starts at.
    pub start: rental::StartDateTime,

    /// [`DateTime`] the rent ends at.
    pub end: rental::EndDateTime,
}

impl<Db> Command<CreateRental> for Service<Db>
where
    Db: Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Rental>, read::rental::Overlapping>>,
            Ok = Vec<Rental>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Customer, customer::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Insert<Rental>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Vehicle>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Rental;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRental) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRental {
            customer_id,
            vehicle_id,
            start,
            end,
        } = cmd;

        // Fail fast without opening a transaction.
        _ = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;
        _ = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Locking order is `Customer` first, then `Vehicle`.
        tx.execute(Lock(By::<Customer, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        _ = tx
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Lock(By::<Vehicle, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        if !vehicle.available {
            return Err(tracerr::new!(E::VehicleNotAvailable(vehicle_id)));
        }

        let period = rental::Period::new(start, end)
            .ok_or(E::InvalidPeriod)
            .map_err(tracerr::wrap!())?;

        let overlapping = tx
            .execute(Select(By::<Vec<Rental>, _>::new(
                read::rental::Overlapping { vehicle_id, period },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(existing) = overlapping.first() {
            return Err(tracerr::new!(E::PeriodOverlapped {
                vehicle_id,
                rental_id: existing.id,
            }));
        }

        let rental = Rental {
            id: rental::Id::new(),
            customer_id,
            vehicle_id,
            total_price: vehicle.rental_price(period.days()),
            period,
            status: rental::Status::Active,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(rental.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        vehicle.available = false;
        tx.execute(Update(vehicle))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::debug!(
            "`Rental(id: {})` of `Vehicle(id: {vehicle_id})` created for \
             {} day(s) at {}",
            rental.id,
            rental.period.days(),
            rental.total_price,
        );

        Ok(rental)
    }
}

/// Error of [`CreateRental`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] doesn't exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Vehicle`] doesn't exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] is not available for rent.
    #[display("`Vehicle(id: {_0})` is not available")]
    VehicleNotAvailable(#[error(not(source))] vehicle::Id),

    /// Requested [`Period`] doesn't end after it starts.
    #[display("Rental end must be after its start")]
    InvalidPeriod,

    /// Requested [`Period`] conflicts with an existing [`Rental`].
    #[display(
        "`Vehicle(id: {vehicle_id})` is already rented by \
         `Rental(id: {rental_id})` for the requested period"
    )]
    PeriodOverlapped {
        /// ID of the requested [`Vehicle`].
        vehicle_id: vehicle::Id,

        /// ID of the conflicting [`Rental`].
        rental_id: rental::Id,
    },
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{CancelRental, UpdateVehicleAvailability},
        domain::{customer, rental, vehicle, Customer, Vehicle},
        fixture::{
            add_customer, add_vehicle, at, car, money, rent, service,
        },
        infra::Memory,
        query, Command as _, Service,
    };

    use super::{CreateRental, ExecutionError};

    async fn setup() -> (Service<Memory>, Customer, Vehicle) {
        let svc = service();
        let v = add_vehicle(&svc, car("50")).await;
        let c = add_customer(&svc, "john@example.com", "DL1").await;
        (svc, c, v)
    }

    async fn vehicle_of(svc: &Service<Memory>, id: vehicle::Id) -> Vehicle {
        svc.execute(query::vehicle::ById::by(id))
            .await
            .unwrap()
            .unwrap()
    }

    async fn release(svc: &Service<Memory>, id: vehicle::Id) {
        drop(
            svc.execute(UpdateVehicleAvailability {
                vehicle_id: id,
                available: true,
            })
            .await
            .unwrap(),
        );
    }

    #[tokio::test]
    async fn creates_active_rental_and_occupies_vehicle() {
        let (svc, c, v) = setup().await;

        let r = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-01T10:00:00Z",
                "2024-05-04T10:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(r.status, rental::Status::Active);
        assert_eq!(r.customer_id, c.id);
        assert_eq!(r.vehicle_id, v.id);
        assert_eq!(r.total_price, money("150"));
        assert!(!vehicle_of(&svc, v.id).await.available);

        let stored = svc
            .execute(query::rental::ById::by(r.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_price, r.total_price);
        assert_eq!(stored.period, r.period);
    }

    #[tokio::test]
    async fn truncates_partial_days_in_price() {
        let (svc, c, v) = setup().await;

        let r = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-01T10:00:00Z",
                "2024-05-04T09:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(r.total_price, money("100"));
    }

    #[tokio::test]
    async fn refuses_unknown_customer_and_vehicle() {
        let (svc, c, v) = setup().await;
        let cmd =
            rent(&c, &v, "2024-05-01T00:00:00Z", "2024-05-02T00:00:00Z");

        let err = svc
            .execute(CreateRental {
                customer_id: customer::Id::new(),
                ..cmd
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::CustomerNotExists(_)),
            "{err}",
        );

        let err = svc
            .execute(CreateRental {
                vehicle_id: vehicle::Id::new(),
                ..cmd
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::VehicleNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn refuses_unavailable_vehicle() {
        let (svc, c, v) = setup().await;
        drop(
            svc.execute(UpdateVehicleAvailability {
                vehicle_id: v.id,
                available: false,
            })
            .await
            .unwrap(),
        );

        let err = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-01T00:00:00Z",
                "2024-05-02T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::VehicleNotAvailable(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn refuses_invalid_period() {
        let (svc, c, v) = setup().await;

        for (start, end) in [
            ("2024-05-02T00:00:00Z", "2024-05-01T00:00:00Z"),
            ("2024-05-01T00:00:00Z", "2024-05-01T00:00:00Z"),
        ] {
            let err = svc.execute(rent(&c, &v, start, end)).await.unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::InvalidPeriod),
                "{err}",
            );
        }
        assert!(vehicle_of(&svc, v.id).await.available);
    }

    #[tokio::test]
    async fn checks_availability_before_period() {
        let (svc, c, v) = setup().await;
        drop(
            svc.execute(rent(
                &c,
                &v,
                "2024-05-01T00:00:00Z",
                "2024-05-02T00:00:00Z",
            ))
            .await
            .unwrap(),
        );

        let err = svc
            .execute(rent(
                &c,
                &v,
                "2024-06-02T00:00:00Z",
                "2024-06-01T00:00:00Z",
            ))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::VehicleNotAvailable(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn refuses_overlapping_active_rental() {
        let (svc, c, v) = setup().await;
        let existing = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-10T00:00:00Z",
                "2024-05-20T00:00:00Z",
            ))
            .await
            .unwrap();
        // The `Rental` stays active while the `Vehicle` is released manually.
        release(&svc, v.id).await;

        for (start, end) in [
            ("2024-05-15T00:00:00Z", "2024-05-25T00:00:00Z"),
            ("2024-05-01T00:00:00Z", "2024-05-10T00:00:00Z"),
            ("2024-05-01T00:00:00Z", "2024-05-30T00:00:00Z"),
        ] {
            let err = svc.execute(rent(&c, &v, start, end)).await.unwrap_err();
            assert!(
                matches!(
                    err.as_ref(),
                    ExecutionError::PeriodOverlapped { rental_id, .. }
                        if *rental_id == existing.id,
                ),
                "{err}",
            );
        }

        // Existing endpoints lie outside of a strictly nested period.
        let nested = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-12T00:00:00Z",
                "2024-05-14T00:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(nested.status, rental::Status::Active);
    }

    #[tokio::test]
    async fn ignores_closed_rentals_when_checking_overlap() {
        let (svc, c, v) = setup().await;
        let first = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-10T00:00:00Z",
                "2024-05-20T00:00:00Z",
            ))
            .await
            .unwrap();
        drop(
            svc.execute(CancelRental {
                rental_id: first.id,
            })
            .await
            .unwrap(),
        );

        let second = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-10T00:00:00Z",
                "2024-05-20T00:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(second.status, rental::Status::Active);
    }

    #[tokio::test]
    async fn rents_vehicle_once_under_concurrency() {
        let (svc, c, v) = setup().await;
        let other = add_customer(&svc, "jane@example.com", "DL2").await;

        let (first, second) = tokio::join!(
            svc.execute(rent(
                &c,
                &v,
                "2024-05-01T00:00:00Z",
                "2024-05-03T00:00:00Z",
            )),
            svc.execute(rent(
                &other,
                &v,
                "2024-05-02T00:00:00Z",
                "2024-05-04T00:00:00Z",
            )),
        );

        assert_eq!(
            usize::from(first.is_ok()) + usize::from(second.is_ok()),
            1,
        );
        let err = first.err().or(second.err()).unwrap();
        assert!(
            matches!(err.as_ref(), ExecutionError::VehicleNotAvailable(_)),
            "{err}",
        );

        let rentals = svc
            .execute(query::rentals::List::by(Default::default()))
            .await
            .unwrap();
        assert_eq!(rentals.len(), 1);
    }

    #[tokio::test]
    async fn leaves_no_trace_on_failure() {
        let (svc, c, v) = setup().await;

        drop(
            svc.execute(CreateRental {
                start: at("2024-05-03T00:00:00Z"),
                end: at("2024-05-01T00:00:00Z"),
                customer_id: c.id,
                vehicle_id: v.id,
            })
            .await
            .unwrap_err(),
        );

        assert!(vehicle_of(&svc, v.id).await.available);
        let rentals = svc
            .execute(query::rentals::List::by(Default::default()))
            .await
            .unwrap();
        assert!(rentals.is_empty());
    }
}

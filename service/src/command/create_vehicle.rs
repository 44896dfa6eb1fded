//! [`Command`] for creating a new [`Vehicle`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::vehicle::{Brand, DailyRate, Details, Model, Year};
use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Vehicle`].
///
/// Created [`Vehicle`] is always available.
#[derive(Clone, Debug)]
pub struct CreateVehicle {
    /// [`Brand`] of a new [`Vehicle`].
    pub brand: vehicle::Brand,

    /// [`Model`] of a new [`Vehicle`].
    pub model: vehicle::Model,

    /// Production [`Year`] of a new [`Vehicle`].
    pub year: vehicle::Year,

    /// [`DailyRate`] of a new [`Vehicle`].
    pub daily_rate: vehicle::DailyRate,

    /// Type-specific [`Details`] of a new [`Vehicle`].
    pub details: vehicle::Details,
}

impl<Db> Command<CreateVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateVehicle) -> Result<Self::Ok, Self::Err> {
        let CreateVehicle {
            brand,
            model,
            year,
            daily_rate,
            details,
        } = cmd;

        let vehicle = Vehicle {
            id: vehicle::Id::new(),
            brand,
            model,
            year,
            daily_rate,
            available: true,
            details,
            created_at: DateTime::now().coerce(),
        };

        // `Vehicle` and its `Details` are stored separately.
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(vehicle.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::debug!(
            "`Vehicle(id: {})` of `{}` kind created",
            vehicle.id,
            vehicle.kind(),
        );

        Ok(vehicle)
    }
}

/// Error of [`CreateVehicle`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use crate::{
        fixture::{car, service},
        query::vehicle,
        Command as _,
    };

    use super::CreateVehicle;

    #[tokio::test]
    async fn creates_available_vehicle() {
        let svc = service();

        let created = svc.execute(car("50")).await.unwrap();
        assert!(created.available);

        let stored = svc
            .execute(vehicle::ById::by(created.id))
            .await
            .unwrap()
            .expect("`Vehicle` should be stored");
        assert_eq!(stored.brand, created.brand);
        assert_eq!(stored.daily_rate, created.daily_rate);
        assert!(stored.available);
    }

    #[tokio::test]
    async fn assigns_distinct_ids() {
        let svc = service();

        let cmd: CreateVehicle = car("50");
        let first = svc.execute(cmd.clone()).await.unwrap();
        let second = svc.execute(cmd).await.unwrap();

        assert_ne!(first.id, second.id);
    }
}

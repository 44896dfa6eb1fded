//! [`Command`] for completing a [`Rental`].

use crate::{domain::rental, Service};
#[cfg(doc)]
use crate::domain::{rental::Status, Rental, Vehicle};

use super::{close_rental, CloseRental, Command};

/// [`Command`] for marking a [`Status::Active`] [`Rental`] as
/// [`Status::Completed`] once its [`Vehicle`] is returned.
#[derive(Clone, Copy, Debug)]
pub struct CompleteRental {
    /// ID of the [`Rental`] to complete.
    pub rental_id: rental::Id,
}

impl<Db> Command<CompleteRental> for Service<Db>
where
    Self: Command<CloseRental>,
{
    type Ok = <Self as Command<CloseRental>>::Ok;
    type Err = <Self as Command<CloseRental>>::Err;

    async fn execute(
        &self,
        CompleteRental { rental_id }: CompleteRental,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(CloseRental {
            rental_id,
            outcome: rental::Outcome::Completed,
        })
        .await
    }
}

/// Error of [`CompleteRental`] [`Command`] execution.
pub type ExecutionError = close_rental::ExecutionError;

#[cfg(test)]
mod spec {
    use crate::{
        domain::rental,
        fixture::{add_customer, add_vehicle, car, rent, service},
        Command as _,
    };

    use super::{CompleteRental, ExecutionError};

    #[tokio::test]
    async fn completes_active_rental() {
        let svc = service();
        let v = add_vehicle(&svc, car("50")).await;
        let c = add_customer(&svc, "john@example.com", "DL1").await;
        let r = svc
            .execute(rent(
                &c,
                &v,
                "2024-05-01T00:00:00Z",
                "2024-05-03T00:00:00Z",
            ))
            .await
            .unwrap();

        let completed =
            svc.execute(CompleteRental { rental_id: r.id }).await.unwrap();
        assert_eq!(completed.status, rental::Status::Completed);

        let err = svc
            .execute(CompleteRental { rental_id: r.id })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::RentalNotActive { .. }),
            "{err}",
        );
    }
}

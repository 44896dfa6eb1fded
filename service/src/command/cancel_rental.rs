//! [`Command`] for cancelling a [`Rental`].

use crate::{domain::rental, Service};
#[cfg(doc)]
use crate::domain::{rental::Status, Rental};

use super::{close_rental, CloseRental, Command};

/// [`Command`] for calling off a [`Status::Active`] [`Rental`].
#[derive(Clone, Copy, Debug)]
pub struct CancelRental {
    /// ID of the [`Rental`] to cancel.
    pub rental_id: rental::Id,
}

impl<Db> Command<CancelRental> for Service<Db>
where
    Self: Command<CloseRental>,
{
    type Ok = <Self as Command<CloseRental>>::Ok;
    type Err = <Self as Command<CloseRental>>::Err;

    async fn execute(
        &self,
        CancelRental { rental_id }: CancelRental,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(CloseRental {
            rental_id,
            outcome: rental::Outcome::Cancelled,
        })
        .await
    }
}

/// Error of [`CancelRental`] [`Command`] execution.
pub type ExecutionError = close_rental::ExecutionError;

#[cfg(test)]
mod spec {
    use crate::{
        domain::rental,
        fixture::{add_customer, add_vehicle, car, rent, service},
        query, Command as _,
    };

    use super::{CancelRental, ExecutionError};

    #[tokio::test]
    async fn cancels_active_rental_keeping_its_price() {
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

        let cancelled =
            svc.execute(CancelRental { rental_id: r.id }).await.unwrap();
        assert_eq!(cancelled.status, rental::Status::Cancelled);
        assert_eq!(cancelled.total_price, r.total_price);

        let vehicle = svc
            .execute(query::vehicle::ById::by(v.id))
            .await
            .unwrap()
            .unwrap();
        assert!(vehicle.available);

        let err = svc
            .execute(CancelRental { rental_id: r.id })
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::RentalNotActive {
                    status: rental::Status::Cancelled,
                    ..
                },
            ),
            "{err}",
        );
    }
}

//! [`Query`] collection related to the multiple [`Rental`]s.

use common::{operations::By, DateTime};

#[cfg(doc)]
use crate::domain::rental::Status;
use crate::{domain::Rental, read, Service};

use super::{DatabaseQuery, Query};

/// Queries a list of [`Rental`]s.
pub type List = DatabaseQuery<By<Vec<Rental>, read::rental::list::Filter>>;

/// Queries [`Status::Active`] [`Rental`]s, which should have ended before the
/// provided moment.
#[derive(Clone, Copy, Debug)]
pub struct Overdue {
    /// Moment to check the [`Rental`]s against.
    pub now: DateTime,
}

impl Overdue {
    /// Creates a new [`Overdue`] query checking against the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self { now: DateTime::now() }
    }
}

impl<Db> Query<Overdue> for Service<Db>
where
    Self: Query<List>,
{
    type Ok = <Self as Query<List>>::Ok;
    type Err = <Self as Query<List>>::Err;

    async fn execute(
        &self,
        Overdue { now }: Overdue,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(List::by(read::rental::list::Filter::overdue(now)))
            .await
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command,
        domain::{rental, Rental},
        fixture::{add_customer, add_vehicle, at, car, rent, service},
        read::rental::list::Filter,
        Command as _,
    };

    use super::{List, Overdue};

    fn ids(list: Vec<Rental>) -> Vec<rental::Id> {
        sorted(list.into_iter().map(|r| r.id).collect())
    }

    fn sorted(mut ids: Vec<rental::Id>) -> Vec<rental::Id> {
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn reports_overdue_against_injected_moment() {
        let svc = service();
        let c = add_customer(&svc, "john@example.com", "DL1").await;
        let (v1, v2, v3) = (
            add_vehicle(&svc, car("50")).await,
            add_vehicle(&svc, car("50")).await,
            add_vehicle(&svc, car("50")).await,
        );

        let early = svc
            .execute(rent(
                &c,
                &v1,
                "2024-05-01T00:00:00Z",
                "2024-05-03T00:00:00Z",
            ))
            .await
            .unwrap();
        let late = svc
            .execute(rent(
                &c,
                &v2,
                "2024-05-01T00:00:00Z",
                "2024-05-10T00:00:00Z",
            ))
            .await
            .unwrap();
        let done = svc
            .execute(rent(
                &c,
                &v3,
                "2024-05-01T00:00:00Z",
                "2024-05-02T00:00:00Z",
            ))
            .await
            .unwrap();
        _ = svc
            .execute(command::CompleteRental { rental_id: done.id })
            .await
            .unwrap();

        let overdue = |now: &str| svc.execute(Overdue { now: at(now) });

        let found = overdue("2024-04-30T00:00:00Z").await.unwrap();
        assert!(found.is_empty());

        let found = overdue("2024-05-03T00:00:00Z").await.unwrap();
        assert!(found.is_empty(), "ending exactly now is not overdue");

        let found = overdue("2024-05-05T00:00:00Z").await.unwrap();
        assert_eq!(ids(found), [early.id]);

        let found = overdue("2024-06-01T00:00:00Z").await.unwrap();
        assert_eq!(ids(found), sorted(vec![early.id, late.id]));
    }

    #[tokio::test]
    async fn lists_rentals_of_customer() {
        let svc = service();
        let john = add_customer(&svc, "john@example.com", "DL1").await;
        let jane = add_customer(&svc, "jane@example.com", "DL2").await;
        let (v1, v2) = (
            add_vehicle(&svc, car("50")).await,
            add_vehicle(&svc, car("50")).await,
        );

        let of_john = svc
            .execute(rent(
                &john,
                &v1,
                "2024-05-01T00:00:00Z",
                "2024-05-03T00:00:00Z",
            ))
            .await
            .unwrap();
        let of_jane = svc
            .execute(rent(
                &jane,
                &v2,
                "2024-05-01T00:00:00Z",
                "2024-05-03T00:00:00Z",
            ))
            .await
            .unwrap();

        let list = |filter: Filter| svc.execute(List::by(filter));

        let all = list(Filter::default()).await.unwrap();
        assert_eq!(ids(all), sorted(vec![of_john.id, of_jane.id]));

        let found = list(Filter {
            customer_id: Some(jane.id),
            ..Filter::default()
        })
        .await
        .unwrap();
        assert_eq!(ids(found), [of_jane.id]);
    }
}

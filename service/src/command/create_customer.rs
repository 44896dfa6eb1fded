//! [`Command`] for creating a new [`Customer`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::customer::{DriverLicenseNumber, Email, Name, Phone};
use crate::{
    domain::{customer, Customer},
    infra::{
        database::{
            self, CUSTOMER_DRIVER_LICENSE_CONSTRAINT,
            CUSTOMER_EMAIL_CONSTRAINT,
        },
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Customer`].
#[derive(Clone, Debug)]
pub struct CreateCustomer {
    /// First [`Name`] of a new [`Customer`].
    pub first_name: customer::Name,

    /// Last [`Name`] of a new [`Customer`].
    pub last_name: customer::Name,

    /// [`Email`] of a new [`Customer`].
    pub email: customer::Email,

    /// [`Phone`] of a new [`Customer`].
    pub phone: customer::Phone,

    /// [`DriverLicenseNumber`] of a new [`Customer`].
    pub driver_license_number: customer::DriverLicenseNumber,
}

impl<Db> Command<CreateCustomer> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<Customer>, &'l customer::Email>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Customer>, &'l customer::DriverLicenseNumber>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Customer>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Customer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateCustomer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCustomer {
            first_name,
            last_name,
            email,
            phone,
            driver_license_number,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }
        let existing = self
            .database()
            .execute(Select(By::new(&driver_license_number)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::DriverLicenseOccupied(
                driver_license_number
            )));
        }

        let customer = Customer {
            id: customer::Id::new(),
            first_name,
            last_name,
            email,
            phone,
            driver_license_number,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(customer.clone()))
            .await
            .map_err(|e| E::from_unique_violation(e, &customer))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(|e| E::from_unique_violation(e, &customer))
            .map(drop)?;

        Ok(customer)
    }
}

/// Error of [`CreateCustomer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Email`] is already occupied by another [`Customer`].
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] customer::Email),

    /// [`DriverLicenseNumber`] is already occupied by another [`Customer`].
    #[display("`{_0}` driver license number is occupied")]
    DriverLicenseOccupied(
        #[error(not(source))] customer::DriverLicenseNumber,
    ),
}

impl ExecutionError {
    /// Converts the provided [`Database`] error into an [`ExecutionError`],
    /// recognizing the concurrently occupied unique [`Customer`] attributes.
    fn from_unique_violation(
        err: Traced<database::Error>,
        customer: &Customer,
    ) -> Traced<Self> {
        let db = err.as_ref();
        if db.is_unique_violation(CUSTOMER_EMAIL_CONSTRAINT) {
            log::debug!("`{}` email occupied concurrently", customer.email);
            tracerr::new!(Self::EmailOccupied(customer.email.clone()))
        } else if db.is_unique_violation(CUSTOMER_DRIVER_LICENSE_CONSTRAINT) {
            log::debug!(
                "`{}` driver license number occupied concurrently",
                customer.driver_license_number,
            );
            tracerr::new!(Self::DriverLicenseOccupied(
                customer.driver_license_number.clone()
            ))
        } else {
            (tracerr::map_from_and_wrap!(=> Self))(err)
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        fixture::{customer, service},
        query, Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn creates_customer() {
        let svc = service();

        let created = svc
            .execute(customer("john@example.com", "DL1"))
            .await
            .unwrap();
        assert_eq!(created.full_name(), "John Doe");

        let stored = svc
            .execute(query::customer::ById::by(created.id))
            .await
            .unwrap()
            .expect("`Customer` should be stored");
        assert_eq!(stored.email, created.email);
    }

    #[tokio::test]
    async fn refuses_occupied_email() {
        let svc = service();
        drop(svc.execute(customer("john@example.com", "DL1")).await.unwrap());

        let err = svc
            .execute(customer("john@example.com", "DL2"))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::EmailOccupied(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn refuses_occupied_driver_license() {
        let svc = service();
        drop(svc.execute(customer("john@example.com", "DL1")).await.unwrap());

        let err = svc
            .execute(customer("jane@example.com", "DL1"))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::DriverLicenseOccupied(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn admits_single_of_concurrent_duplicates() {
        let svc = service();

        let (first, second) = tokio::join!(
            svc.execute(customer("john@example.com", "DL1")),
            svc.execute(customer("john@example.com", "DL2")),
        );

        assert_eq!(
            usize::from(first.is_ok()) + usize::from(second.is_ok()),
            1,
        );
        let err = first.err().or(second.err()).unwrap();
        assert!(
            matches!(err.as_ref(), ExecutionError::EmailOccupied(_)),
            "{err}",
        );

        let all = svc
            .execute(query::customers::List::by(Default::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }
}

//! [`Command`] for updating a [`Customer`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

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

/// [`Command`] for replacing the personal data of an existing [`Customer`].
#[derive(Clone, Debug)]
pub struct UpdateCustomer {
    /// ID of the [`Customer`] to update.
    pub customer_id: customer::Id,

    /// New first [`Name`] of the [`Customer`].
    pub first_name: customer::Name,

    /// New last [`Name`] of the [`Customer`].
    pub last_name: customer::Name,

    /// New [`Email`] of the [`Customer`].
    pub email: customer::Email,

    /// New [`Phone`] of the [`Customer`].
    pub phone: customer::Phone,

    /// New [`DriverLicenseNumber`] of the [`Customer`].
    pub driver_license_number: customer::DriverLicenseNumber,
}

impl<Db> Command<UpdateCustomer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<Customer>, &'l customer::Email>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Customer>, &'l customer::DriverLicenseNumber>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Customer, customer::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Customer>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Customer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateCustomer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCustomer {
            customer_id,
            first_name,
            last_name,
            email,
            phone,
            driver_license_number,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Customer`.
        tx.execute(Lock(By::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut customer = tx
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let other = tx
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if other.is_some_and(|c| c.id != customer_id) {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }
        let other = tx
            .execute(Select(By::new(&driver_license_number)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if other.is_some_and(|c| c.id != customer_id) {
            return Err(tracerr::new!(E::DriverLicenseOccupied(
                driver_license_number
            )));
        }

        customer.first_name = first_name;
        customer.last_name = last_name;
        customer.email = email;
        customer.phone = phone;
        customer.driver_license_number = driver_license_number;

        tx.execute(Update(customer.clone()))
            .await
            .map_err(|e| E::from_unique_violation(e, &customer))?;
        tx.execute(Commit)
            .await
            .map_err(|e| E::from_unique_violation(e, &customer))?;

        Ok(customer)
    }
}

/// Error of [`UpdateCustomer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] doesn't exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

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
            tracerr::new!(Self::EmailOccupied(customer.email.clone()))
        } else if db.is_unique_violation(CUSTOMER_DRIVER_LICENSE_CONSTRAINT) {
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
        domain::{customer, Customer},
        fixture::{add_customer, service},
        query, Command as _,
    };

    use super::{ExecutionError, UpdateCustomer};

    fn update(c: &Customer, email: &str, license: &str) -> UpdateCustomer {
        UpdateCustomer {
            customer_id: c.id,
            first_name: customer::Name::new("Johnny").unwrap(),
            last_name: c.last_name.clone(),
            email: customer::Email::new(email).unwrap(),
            phone: c.phone.clone(),
            driver_license_number: customer::DriverLicenseNumber::new(
                license,
            )
            .unwrap(),
        }
    }

    #[tokio::test]
    async fn updates_customer_keeping_creation_time() {
        let svc = service();
        let c = add_customer(&svc, "john@example.com", "DL1").await;

        let updated = svc
            .execute(update(&c, "johnny@example.com", "DL1"))
            .await
            .unwrap();
        assert_eq!(updated.id, c.id);
        assert_eq!(updated.full_name(), "Johnny Doe");
        assert_eq!(updated.created_at, c.created_at);

        let stored = svc
            .execute(query::customer::ById::by(c.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.email,
            customer::Email::new("johnny@example.com").unwrap(),
        );
    }

    #[tokio::test]
    async fn allows_keeping_own_unique_attributes() {
        let svc = service();
        let c = add_customer(&svc, "john@example.com", "DL1").await;

        let updated = svc
            .execute(update(&c, "john@example.com", "DL1"))
            .await
            .unwrap();
        assert_eq!(updated.email, c.email);
    }

    #[tokio::test]
    async fn refuses_attributes_of_another_customer() {
        let svc = service();
        let c = add_customer(&svc, "john@example.com", "DL1").await;
        drop(add_customer(&svc, "jane@example.com", "DL2").await);

        let err = svc
            .execute(update(&c, "jane@example.com", "DL1"))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::EmailOccupied(_)),
            "{err}",
        );

        let err = svc
            .execute(update(&c, "john@example.com", "DL2"))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::DriverLicenseOccupied(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn fails_on_unknown_customer() {
        let svc = service();
        let c = add_customer(&svc, "john@example.com", "DL1").await;

        let mut cmd = update(&c, "other@example.com", "DL9");
        cmd.customer_id = customer::Id::new();
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::CustomerNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn reports_unknown_customer_before_occupied_attributes() {
        let svc = service();
        let c = add_customer(&svc, "john@example.com", "DL1").await;

        let mut cmd = update(&c, "john@example.com", "DL1");
        cmd.customer_id = customer::Id::new();
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::CustomerNotExists(_)),
            "{err}",
        );
    }
}

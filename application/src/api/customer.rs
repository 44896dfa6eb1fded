//! [`Customer`]-related REST API definitions.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use common::DateTime;
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, customer},
    query, read, Command as _,
};
use uuid::Uuid;

use crate::{define_error, AsError, Error, Service};

/// A customer renting vehicles.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique identifier of this [`Customer`].
    pub id: Uuid,

    /// First name of this [`Customer`].
    pub first_name: String,

    /// Last name of this [`Customer`].
    pub last_name: String,

    /// First and last names of this [`Customer`] joined by a space.
    pub full_name: String,

    /// Email address of this [`Customer`].
    pub email: String,

    /// Phone number of this [`Customer`].
    pub phone_number: String,

    /// Driver license number of this [`Customer`].
    pub driver_license_number: String,

    /// [`DateTime`] when this [`Customer`] was created.
    pub created_at: DateTime,
}

impl From<domain::Customer> for Customer {
    fn from(customer: domain::Customer) -> Self {
        let full_name = customer.full_name();
        let domain::Customer {
            id,
            first_name,
            last_name,
            email,
            phone,
            driver_license_number,
            created_at,
        } = customer;

        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            full_name,
            email: email.to_string(),
            phone_number: phone.to_string(),
            driver_license_number: driver_license_number.to_string(),
            created_at: created_at.coerce(),
        }
    }
}

/// Attributes of a new or an updated [`Customer`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    /// First name of the [`Customer`].
    pub first_name: String,

    /// Last name of the [`Customer`].
    pub last_name: String,

    /// Email address of the [`Customer`].
    pub email: String,

    /// Phone number of the [`Customer`].
    pub phone_number: String,

    /// Driver license number of the [`Customer`].
    pub driver_license_number: String,
}

impl TryFrom<CustomerInput> for command::CreateCustomer {
    type Error = Error;

    fn try_from(input: CustomerInput) -> Result<Self, Self::Error> {
        let CustomerInput {
            first_name,
            last_name,
            email,
            phone_number,
            driver_license_number,
        } = input;

        Ok(Self {
            first_name: customer::Name::new(first_name.trim())
                .ok_or(ValidationError::FirstName)?,
            last_name: customer::Name::new(last_name.trim())
                .ok_or(ValidationError::LastName)?,
            email: customer::Email::new(email.trim())
                .ok_or(ValidationError::Email)?,
            phone: customer::Phone::new(phone_number.trim())
                .ok_or(ValidationError::Phone)?,
            driver_license_number: customer::DriverLicenseNumber::new(
                driver_license_number.trim(),
            )
            .ok_or(ValidationError::DriverLicenseNumber)?,
        })
    }
}

impl CustomerInput {
    /// Validates this [`CustomerInput`] and builds a
    /// [`command::UpdateCustomer`] of the [`Customer`] with the provided ID.
    ///
    /// # Errors
    ///
    /// If any of the attributes is invalid.
    pub fn into_update(
        self,
        id: customer::Id,
    ) -> Result<command::UpdateCustomer, Error> {
        let command::CreateCustomer {
            first_name,
            last_name,
            email,
            phone,
            driver_license_number,
        } = command::CreateCustomer::try_from(self)?;

        Ok(command::UpdateCustomer {
            customer_id: id,
            first_name,
            last_name,
            email,
            phone,
            driver_license_number,
        })
    }
}

/// Parameters of a [`Customer`]s search.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Search {
    /// Part of the first or the last name, case-insensitive.
    pub name: Option<String>,
}

define_error! {
    enum ValidationError {
        #[code = "INVALID_FIRST_NAME"]
        #[status = BAD_REQUEST]
        #[message = "`firstName` must be a non-blank string"]
        FirstName,

        #[code = "INVALID_LAST_NAME"]
        #[status = BAD_REQUEST]
        #[message = "`lastName` must be a non-blank string"]
        LastName,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "`email` must be a well-formed email address"]
        Email,

        #[code = "INVALID_PHONE_NUMBER"]
        #[status = BAD_REQUEST]
        #[message = "`phoneNumber` must contain at least 10 digits or \
                     separators"]
        Phone,

        #[code = "INVALID_DRIVER_LICENSE_NUMBER"]
        #[status = BAD_REQUEST]
        #[message = "`driverLicenseNumber` must be a non-blank string"]
        DriverLicenseNumber,
    }
}

define_error! {
    enum CustomerError {
        #[code = "CUSTOMER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Customer` with the provided ID does not exist"]
        NotExists,

        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`email` is occupied by another `Customer`"]
        EmailOccupied,

        #[code = "DRIVER_LICENSE_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`driverLicenseNumber` is occupied by another `Customer`"]
        DriverLicenseOccupied,

        #[code = "CUSTOMER_HAS_RENTALS"]
        #[status = CONFLICT]
        #[message = "`Customer` is referenced by rentals"]
        HasRentals,
    }
}

/// Lists all the [`Customer`]s.
///
/// # Errors
///
/// Only on server-side failures.
#[tracing::instrument(skip_all, fields(api.name = "customers.list"))]
pub async fn list(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Customer>>, Error> {
    list_by(&service, read::customer::list::Filter::default()).await
}

/// Lists the [`Customer`]s whose first or last name contains the provided
/// one.
///
/// # Errors
///
/// - `BAD_REQUEST` - malformed query parameters.
#[tracing::instrument(skip_all, fields(api.name = "customers.search"))]
pub async fn search(
    Extension(service): Extension<Service>,
    WithRejection(Query(Search { name }), _): WithRejection<
        Query<Search>,
        Error,
    >,
) -> Result<Json<Vec<Customer>>, Error> {
    list_by(
        &service,
        read::customer::list::Filter {
            name: name.filter(|n| !n.trim().is_empty()),
        },
    )
    .await
}

/// Lists the [`Customer`]s matching the provided
/// [`read::customer::list::Filter`].
async fn list_by(
    service: &Service,
    filter: read::customer::list::Filter,
) -> Result<Json<Vec<Customer>>, Error> {
    let customers = service
        .execute(query::customers::List::by(filter))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Returns the [`Customer`] with the provided ID.
///
/// # Errors
///
/// - `CUSTOMER_NOT_EXISTS` - [`Customer`] with the provided ID does not
///                           exist.
#[tracing::instrument(skip_all, fields(api.name = "customers.get"))]
pub async fn get(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<Json<Customer>, Error> {
    service
        .execute(query::customer::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|c| Json(c.into()))
        .ok_or_else(|| CustomerError::NotExists.into())
}

/// Creates a new [`Customer`].
///
/// # Errors
///
/// - `INVALID_*` - invalid attributes of the [`Customer`];
/// - `EMAIL_OCCUPIED` - email is occupied by another [`Customer`];
/// - `DRIVER_LICENSE_OCCUPIED` - driver license number is occupied by another
///                               [`Customer`].
#[tracing::instrument(skip_all, fields(api.name = "customers.create"))]
pub async fn create(
    Extension(service): Extension<Service>,
    WithRejection(Json(input), _): WithRejection<Json<CustomerInput>, Error>,
) -> Result<(StatusCode, Json<Customer>), Error> {
    let cmd: command::CreateCustomer = input.try_into()?;
    let customer = service.execute(cmd).await.map_err(AsError::into_error)?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Replaces all the attributes of the existing [`Customer`].
///
/// # Errors
///
/// - `CUSTOMER_NOT_EXISTS` - [`Customer`] with the provided ID does not
///                           exist;
/// - `INVALID_*` - invalid attributes of the [`Customer`];
/// - `EMAIL_OCCUPIED` - email is occupied by another [`Customer`];
/// - `DRIVER_LICENSE_OCCUPIED` - driver license number is occupied by another
///                               [`Customer`].
#[tracing::instrument(skip_all, fields(api.name = "customers.update"))]
pub async fn update(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
    WithRejection(Json(input), _): WithRejection<Json<CustomerInput>, Error>,
) -> Result<Json<Customer>, Error> {
    let customer = service
        .execute(input.into_update(id.into())?)
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(customer.into()))
}

/// Deletes the [`Customer`], which has never rented anything.
///
/// # Errors
///
/// - `CUSTOMER_NOT_EXISTS` - [`Customer`] with the provided ID does not
///                           exist;
/// - `CUSTOMER_HAS_RENTALS` - [`Customer`] is referenced by rentals.
#[tracing::instrument(skip_all, fields(api.name = "customers.delete"))]
pub async fn delete(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<StatusCode, Error> {
    _ = service
        .execute(command::DeleteCustomer {
            customer_id: id.into(),
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(StatusCode::NO_CONTENT)
}

impl AsError for command::create_customer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::EmailOccupied(_) => CustomerError::EmailOccupied.into(),
            Self::DriverLicenseOccupied(_) => {
                CustomerError::DriverLicenseOccupied.into()
            }
        })
    }
}

impl AsError for command::update_customer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CustomerNotExists(_) => CustomerError::NotExists.into(),
            Self::EmailOccupied(_) => CustomerError::EmailOccupied.into(),
            Self::DriverLicenseOccupied(_) => {
                CustomerError::DriverLicenseOccupied.into()
            }
        })
    }
}

impl AsError for command::delete_customer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CustomerNotExists(_) => CustomerError::NotExists.into(),
            Self::CustomerHasRentals(_) => CustomerError::HasRentals.into(),
        })
    }
}

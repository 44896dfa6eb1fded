//! [`Rental`]-related REST API definitions.

use axum::{extract::Path, http::StatusCode, Extension, Json};
use axum_extra::extract::WithRejection;
use common::{DateTime, Money};
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use service::{command, domain, query, read, Command as _};
use uuid::Uuid;

use crate::{define_error, AsError, Error, Service};

use super::{customer::Customer, vehicle::Vehicle};

/// A rent of a [`Vehicle`] by a [`Customer`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    /// Unique identifier of this [`Rental`].
    pub id: Uuid,

    /// [`Customer`] renting the [`Vehicle`].
    pub customer: Customer,

    /// Rented [`Vehicle`].
    pub vehicle: Vehicle,

    /// [`DateTime`] when this [`Rental`] starts.
    pub start_date: DateTime,

    /// [`DateTime`] when this [`Rental`] ends.
    pub end_date: DateTime,

    /// Total price of this [`Rental`], fixed once it's created.
    pub total_price: Money,

    /// Status of this [`Rental`] in `SCREAMING_SNAKE_CASE`.
    pub status: String,

    /// [`DateTime`] when this [`Rental`] was created.
    pub created_at: DateTime,
}

impl Rental {
    /// Creates a new [`Rental`] out of the provided [`domain::Rental`] along
    /// with its [`Customer`] and [`Vehicle`].
    #[must_use]
    pub fn new(
        rental: domain::Rental,
        customer: Customer,
        vehicle: Vehicle,
    ) -> Self {
        Self {
            id: rental.id.into(),
            customer,
            vehicle,
            start_date: rental.period.start().coerce(),
            end_date: rental.period.end().coerce(),
            total_price: rental.total_price,
            status: rental.status.to_string(),
            created_at: rental.created_at.coerce(),
        }
    }
}

/// Request for renting a [`Vehicle`].
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRental {
    /// ID of the renting [`Customer`].
    pub customer_id: Uuid,

    /// ID of the [`Vehicle`] to rent.
    pub vehicle_id: Uuid,

    /// [`DateTime`] the rent starts at.
    pub start_date: DateTime,

    /// [`DateTime`] the rent ends at.
    pub end_date: DateTime,
}

impl From<NewRental> for command::CreateRental {
    fn from(req: NewRental) -> Self {
        let NewRental {
            customer_id,
            vehicle_id,
            start_date,
            end_date,
        } = req;

        Self {
            customer_id: customer_id.into(),
            vehicle_id: vehicle_id.into(),
            start: start_date.coerce(),
            end: end_date.coerce(),
        }
    }
}

define_error! {
    enum RentalError {
        #[code = "RENTAL_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Rental` with the provided ID does not exist"]
        NotExists,

        #[code = "RENTAL_NOT_ACTIVE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`Rental` is not active anymore"]
        NotActive,

        #[code = "CUSTOMER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Customer` with the provided ID does not exist"]
        CustomerNotExists,

        #[code = "VEHICLE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Vehicle` with the provided ID does not exist"]
        VehicleNotExists,

        #[code = "VEHICLE_NOT_AVAILABLE"]
        #[status = CONFLICT]
        #[message = "`Vehicle` is not available for a rent"]
        VehicleNotAvailable,

        #[code = "INVALID_RENTAL_PERIOD"]
        #[status = CONFLICT]
        #[message = "`endDate` must be after `startDate`"]
        InvalidPeriod,

        #[code = "RENTAL_PERIOD_OVERLAPPED"]
        #[status = CONFLICT]
        #[message = "`Vehicle` is already rented for the requested period"]
        PeriodOverlapped,
    }
}

/// Lists all the [`Rental`]s.
///
/// # Errors
///
/// Only on server-side failures.
#[tracing::instrument(skip_all, fields(api.name = "rentals.list"))]
pub async fn list(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Rental>>, Error> {
    list_by(&service, query::rentals::List::by(Default::default())).await
}

/// Lists the active [`Rental`]s, which should have ended before now.
///
/// # Errors
///
/// Only on server-side failures.
#[tracing::instrument(skip_all, fields(api.name = "rentals.overdue"))]
pub async fn overdue(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Rental>>, Error> {
    list_by(&service, query::rentals::Overdue::now()).await
}

/// Lists the [`Rental`]s of the [`Customer`] with the provided ID.
///
/// # Errors
///
/// - `BAD_REQUEST` - malformed [`Customer`] ID.
#[tracing::instrument(skip_all, fields(api.name = "rentals.ofCustomer"))]
pub async fn of_customer(
    Extension(service): Extension<Service>,
    WithRejection(Path(customer_id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<Json<Vec<Rental>>, Error> {
    list_by(
        &service,
        query::rentals::List::by(read::rental::list::Filter {
            customer_id: Some(customer_id.into()),
            ..Default::default()
        }),
    )
    .await
}

/// Executes the provided [`query::rentals`] and expands the found
/// [`domain::Rental`]s.
async fn list_by<Q>(
    service: &Service,
    query: Q,
) -> Result<Json<Vec<Rental>>, Error>
where
    Service: service::Query<
        Q,
        Ok = Vec<domain::Rental>,
        Err = tracerr::Traced<service::infra::database::Error>,
    >,
{
    let rentals = service.execute(query).await.map_err(AsError::into_error)?;
    Ok(Json(expand(service, rentals).await?))
}

/// Returns the [`Rental`] with the provided ID.
///
/// # Errors
///
/// - `RENTAL_NOT_EXISTS` - [`Rental`] with the provided ID does not exist.
#[tracing::instrument(skip_all, fields(api.name = "rentals.get"))]
pub async fn get(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<Json<Rental>, Error> {
    let rental = service
        .execute(query::rental::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RentalError::NotExists)?;
    Ok(Json(expand_one(&service, rental).await?))
}

/// Rents a [`Vehicle`] by a [`Customer`].
///
/// # Errors
///
/// - `CUSTOMER_NOT_EXISTS` - [`Customer`] with the provided ID does not
///                           exist;
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID does not exist;
/// - `VEHICLE_NOT_AVAILABLE` - [`Vehicle`] is not available for a rent;
/// - `INVALID_RENTAL_PERIOD` - `endDate` is not after `startDate`;
/// - `RENTAL_PERIOD_OVERLAPPED` - [`Vehicle`] is already rented for the
///                                requested period.
#[tracing::instrument(skip_all, fields(api.name = "rentals.create"))]
pub async fn create(
    Extension(service): Extension<Service>,
    WithRejection(Json(req), _): WithRejection<Json<NewRental>, Error>,
) -> Result<(StatusCode, Json<Rental>), Error> {
    let rental = service
        .execute(command::CreateRental::from(req))
        .await
        .map_err(AsError::into_error)?;
    Ok((StatusCode::CREATED, Json(expand_one(&service, rental).await?)))
}

/// Completes the active [`Rental`], releasing its [`Vehicle`].
///
/// # Errors
///
/// - `RENTAL_NOT_EXISTS` - [`Rental`] with the provided ID does not exist;
/// - `RENTAL_NOT_ACTIVE` - [`Rental`] is already completed or cancelled.
#[tracing::instrument(skip_all, fields(api.name = "rentals.complete"))]
pub async fn complete(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<Json<Rental>, Error> {
    let rental = service
        .execute(command::CompleteRental { rental_id: id.into() })
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(expand_one(&service, rental).await?))
}

/// Cancels the active [`Rental`], releasing its [`Vehicle`].
///
/// # Errors
///
/// - `RENTAL_NOT_EXISTS` - [`Rental`] with the provided ID does not exist;
/// - `RENTAL_NOT_ACTIVE` - [`Rental`] is already completed or cancelled.
#[tracing::instrument(skip_all, fields(api.name = "rentals.cancel"))]
pub async fn cancel(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<Json<Rental>, Error> {
    let rental = service
        .execute(command::CancelRental { rental_id: id.into() })
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(expand_one(&service, rental).await?))
}

/// Expands the provided [`domain::Rental`] with its [`Customer`] and
/// [`Vehicle`].
async fn expand_one(
    service: &Service,
    rental: domain::Rental,
) -> Result<Rental, Error> {
    let id = rental.id;
    expand(service, vec![rental])
        .await?
        .pop()
        .ok_or_else(|| Error::internal(&format!("`Rental(id: {id})` lost")))
}

/// Expands the provided [`domain::Rental`]s with their [`Customer`]s and
/// [`Vehicle`]s, preserving the order.
async fn expand(
    service: &Service,
    rentals: Vec<domain::Rental>,
) -> Result<Vec<Rental>, Error> {
    let customer_ids = rentals.iter().map(|r| r.customer_id).unique();
    let customers = service
        .execute(query::customers::ByIds::by(customer_ids.collect()))
        .await
        .map_err(AsError::into_error)?;

    let vehicle_ids = rentals.iter().map(|r| r.vehicle_id).unique();
    let vehicles = service
        .execute(query::vehicles::ByIds::by(vehicle_ids.collect()))
        .await
        .map_err(AsError::into_error)?;

    rentals
        .into_iter()
        .map(|r| {
            let customer = customers.get(&r.customer_id).cloned().ok_or_else(
                || {
                    Error::internal(&format!(
                        "`Customer(id: {})` of `Rental(id: {})` does not exist",
                        r.customer_id, r.id,
                    ))
                },
            )?;
            let vehicle = vehicles.get(&r.vehicle_id).cloned().ok_or_else(
                || {
                    Error::internal(&format!(
                        "`Vehicle(id: {})` of `Rental(id: {})` does not exist",
                        r.vehicle_id, r.id,
                    ))
                },
            )?;
            Ok(Rental::new(r, customer.into(), vehicle.into()))
        })
        .collect()
}

impl AsError for command::create_rental::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CustomerNotExists(_) => RentalError::CustomerNotExists.into(),
            Self::VehicleNotExists(_) => RentalError::VehicleNotExists.into(),
            Self::VehicleNotAvailable(_) => {
                RentalError::VehicleNotAvailable.into()
            }
            Self::InvalidPeriod => RentalError::InvalidPeriod.into(),
            Self::PeriodOverlapped { .. } => {
                RentalError::PeriodOverlapped.into()
            }
        })
    }
}

impl AsError for command::close_rental::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::RentalNotExists(_) => RentalError::NotExists.into(),
            Self::RentalNotActive { .. } => RentalError::NotActive.into(),
        })
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::{
        command::{close_rental, create_rental},
        domain::{customer, rental, vehicle},
    };

    use crate::AsError as _;

    use super::NewRental;

    #[test]
    fn converts_request_into_command() {
        let req: NewRental = serde_json::from_value(serde_json::json!({
            "customerId": "5b4c7d1e-8f0a-4b2c-9d3e-6f7a8b9c0d1e",
            "vehicleId": "0f1e2d3c-4b5a-4978-8695-a4b3c2d1e0f9",
            "startDate": "2024-05-01T10:00:00Z",
            "endDate": "2024-05-04T10:00:00+02:00"
        }))
        .unwrap();

        let cmd = create_rental::CreateRental::from(req);
        assert_eq!(
            cmd.start.coerce::<()>(),
            DateTime::from_rfc3339("2024-05-01T10:00:00Z").unwrap(),
        );
        assert_eq!(
            cmd.end.coerce::<()>(),
            DateTime::from_rfc3339("2024-05-04T08:00:00Z").unwrap(),
        );
    }

    #[test]
    fn rejects_malformed_request() {
        let parse = |json| serde_json::from_value::<NewRental>(json);

        assert!(parse(serde_json::json!({
            "customerId": "not-an-uuid",
            "vehicleId": "0f1e2d3c-4b5a-4978-8695-a4b3c2d1e0f9",
            "startDate": "2024-05-01T10:00:00Z",
            "endDate": "2024-05-04T10:00:00Z"
        }))
        .is_err());
        assert!(parse(serde_json::json!({
            "customerId": "5b4c7d1e-8f0a-4b2c-9d3e-6f7a8b9c0d1e",
            "vehicleId": "0f1e2d3c-4b5a-4978-8695-a4b3c2d1e0f9",
            "startDate": "2024-05-01",
            "endDate": "2024-05-04T10:00:00Z"
        }))
        .is_err());
    }

    #[test]
    fn maps_lifecycle_errors() {
        use create_rental::ExecutionError as E;

        let code = |e: E| {
            let err = e.as_error();
            (err.code, err.status_code.as_u16())
        };

        assert_eq!(
            code(E::CustomerNotExists(customer::Id::new())),
            ("CUSTOMER_NOT_EXISTS", 404),
        );
        assert_eq!(
            code(E::VehicleNotExists(vehicle::Id::new())),
            ("VEHICLE_NOT_EXISTS", 404),
        );
        assert_eq!(
            code(E::VehicleNotAvailable(vehicle::Id::new())),
            ("VEHICLE_NOT_AVAILABLE", 409),
        );
        assert_eq!(code(E::InvalidPeriod), ("INVALID_RENTAL_PERIOD", 409));
        assert_eq!(
            code(E::PeriodOverlapped {
                vehicle_id: vehicle::Id::new(),
                rental_id: rental::Id::new(),
            }),
            ("RENTAL_PERIOD_OVERLAPPED", 409),
        );

        let err = close_rental::ExecutionError::RentalNotActive {
            rental_id: rental::Id::new(),
            status: rental::Status::Completed,
        }
        .as_error();
        assert_eq!(err.code, "RENTAL_NOT_ACTIVE");
        assert_eq!(err.status_code, http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}

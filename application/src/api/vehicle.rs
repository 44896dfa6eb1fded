//! [`Vehicle`]-related REST API definitions.

use std::str::FromStr as _;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use common::{DateTime, Money};
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, vehicle},
    query, read, Command as _,
};
use uuid::Uuid;

use crate::{define_error, AsError, Error, Service};

/// A vehicle available for a rent.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Unique identifier of this [`Vehicle`].
    pub id: Uuid,

    /// Brand of this [`Vehicle`].
    pub brand: String,

    /// Model of this [`Vehicle`].
    pub model: String,

    /// Production year of this [`Vehicle`].
    pub year: i32,

    /// Base price of a single rental day.
    pub daily_rate: Money,

    /// Indicator whether this [`Vehicle`] may be rented right now.
    pub available: bool,

    /// Type-specific [`Details`] of this [`Vehicle`].
    #[serde(flatten)]
    pub details: Details,

    /// [`DateTime`] when this [`Vehicle`] was created.
    pub created_at: DateTime,
}

impl From<domain::Vehicle> for Vehicle {
    fn from(vehicle: domain::Vehicle) -> Self {
        let domain::Vehicle {
            id,
            brand,
            model,
            year,
            daily_rate,
            available,
            details,
            created_at,
        } = vehicle;

        Self {
            id: id.into(),
            brand: brand.to_string(),
            model: model.to_string(),
            year: year.into(),
            daily_rate: daily_rate.into_inner(),
            available,
            details: details.into(),
            created_at: created_at.coerce(),
        }
    }
}

/// Type-specific details of a [`Vehicle`], tagged with its `vehicleType`.
#[derive(Clone, Debug, Serialize)]
#[serde(
    tag = "vehicleType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Details {
    /// [`Vehicle`] is a passenger car.
    Car {
        /// Number of doors.
        doors: i32,

        /// Fuel type in `SCREAMING_SNAKE_CASE`.
        fuel_type: String,

        /// Indicator whether the transmission is automatic.
        automatic: bool,
    },

    /// [`Vehicle`] is a motorcycle.
    Motorcycle {
        /// Engine displacement in cubic centimeters.
        engine_size: i32,

        /// Free-text category of the motorcycle.
        #[serde(rename = "type")]
        kind: String,
    },

    /// [`Vehicle`] is a cargo truck.
    Truck {
        /// Cargo capacity in kilograms.
        capacity: i32,

        /// Indicator whether the truck has a four-wheel drive.
        four_wheel_drive: bool,
    },
}

impl From<vehicle::Details> for Details {
    fn from(details: vehicle::Details) -> Self {
        match details {
            vehicle::Details::Car(car) => Self::Car {
                doors: car.doors.into(),
                fuel_type: car.fuel_type.to_string(),
                automatic: car.automatic,
            },
            vehicle::Details::Motorcycle(moto) => Self::Motorcycle {
                engine_size: moto.engine_size.into(),
                kind: moto.kind.to_string(),
            },
            vehicle::Details::Truck(truck) => Self::Truck {
                capacity: truck.capacity.into(),
                four_wheel_drive: truck.four_wheel_drive,
            },
        }
    }
}

/// Attributes shared by all the new [`Vehicle`]s.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    /// Brand of the [`Vehicle`].
    pub brand: String,

    /// Model of the [`Vehicle`].
    pub model: String,

    /// Production year of the [`Vehicle`].
    pub year: i32,

    /// Base price of a single rental day.
    pub daily_rate: Money,
}

impl NewVehicle {
    /// Validates these attributes and builds a [`command::CreateVehicle`]
    /// with the provided [`vehicle::Details`].
    fn into_command(
        self,
        details: impl Into<vehicle::Details>,
    ) -> Result<command::CreateVehicle, Error> {
        let Self {
            brand,
            model,
            year,
            daily_rate,
        } = self;

        Ok(command::CreateVehicle {
            brand: vehicle::Brand::new(brand.trim())
                .ok_or(ValidationError::Brand)?,
            model: vehicle::Model::new(model.trim())
                .ok_or(ValidationError::Model)?,
            year: vehicle::Year::new(year).ok_or(ValidationError::Year)?,
            daily_rate: vehicle::DailyRate::new(daily_rate)
                .ok_or(ValidationError::DailyRate)?,
            details: details.into(),
        })
    }
}

/// Request for creating a new car.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    /// Shared [`NewVehicle`] attributes.
    #[serde(flatten)]
    pub vehicle: NewVehicle,

    /// Number of doors.
    pub doors: i32,

    /// Fuel type, parsed ignoring ASCII case.
    pub fuel_type: String,

    /// Indicator whether the transmission is automatic.
    pub automatic: bool,
}

impl TryFrom<NewCar> for command::CreateVehicle {
    type Error = Error;

    fn try_from(req: NewCar) -> Result<Self, Self::Error> {
        let NewCar {
            vehicle,
            doors,
            fuel_type,
            automatic,
        } = req;

        let car = vehicle::Car {
            doors: vehicle::Doors::new(doors).ok_or(ValidationError::Doors)?,
            fuel_type: vehicle::FuelType::from_str(fuel_type.trim())
                .map_err(|_| ValidationError::FuelType)?,
            automatic,
        };
        vehicle.into_command(car)
    }
}

/// Request for creating a new motorcycle.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMotorcycle {
    /// Shared [`NewVehicle`] attributes.
    #[serde(flatten)]
    pub vehicle: NewVehicle,

    /// Engine displacement in cubic centimeters.
    pub engine_size: i32,

    /// Free-text category of the motorcycle.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TryFrom<NewMotorcycle> for command::CreateVehicle {
    type Error = Error;

    fn try_from(req: NewMotorcycle) -> Result<Self, Self::Error> {
        let NewMotorcycle {
            vehicle,
            engine_size,
            kind,
        } = req;

        let moto = vehicle::Motorcycle {
            engine_size: vehicle::EngineSize::new(engine_size)
                .ok_or(ValidationError::EngineSize)?,
            kind: vehicle::MotorcycleType::new(kind.trim())
                .ok_or(ValidationError::MotorcycleType)?,
        };
        vehicle.into_command(moto)
    }
}

/// Request for creating a new truck.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTruck {
    /// Shared [`NewVehicle`] attributes.
    #[serde(flatten)]
    pub vehicle: NewVehicle,

    /// Cargo capacity in kilograms.
    pub capacity: i32,

    /// Indicator whether the truck has a four-wheel drive.
    pub four_wheel_drive: bool,
}

impl TryFrom<NewTruck> for command::CreateVehicle {
    type Error = Error;

    fn try_from(req: NewTruck) -> Result<Self, Self::Error> {
        let NewTruck {
            vehicle,
            capacity,
            four_wheel_drive,
        } = req;

        let truck = vehicle::Truck {
            capacity: vehicle::Capacity::new(capacity)
                .ok_or(ValidationError::Capacity)?,
            four_wheel_drive,
        };
        vehicle.into_command(truck)
    }
}

/// Parameters of a [`Vehicle`]s search.
///
/// All of them are optional and combined together.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    /// Part of the brand, case-insensitive.
    pub brand: Option<String>,

    /// Part of the model, case-insensitive.
    pub model: Option<String>,

    /// Earliest production year, inclusive.
    pub min_year: Option<i32>,

    /// Latest production year, inclusive.
    pub max_year: Option<i32>,

    /// Lowest daily rate, inclusive.
    pub min_price: Option<Money>,

    /// Highest daily rate, inclusive.
    pub max_price: Option<Money>,
}

impl From<Search> for read::vehicle::list::Filter {
    fn from(search: Search) -> Self {
        let Search {
            brand,
            model,
            min_year,
            max_year,
            min_price,
            max_price,
        } = search;

        Self {
            brand: brand.filter(|b| !b.trim().is_empty()),
            model: model.filter(|m| !m.trim().is_empty()),
            min_year,
            max_year,
            min_daily_rate: min_price,
            max_daily_rate: max_price,
            available: None,
        }
    }
}

/// Parameters of a [`Vehicle`] availability update.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Availability {
    /// New availability of the [`Vehicle`].
    pub available: bool,
}

define_error! {
    enum ValidationError {
        #[code = "INVALID_BRAND"]
        #[status = BAD_REQUEST]
        #[message = "`brand` must be a non-blank string"]
        Brand,

        #[code = "INVALID_MODEL"]
        #[status = BAD_REQUEST]
        #[message = "`model` must be a non-blank string"]
        Model,

        #[code = "INVALID_YEAR"]
        #[status = BAD_REQUEST]
        #[message = "`year` must be 1900 or later"]
        Year,

        #[code = "INVALID_DAILY_RATE"]
        #[status = BAD_REQUEST]
        #[message = "`dailyRate` must be positive and at most 1000000000"]
        DailyRate,

        #[code = "INVALID_DOORS"]
        #[status = BAD_REQUEST]
        #[message = "`doors` must be at least 2"]
        Doors,

        #[code = "INVALID_FUEL_TYPE"]
        #[status = CONFLICT]
        #[message = "`fuelType` must be one of `GASOLINE`, `DIESEL`, \
                     `ELECTRIC` or `HYBRID`"]
        FuelType,

        #[code = "INVALID_ENGINE_SIZE"]
        #[status = BAD_REQUEST]
        #[message = "`engineSize` must be at least 50cc"]
        EngineSize,

        #[code = "INVALID_MOTORCYCLE_TYPE"]
        #[status = BAD_REQUEST]
        #[message = "`type` must be a non-blank string"]
        MotorcycleType,

        #[code = "INVALID_CAPACITY"]
        #[status = BAD_REQUEST]
        #[message = "`capacity` must be at least 1000kg"]
        Capacity,
    }
}

define_error! {
    enum VehicleError {
        #[code = "VEHICLE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Vehicle` with the provided ID does not exist"]
        NotExists,

        #[code = "VEHICLE_HAS_RENTALS"]
        #[status = CONFLICT]
        #[message = "`Vehicle` is referenced by rentals"]
        HasRentals,
    }
}

/// Lists all the [`Vehicle`]s.
///
/// # Errors
///
/// Only on server-side failures.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.list"))]
pub async fn list(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    list_by(&service, read::vehicle::list::Filter::default()).await
}

/// Lists the [`Vehicle`]s available for a rent.
///
/// # Errors
///
/// Only on server-side failures.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.available"))]
pub async fn available(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    list_by(&service, read::vehicle::list::Filter::available()).await
}

/// Lists the [`Vehicle`]s matching the provided [`Search`].
///
/// # Errors
///
/// - `BAD_REQUEST` - malformed query parameters.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.search"))]
pub async fn search(
    Extension(service): Extension<Service>,
    WithRejection(Query(search), _): WithRejection<Query<Search>, Error>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    list_by(&service, search.into()).await
}

/// Lists the [`Vehicle`]s matching the provided
/// [`read::vehicle::list::Filter`].
async fn list_by(
    service: &Service,
    filter: read::vehicle::list::Filter,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let vehicles = service
        .execute(query::vehicles::List::by(filter))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

/// Returns the [`Vehicle`] with the provided ID.
///
/// # Errors
///
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID does not exist.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.get"))]
pub async fn get(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<Json<Vehicle>, Error> {
    service
        .execute(query::vehicle::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|v| Json(v.into()))
        .ok_or_else(|| VehicleError::NotExists.into())
}

/// Creates a new car.
///
/// # Errors
///
/// - `INVALID_*` - invalid attributes of the car;
/// - `INVALID_FUEL_TYPE` - unknown fuel type.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.createCar"))]
pub async fn create_car(
    Extension(service): Extension<Service>,
    WithRejection(Json(req), _): WithRejection<Json<NewCar>, Error>,
) -> Result<(StatusCode, Json<Vehicle>), Error> {
    create(&service, req.try_into()?).await
}

/// Creates a new motorcycle.
///
/// # Errors
///
/// - `INVALID_*` - invalid attributes of the motorcycle.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.createMotorcycle"))]
pub async fn create_motorcycle(
    Extension(service): Extension<Service>,
    WithRejection(Json(req), _): WithRejection<Json<NewMotorcycle>, Error>,
) -> Result<(StatusCode, Json<Vehicle>), Error> {
    create(&service, req.try_into()?).await
}

/// Creates a new truck.
///
/// # Errors
///
/// - `INVALID_*` - invalid attributes of the truck.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.createTruck"))]
pub async fn create_truck(
    Extension(service): Extension<Service>,
    WithRejection(Json(req), _): WithRejection<Json<NewTruck>, Error>,
) -> Result<(StatusCode, Json<Vehicle>), Error> {
    create(&service, req.try_into()?).await
}

/// Executes the provided [`command::CreateVehicle`].
async fn create(
    service: &Service,
    cmd: command::CreateVehicle,
) -> Result<(StatusCode, Json<Vehicle>), Error> {
    let vehicle = service.execute(cmd).await.map_err(AsError::into_error)?;
    Ok((StatusCode::CREATED, Json(vehicle.into())))
}

/// Marks the [`Vehicle`] as available or not, bypassing the rentals.
///
/// # Errors
///
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID does not exist.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.availability"))]
pub async fn update_availability(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
    WithRejection(Query(Availability { available }), _): WithRejection<
        Query<Availability>,
        Error,
    >,
) -> Result<Json<Vehicle>, Error> {
    let vehicle = service
        .execute(command::UpdateVehicleAvailability {
            vehicle_id: id.into(),
            available,
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(vehicle.into()))
}

/// Deletes the [`Vehicle`], which has never been rented.
///
/// # Errors
///
/// - `VEHICLE_NOT_EXISTS` - [`Vehicle`] with the provided ID does not exist;
/// - `VEHICLE_HAS_RENTALS` - [`Vehicle`] is referenced by rentals.
#[tracing::instrument(skip_all, fields(api.name = "vehicles.delete"))]
pub async fn delete(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, Error>,
) -> Result<StatusCode, Error> {
    _ = service
        .execute(command::DeleteVehicle {
            vehicle_id: id.into(),
        })
        .await
        .map_err(AsError::into_error)?;
    Ok(StatusCode::NO_CONTENT)
}

impl AsError for command::update_vehicle_availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => Some(VehicleError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::VehicleNotExists(_) => VehicleError::NotExists.into(),
            Self::VehicleHasRentals(_) => VehicleError::HasRentals.into(),
        })
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use service::{command, domain::vehicle};

    use super::{Details, NewCar, NewMotorcycle, NewTruck, Search, Vehicle};

    fn car(json: serde_json::Value) -> Result<command::CreateVehicle, String> {
        serde_json::from_value::<NewCar>(json)
            .unwrap()
            .try_into()
            .map_err(|e: crate::Error| e.code.to_owned())
    }

    #[test]
    fn converts_car_request() {
        let cmd = car(serde_json::json!({
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "dailyRate": 49.99,
            "doors": 4,
            "fuelType": "hybrid",
            "automatic": true,
        }))
        .unwrap();

        assert_eq!(cmd.brand.to_string(), "Toyota");
        assert_eq!(cmd.daily_rate.into_inner(), "49.99".parse().unwrap());
        assert!(matches!(
            cmd.details,
            vehicle::Details::Car(vehicle::Car {
                fuel_type: vehicle::FuelType::Hybrid,
                automatic: true,
                ..
            }),
        ));
    }

    #[test]
    fn rejects_invalid_car_request() {
        let base = serde_json::json!({
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "dailyRate": "50",
            "doors": 4,
            "fuelType": "DIESEL",
            "automatic": false,
        });
        let with = |field: &str, value: serde_json::Value| {
            let mut json = base.clone();
            json[field] = value;
            car(json).unwrap_err()
        };

        assert_eq!(with("fuelType", "STEAM".into()), "INVALID_FUEL_TYPE");
        assert_eq!(with("brand", " ".into()), "INVALID_BRAND");
        assert_eq!(with("model", "".into()), "INVALID_MODEL");
        assert_eq!(with("year", 1899.into()), "INVALID_YEAR");
        assert_eq!(with("dailyRate", "0".into()), "INVALID_DAILY_RATE");
        assert_eq!(
            with("dailyRate", "79228162514264337593543950335".into()),
            "INVALID_DAILY_RATE",
        );
        assert_eq!(with("doors", 1.into()), "INVALID_DOORS");
    }

    #[test]
    fn maps_fuel_type_to_conflict() {
        let err = command::CreateVehicle::try_from(NewCar {
            vehicle: serde_json::from_value(serde_json::json!({
                "brand": "Toyota",
                "model": "Corolla",
                "year": 2020,
                "dailyRate": 50,
            }))
            .unwrap(),
            doors: 4,
            fuel_type: "COAL".to_owned(),
            automatic: false,
        })
        .unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[test]
    fn converts_motorcycle_and_truck_requests() {
        let moto: command::CreateVehicle =
            serde_json::from_value::<NewMotorcycle>(serde_json::json!({
                "brand": "Ducati",
                "model": "Monster",
                "year": 2021,
                "dailyRate": 40,
                "engineSize": 1200,
                "type": "Naked",
            }))
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(moto.details.kind(), vehicle::Kind::Motorcycle);

        let truck = command::CreateVehicle::try_from(
            serde_json::from_value::<NewTruck>(serde_json::json!({
                "brand": "Volvo",
                "model": "FH16",
                "year": 2019,
                "dailyRate": 100,
                "capacity": 900,
                "fourWheelDrive": true,
            }))
            .unwrap(),
        )
        .unwrap_err();
        assert_eq!(truck.code, "INVALID_CAPACITY");
    }

    #[test]
    fn serializes_vehicle_with_its_type() {
        let json = serde_json::to_value(Vehicle {
            id: uuid::Uuid::nil(),
            brand: "Ducati".to_owned(),
            model: "Monster".to_owned(),
            year: 2021,
            daily_rate: "40".parse().unwrap(),
            available: true,
            details: Details::Motorcycle {
                engine_size: 1200,
                kind: "Naked".to_owned(),
            },
            created_at: common::DateTime::UNIX_EPOCH,
        })
        .unwrap();

        assert_eq!(json["vehicleType"], "MOTORCYCLE");
        assert_eq!(json["engineSize"], 1200);
        assert_eq!(json["type"], "Naked");
        assert_eq!(json["dailyRate"], "40");
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn converts_search_into_filter() {
        let search: Search = serde_json::from_value(serde_json::json!({
            "brand": "toy",
            "model": "",
            "minYear": 2018,
            "maxPrice": "60",
        }))
        .unwrap();

        let filter = service::read::vehicle::list::Filter::from(search);
        assert_eq!(filter.brand.as_deref(), Some("toy"));
        assert_eq!(filter.model, None);
        assert_eq!(filter.min_year, Some(2018));
        assert_eq!(filter.max_year, None);
        assert_eq!(filter.max_daily_rate, Some("60".parse::<Money>().unwrap()));
        assert_eq!(filter.available, None);
    }
}

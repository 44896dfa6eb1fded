//! Demo data seeding.

use serde::Deserialize;
use service::{
    command::{self, create_customer, create_vehicle},
    domain, infra::database, query, read, Command, Query,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    api::{
        customer::CustomerInput,
        vehicle::{NewCar, NewMotorcycle, NewTruck},
    },
    AsError, Error,
};

/// Demo data in JSON format.
const DATA: &str = include_str!("seed.json");

/// Demo data to be seeded.
#[derive(Debug, Deserialize)]
struct Data {
    /// Cars to be created.
    cars: Vec<NewCar>,

    /// Motorcycles to be created.
    motorcycles: Vec<NewMotorcycle>,

    /// Trucks to be created.
    trucks: Vec<NewTruck>,

    /// Customers to be created.
    customers: Vec<CustomerInput>,
}

/// Seeds the demo vehicles and customers, unless the database already
/// contains any of them.
///
/// Returns `false` if nothing has been seeded.
///
/// # Errors
///
/// If the demo data is invalid or the [`Service`] fails to store it.
///
/// [`Service`]: service::Service
pub async fn run<Db>(service: &service::Service<Db>) -> Result<bool, Error>
where
    service::Service<Db>: Query<
            query::vehicles::List,
            Ok = Vec<domain::Vehicle>,
            Err = Traced<database::Error>,
        > + Query<
            query::customers::List,
            Ok = Vec<domain::Customer>,
            Err = Traced<database::Error>,
        > + Command<
            command::CreateVehicle,
            Ok = domain::Vehicle,
            Err = Traced<create_vehicle::ExecutionError>,
        > + Command<
            command::CreateCustomer,
            Ok = domain::Customer,
            Err = Traced<create_customer::ExecutionError>,
        >,
{
    let vehicles = service
        .execute(query::vehicles::List::by(
            read::vehicle::list::Filter::default(),
        ))
        .await
        .map_err(AsError::into_error)?;
    let customers = service
        .execute(query::customers::List::by(
            read::customer::list::Filter::default(),
        ))
        .await
        .map_err(AsError::into_error)?;
    if !vehicles.is_empty() || !customers.is_empty() {
        log::info!("database is not empty, skipping demo data");
        return Ok(false);
    }

    let Data {
        cars,
        motorcycles,
        trucks,
        customers,
    } = serde_json::from_str(DATA).map_err(|e| {
        Error::internal(&format!("failed to parse demo data: {e}"))
    })?;

    let vehicles = cars
        .into_iter()
        .map(command::CreateVehicle::try_from)
        .chain(
            motorcycles
                .into_iter()
                .map(command::CreateVehicle::try_from),
        )
        .chain(trucks.into_iter().map(command::CreateVehicle::try_from))
        .collect::<Result<Vec<_>, _>>()?;
    let customers = customers
        .into_iter()
        .map(command::CreateCustomer::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let (vehicles_count, customers_count) = (vehicles.len(), customers.len());
    for cmd in vehicles {
        _ = service.execute(cmd).await.map_err(AsError::into_error)?;
    }
    for cmd in customers {
        _ = service.execute(cmd).await.map_err(AsError::into_error)?;
    }

    log::info!(
        "seeded {vehicles_count} demo vehicles and {customers_count} demo \
         customers",
    );

    Ok(true)
}

#[cfg(test)]
mod spec {
    use service::{
        command,
        domain::{customer, vehicle},
        infra::Memory,
        query, read, Command as _, Service,
    };

    #[tokio::test]
    async fn seeds_empty_database_once() {
        let svc = Service::new(Memory::new());

        assert!(super::run(&svc).await.unwrap());

        let vehicles = svc
            .execute(query::vehicles::List::by(
                read::vehicle::list::Filter::default(),
            ))
            .await
            .unwrap();
        let count = |kind: vehicle::Kind| {
            vehicles.iter().filter(|v| v.kind() == kind).count()
        };
        assert_eq!(count(vehicle::Kind::Car), 2);
        assert_eq!(count(vehicle::Kind::Motorcycle), 2);
        assert_eq!(count(vehicle::Kind::Truck), 1);
        assert!(vehicles.iter().all(|v| v.available));

        let customers = svc
            .execute(query::customers::List::by(
                read::customer::list::Filter::default(),
            ))
            .await
            .unwrap();
        assert_eq!(customers.len(), 3);

        assert!(!super::run(&svc).await.unwrap());
        let vehicles = svc
            .execute(query::vehicles::List::by(
                read::vehicle::list::Filter::default(),
            ))
            .await
            .unwrap();
        assert_eq!(vehicles.len(), 5);
    }

    #[tokio::test]
    async fn skips_database_with_customers() {
        let svc = Service::new(Memory::new());
        _ = svc
            .execute(command::CreateCustomer {
                first_name: customer::Name::new("Jane").unwrap(),
                last_name: customer::Name::new("Roe").unwrap(),
                email: customer::Email::new("jane.roe@example.com").unwrap(),
                phone: customer::Phone::new("+1 555 010 0001").unwrap(),
                driver_license_number: customer::DriverLicenseNumber::new(
                    "DL-1",
                )
                .unwrap(),
            })
            .await
            .unwrap();

        assert!(!super::run(&svc).await.unwrap());

        let vehicles = svc
            .execute(query::vehicles::List::by(
                read::vehicle::list::Filter::default(),
            ))
            .await
            .unwrap();
        assert!(vehicles.is_empty());
    }
}

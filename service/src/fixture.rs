//! Shared fixtures of [`Service`] tests.

use common::{DateTime, DateTimeOf, Money};

use crate::{
    command::{self, Command as _},
    domain::{customer, vehicle, Customer, Vehicle},
    infra::Memory,
    Service,
};

/// [`Service`] backed by an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(Memory::new())
}

/// Parses the provided RFC 3339 string into a [`DateTime`].
pub(crate) fn at<Of: ?Sized>(s: &str) -> DateTimeOf<Of> {
    DateTime::from_rfc3339(s).unwrap().coerce()
}

/// Parses the provided string into [`Money`].
pub(crate) fn money(s: &str) -> Money {
    s.parse().unwrap()
}

/// [`command::CreateVehicle`] of a manual [`vehicle::Car`] with the provided
/// daily rate.
pub(crate) fn car(rate: &str) -> command::CreateVehicle {
    command::CreateVehicle {
        brand: vehicle::Brand::new("Toyota").unwrap(),
        model: vehicle::Model::new("Corolla").unwrap(),
        year: vehicle::Year::new(2020).unwrap(),
        daily_rate: vehicle::DailyRate::new(money(rate)).unwrap(),
        details: vehicle::Car {
            doors: vehicle::Doors::new(4).unwrap(),
            fuel_type: vehicle::FuelType::Gasoline,
            automatic: false,
        }
        .into(),
    }
}

/// [`command::CreateCustomer`] with the provided email and driver license
/// number.
pub(crate) fn customer(email: &str, license: &str) -> command::CreateCustomer {
    command::CreateCustomer {
        first_name: customer::Name::new("John").unwrap(),
        last_name: customer::Name::new("Doe").unwrap(),
        email: customer::Email::new(email).unwrap(),
        phone: customer::Phone::new("+1 555 010 0000").unwrap(),
        driver_license_number: customer::DriverLicenseNumber::new(license)
            .unwrap(),
    }
}

/// Creates a new [`Vehicle`] out of the provided [`command::CreateVehicle`].
pub(crate) async fn add_vehicle(
    svc: &Service<Memory>,
    cmd: command::CreateVehicle,
) -> Vehicle {
    svc.execute(cmd).await.unwrap()
}

/// Creates a new [`Customer`] with the provided email and driver license
/// number.
pub(crate) async fn add_customer(
    svc: &Service<Memory>,
    email: &str,
    license: &str,
) -> Customer {
    svc.execute(customer(email, license)).await.unwrap()
}

/// [`command::CreateRental`] of the provided [`Vehicle`] by the provided
/// [`Customer`] within the provided RFC 3339 boundaries.
pub(crate) fn rent(
    customer: &Customer,
    vehicle: &Vehicle,
    start: &str,
    end: &str,
) -> command::CreateRental {
    command::CreateRental {
        customer_id: customer.id,
        vehicle_id: vehicle.id,
        start: at(start),
        end: at(end),
    }
}

//! [`Command`] definition.

pub mod cancel_rental;
pub mod close_rental;
pub mod complete_rental;
pub mod create_customer;
pub mod create_rental;
pub mod create_vehicle;
pub mod delete_customer;
pub mod delete_vehicle;
pub mod update_customer;
pub mod update_vehicle_availability;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_rental::CancelRental, close_rental::CloseRental,
    complete_rental::CompleteRental, create_customer::CreateCustomer,
    create_rental::CreateRental, create_vehicle::CreateVehicle,
    delete_customer::DeleteCustomer, delete_vehicle::DeleteVehicle,
    update_customer::UpdateCustomer,
    update_vehicle_availability::UpdateVehicleAvailability,
};

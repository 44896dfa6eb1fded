//! REST API definitions.

pub mod customer;
pub mod rental;
pub mod vehicle;

use axum::{
    routing::{get, patch, post},
    Router,
};

pub use self::{customer::Customer, rental::Rental, vehicle::Vehicle};

/// Builds the [`Router`] serving the whole REST API.
///
/// Expects the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route("/vehicles", get(vehicle::list))
        .route("/vehicles/available", get(vehicle::available))
        .route("/vehicles/search", get(vehicle::search))
        .route("/vehicles/cars", post(vehicle::create_car))
        .route("/vehicles/motorcycles", post(vehicle::create_motorcycle))
        .route("/vehicles/trucks", post(vehicle::create_truck))
        .route("/vehicles/:id", get(vehicle::get).delete(vehicle::delete))
        .route(
            "/vehicles/:id/availability",
            patch(vehicle::update_availability),
        )
        .route("/customers", get(customer::list).post(customer::create))
        .route("/customers/search", get(customer::search))
        .route(
            "/customers/:id",
            get(customer::get)
                .put(customer::update)
                .delete(customer::delete),
        )
        .route("/rentals", get(rental::list).post(rental::create))
        .route("/rentals/overdue", get(rental::overdue))
        .route("/rentals/customer/:customer_id", get(rental::of_customer))
        .route("/rentals/:id", get(rental::get))
        .route("/rentals/:id/complete", post(rental::complete))
        .route("/rentals/:id/cancel", post(rental::cancel))
}

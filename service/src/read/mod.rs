//! Read entities definitions.

pub mod customer;
pub mod rental;
pub mod vehicle;

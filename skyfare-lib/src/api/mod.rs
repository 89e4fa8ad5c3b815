//! Amadeus API operations
//!
//! Each module defines a query type, its validation rules, and the
//! [`AmadeusClient`](crate::AmadeusClient) methods that run it.

mod inspiration;
mod locations;

pub use inspiration::*;
pub use locations::*;

//! Typed models

mod flight;
mod location;
mod row;
mod value;

pub use flight::*;
pub use location::*;
pub use row::*;
pub use value::*;

//! Value types for the pantry domain.
//!
//! These wrap user input at the edge (names, quantities, dates, emails) so the
//! rest of the code only ever sees normalized values.

pub mod email;
pub mod expiration;
pub mod id;
pub mod name;
pub mod quantity;

pub use email::{Email, EmailError};
pub use expiration::{InvalidExpiration, days_until, parse_expiration};
pub use id::*;
pub use name::{EmptyName, EntityName};
pub use quantity::{Quantity, RawQuantity};

//! Core type definitions.
//!
//! All types here are plain data: serializable, cloneable, and free of I/O.

mod email;
mod id;
mod price;
mod status;

pub use email::{Email, EmailError};
pub use id::{OrderId, PaymentId, ProductId, UserId};
pub use price::Price;
pub use status::{OrderStatus, PaymentMethod, Role};

//! Typed records exchanged with the backend.
//!
//! This module handles:
//! - The `Resort` record and its editable fields
//! - Field values and their text-input parsing
//! - Ski pass and user records shown on the secondary pages
//! - Lenient decoding of the loosely typed JSON the backend returns

mod de;
mod field;
mod resort;
mod ski_pass;
mod user;

pub use field::{FieldError, FieldKind, FieldValue, ResortField};
pub use resort::{GeoPoint, OpenTotal, RecordId, Resort};
pub use ski_pass::{PassField, PassInputError, Price, Restrictions, SkiPass};
pub use user::{User, UserUpdate};

//! Entity records and response normalization

mod normalize;
mod record;

pub use normalize::{normalize, normalize_owned, ENVELOPE_FIELDS};
pub use record::{EntityRecord, IdentityField, IDENTITY_FIELDS, SCALAR_FIELD};

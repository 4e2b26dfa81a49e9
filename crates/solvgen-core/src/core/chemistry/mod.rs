//! Element identities and standard atomic masses used for molar-mass lookups.

pub mod element;

pub use element::{Element, ParseElementError};

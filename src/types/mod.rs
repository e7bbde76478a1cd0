//! Type definitions for optiscale

mod error;
mod outline;
mod profile;
mod record;
mod savings;

pub use error::*;
pub use outline::*;
pub use profile::*;
pub use record::*;
pub use savings::*;

pub mod error;
pub mod settings;
pub mod units;

pub use error::*;
pub use settings::*;
pub use units::*;

pub mod error;
pub mod io;
pub mod landmarks;
pub mod plot;
pub mod signal;

pub use error::LandmarkError;
pub use landmarks::*;
pub use signal::*;

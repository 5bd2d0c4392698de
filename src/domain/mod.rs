pub mod analysis;
pub mod errors;
pub mod logging;

pub mod forecaster;
pub mod models;
pub mod monte_carlo;


pub use forecaster::*;
pub use models::*;
pub use monte_carlo::*;

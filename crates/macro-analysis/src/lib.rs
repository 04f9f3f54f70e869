pub mod interpret;
pub mod spread;


pub use interpret::*;
pub use spread::*;

pub mod controller;
pub mod markers;
pub mod symbology;

pub use controller::*;
pub use markers::*;
pub use symbology::*;

pub mod envelope;
pub mod source;
pub mod style;

pub use envelope::*;
pub use source::*;
pub use style::*;

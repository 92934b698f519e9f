mod annotation;
mod registry;
mod shape;

pub use annotation::*;
pub use registry::*;
pub use shape::*;

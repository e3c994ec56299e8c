//! Services available to templates at render time

pub mod attributes;
pub mod escape;
pub mod value;

pub use attributes::Attributes;
pub use escape::{Escaper, HtmlEscaper};
pub use value::{Context, Value};

pub mod reference_source;
pub mod result_sink;

pub use reference_source::*;
pub use result_sink::*;

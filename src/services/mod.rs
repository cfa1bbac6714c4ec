pub mod batch;
pub mod browser;
pub mod droid;
#[cfg(test)]
pub mod mock_droid;
pub mod portal;
pub mod resolver;

pub use batch::*;
pub use browser::*;
pub use droid::*;
pub use resolver::*;

pub mod area;
pub mod record;
pub mod reference;

pub mod analyze;
pub mod info;

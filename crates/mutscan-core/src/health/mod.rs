pub mod diagnose;
pub mod model;
pub mod read;
pub mod signatures;

pub mod classify;
pub mod model;
pub mod summary;
pub mod worker;

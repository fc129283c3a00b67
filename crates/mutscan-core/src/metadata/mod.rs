pub mod hunt;
pub mod reader;
pub mod tree;

pub mod budget;
pub mod data;

pub mod interface;
pub mod sources;

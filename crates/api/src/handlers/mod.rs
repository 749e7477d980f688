pub mod dream;
pub mod segment;
pub mod storage;

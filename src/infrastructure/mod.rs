pub mod backends;
pub mod clients;
pub mod storage;

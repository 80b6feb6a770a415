pub mod parser;
pub mod storage;
pub mod repository;

pub mod api;
pub mod catalog;
pub mod config;
pub mod entities;
pub mod middleware;
pub mod storage;

// src/lib.rs

pub mod db;
pub mod http;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::{Database, DbConfig};
pub use textscore_common::Error;

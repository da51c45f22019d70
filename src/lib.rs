pub mod algorithm;
pub mod common;
pub mod config;
pub mod controller;
pub mod error;
pub mod frontier;
pub mod map;
pub mod scenario;
pub mod stat;
pub mod trace;

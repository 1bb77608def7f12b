#![forbid(unsafe_code)]

pub mod auth;
pub mod filter;
pub mod job;

pub mod args;
pub mod certs;
pub mod engine;

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod files;
pub mod handlers;
pub mod schema;
pub mod session;
pub mod utils;
pub mod video;

#[cfg(test)]
mod testing;

pub mod app_state;
pub mod codec;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod lockdown;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod rest;
pub mod services;
pub mod session;
pub mod vault;

#[cfg(test)]
pub mod test_utils;

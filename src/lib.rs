//! Serves a page whose message list is filled, once per load, from a JSON
//! endpoint.

pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod message;
pub mod page;
pub mod render;

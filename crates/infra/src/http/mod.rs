//! HTTP transport shared by the backend adapters

pub mod client;

pub use client::{HttpClient, API_KEY_HEADER};

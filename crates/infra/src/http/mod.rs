//! Thin reqwest wrapper shared by the credential exchange and the pipeline.

mod client;

pub use client::{HttpClient, HttpClientBuilder};

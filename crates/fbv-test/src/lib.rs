//! # fbv-test
//!
//! Testing tools for fbv-rs views.
//!
//! - [`request_factory`] - [`RequestFactory`] builds requests for calling a
//!   view directly, optionally with method flags and bound kwargs
//! - [`client`] - [`TestClient`] sends requests through an axum router in
//!   process and returns [`TestResponse`]s

pub mod client;
pub mod request_factory;

pub use client::{TestClient, TestResponse};
pub use request_factory::RequestFactory;

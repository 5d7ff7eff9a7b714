#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the tunnel connection lifecycle library.
//! 隧道连接生命周期库的根。

pub mod config;
pub mod error;
pub mod state;
pub mod strategy;

pub mod lifecycle;
pub mod manager;

pub mod notify;
pub mod session;

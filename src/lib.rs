// SPDX-License-Identifier: MIT

pub mod app;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use infrastructure::network;

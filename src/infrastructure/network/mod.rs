// SPDX-License-Identifier: MIT

pub mod contracts;
pub mod gateway;
pub mod provider;

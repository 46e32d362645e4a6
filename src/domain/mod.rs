// SPDX-License-Identifier: MIT

pub mod constants;
pub mod error;

// SPDX-License-Identifier: MIT

pub mod batching;
pub mod routing;

// SPDX-License-Identifier: MIT

pub mod keeper;
pub mod orders;
pub mod scheduler;

// SPDX-License-Identifier: MIT

pub mod paths;
pub mod planner;

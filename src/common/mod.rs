// SPDX-License-Identifier: MIT

pub mod parsing;
pub mod retry;

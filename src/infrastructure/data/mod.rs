// SPDX-License-Identifier: MIT

pub mod token_registry;

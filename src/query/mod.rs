// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query module - search and construct listing commands

pub mod constructs;
pub mod search;

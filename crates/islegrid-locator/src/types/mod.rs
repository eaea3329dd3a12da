// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Value types shared by the walker, prober, aggregator and locator.

pub mod cell;
pub mod errors;
pub mod outcome;

pub use cell::*;
pub use errors::*;
pub use outcome::*;

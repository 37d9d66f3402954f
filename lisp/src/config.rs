// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of the forwarding entry engine

use crate::l2fib::DEFAULT_L2FIB_CAPACITY;
use derive_builder::Builder;
use std::fmt::Display;

/// Parameters of a [`crate::LispGpe`]. A builder type `LispGpeParamsBuilder` is
/// derived, with defaults for every field.
#[derive(Builder, Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LispGpeParams {
    #[builder(setter(into), default = "lisp-gpe".to_string())]
    pub name: String,

    /// Whether entries can be added right away
    #[builder(default = true)]
    pub enabled: bool,

    /// Initial capacity of the flat L2 table
    #[builder(default = DEFAULT_L2FIB_CAPACITY)]
    pub l2fib_capacity: usize,
}

impl Default for LispGpeParams {
    fn default() -> Self {
        Self {
            name: "lisp-gpe".to_string(),
            enabled: true,
            l2fib_capacity: DEFAULT_L2FIB_CAPACITY,
        }
    }
}

impl Display for LispGpeParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        writeln!(f, "LISP-GPE config")?;
        writeln!(f, "  name         : {}", self.name)?;
        writeln!(f, "  enabled      : {}", self.enabled)?;
        writeln!(f, "  l2 capacity  : {}", self.l2fib_capacity)
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The error results used by this library.

use crate::key::FwdEntryKey;
use fib::FibError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FwdEntryError {
    #[error("An entry with key {0} is already in the pool")]
    DuplicateKey(FwdEntryKey),

    #[error("Forwarding entry {0} already exists")]
    AlreadyExists(FwdEntryKey),

    #[error("Forwarding entry {0} does not exist")]
    NotFound(FwdEntryKey),

    #[error("Failed to resolve adjacency: {0}")]
    AdjacencyResolution(FibError),

    #[error("Forwarding state error: {0}")]
    Fib(#[from] FibError),

    #[error("Remote and local endpoints must both be prefixes or both be MACs")]
    UnsupportedEndpointKind,

    #[error("LISP is disabled")]
    SubsystemDisabled,

    #[error("No such bridge domain {0}")]
    NoSuchBridgeDomain(u32),

    #[error("Remote and local endpoints are of different address families")]
    FamilyMismatch,

    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
}

/// The error codes reported to callers
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidValue,
    Disabled,
    Unspecified,
}

impl FwdEntryError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            FwdEntryError::DuplicateKey(_)
            | FwdEntryError::AlreadyExists(_)
            | FwdEntryError::NotFound(_)
            | FwdEntryError::FamilyMismatch => ErrorCode::InvalidValue,
            FwdEntryError::SubsystemDisabled => ErrorCode::Disabled,
            FwdEntryError::AdjacencyResolution(_)
            | FwdEntryError::Fib(_)
            | FwdEntryError::UnsupportedEndpointKind
            | FwdEntryError::NoSuchBridgeDomain(_)
            | FwdEntryError::InvalidOperation(_) => ErrorCode::Unspecified,
        }
    }
}

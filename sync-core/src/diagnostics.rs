//! Diagnostic channel for protocol violations.
//!
//! Some requests are wrong for a collection variant but must not fail the
//! caller, which may be generic code unaware of which variant it holds.
//! Those are reported here and otherwise ignored.

use thiserror::Error;

use crate::error::ErrorKind;

/// A request a collection refused without failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// `insert` on a collection whose single value is owned externally.
    #[error("received insert() request in single-slot collection")]
    InsertIntoSingleSlot,
}

impl ProtocolViolation {
    /// Always [`ErrorKind::ProtocolViolation`].
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ProtocolViolation
    }
}

/// Receiver for [`ProtocolViolation`] reports.
pub trait DiagnosticSink: Send + Sync {
    /// Record one violation.
    fn report(&self, violation: ProtocolViolation);
}

/// Default sink: logs each violation at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, violation: ProtocolViolation) {
        tracing::error!(kind = %violation.kind(), "{}", violation);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(ProtocolViolation) + Send + Sync,
{
    fn report(&self, violation: ProtocolViolation) {
        self(violation)
    }
}

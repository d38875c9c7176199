//! The failure accumulator.
//!
//! Recoverable defects found while building a rollup tree are recorded,
//! never thrown: the merge reducer finishes producing a (possibly
//! semantically invalid) parent and reports every finding through a
//! caller-owned [`Diagnostics`] collector, so a simulation pass can
//! surface all defects of a candidate tree in one run instead of
//! stopping at the first.
//!
//! A collector is owned by exactly one proof-construction session.
//! Finalization (outside this crate) must check [`Diagnostics::is_empty`]
//! before treating the session's output as valid.
//!
//! Contract violations — wrong representation mode, capacity mismatch —
//! are *not* findings; they are programmer errors and panic.

use core::fmt;

/// What went wrong: the recoverable-defect taxonomy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FindingKind {
    /// Discontinuous subtree roots or mismatched heights at merge time.
    StructuralMismatch,
    /// The proving engine reported that combining two recursive-proof
    /// tokens did not succeed.
    AggregationFailure,
}

impl FindingKind {
    const STRUCTURAL_MISMATCH_BYTE: u8 = 0x01;
    const AGGREGATION_FAILURE_BYTE: u8 = 0x02;

    /// Single-byte wire form used in the diagnostics payload.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::StructuralMismatch => Self::STRUCTURAL_MISMATCH_BYTE,
            Self::AggregationFailure => Self::AGGREGATION_FAILURE_BYTE,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralMismatch => out.write_str("structural mismatch"),
            Self::AggregationFailure => out.write_str("aggregation failure"),
        }
    }
}

/// One recorded defect.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Finding {
    /// Defect category.
    pub kind: FindingKind,
    /// Human-readable description naming the violated check.
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}: {}", self.kind, self.message)
    }
}

/// Caller-owned collector of recoverable defects for one
/// proof-construction session.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostics {
    /// Which session this collector belongs to, for log readability.
    origin: &'static str,
    findings: Vec<Finding>,
}

impl Diagnostics {
    /// A fresh, empty collector for the named session.
    #[must_use]
    pub fn new(origin: &'static str) -> Self {
        Self {
            origin,
            findings: Vec::new(),
        }
    }

    /// Records one defect. Construction continues after a record — the
    /// caller decides, at finalization, whether the session's output is
    /// usable.
    pub fn record(&mut self, kind: FindingKind, message: impl Into<String>) {
        self.findings.push(Finding {
            kind,
            message: message.into(),
        });
    }

    /// Whether the session completed without recoverable defects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// The session name this collector was created with.
    #[must_use]
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    /// All recorded findings, in recording order.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Serializes every finding for the boundary operation's
    /// diagnostics payload: per finding, one kind byte, a
    /// little-endian u16 message length, and the UTF-8 message bytes.
    /// Empty iff no finding was recorded.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        for finding in &self.findings {
            payload.push(finding.kind.as_byte());
            let message = finding.message.as_bytes();
            let length = u16::try_from(message.len()).unwrap_or(u16::MAX);
            payload.extend_from_slice(&length.to_le_bytes());
            payload.extend_from_slice(message.get(..usize::from(length)).unwrap_or(message));
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_preserves_order_and_payload_is_empty_iff_clean() {
        let mut diag = Diagnostics::new("merge_sim");
        assert!(diag.is_empty());
        assert!(diag.to_payload().is_empty());

        diag.record(FindingKind::StructuralMismatch, "nullifier root discontinuity");
        diag.record(FindingKind::AggregationFailure, "combine rejected");

        assert!(!diag.is_empty());
        assert_eq!(diag.findings().len(), 2);
        assert_eq!(diag.findings()[0].kind, FindingKind::StructuralMismatch);
        assert_eq!(diag.findings()[1].kind, FindingKind::AggregationFailure);

        let payload = diag.to_payload();
        assert_eq!(payload[0], FindingKind::StructuralMismatch.as_byte());
        let expected_len = u16::try_from("nullifier root discontinuity".len()).unwrap();
        assert_eq!(&payload[1..3], &expected_len.to_le_bytes());
    }
}

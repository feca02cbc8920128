// ABOUTME: Phase numbering and the per-user phase state machine
// ABOUTME: PhaseNumber is always within 1..=MAX_PHASE; PhaseState labels NONE/ACTIVE/DONE
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::DomainParseError;
use crate::constants::phases::MAX_PHASE;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A phase number between 1 and [`MAX_PHASE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "i64")]
pub struct PhaseNumber(u8);

impl PhaseNumber {
    /// The first phase
    pub const FIRST: Self = Self(1);
    /// The terminal phase
    pub const LAST: Self = Self(MAX_PHASE);

    /// Validate a raw phase number
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is outside `1..=MAX_PHASE`
    pub fn new(value: i64) -> Result<Self, DomainParseError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=MAX_PHASE).contains(v))
            .map(Self)
            .ok_or_else(|| DomainParseError::new("phase", value.to_string()))
    }

    /// Raw phase number
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The phase that must be finished before this one, if any
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        if self.0 > 1 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }

    /// The phase that follows this one, if any
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.0 < MAX_PHASE {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }

    /// Whether entering this phase needs a paid subscription
    #[must_use]
    pub const fn requires_subscription(self) -> bool {
        self.0 >= 2
    }
}

impl TryFrom<i64> for PhaseNumber {
    type Error = DomainParseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for PhaseNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl fmt::Display for PhaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a user is in the phase progression
///
/// `NONE -> PHASE_1_ACTIVE -> PHASE_1_DONE -> PHASE_2_ACTIVE -> ... -> PHASE_3_DONE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    /// No phase generated yet
    None,
    /// The phase has scheduled days that are not all finished
    Active(PhaseNumber),
    /// Every day of the phase is finished
    Done(PhaseNumber),
}

impl PhaseState {
    /// The phase this state refers to
    #[must_use]
    pub const fn phase(self) -> Option<PhaseNumber> {
        match self {
            Self::None => None,
            Self::Active(phase) | Self::Done(phase) => Some(phase),
        }
    }

    /// Whether no further progression is possible
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Done(PhaseNumber::LAST)
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE"),
            Self::Active(phase) => write!(f, "PHASE_{phase}_ACTIVE"),
            Self::Done(phase) => write!(f, "PHASE_{phase}_DONE"),
        }
    }
}

impl Serialize for PhaseState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_bounds() {
        assert!(PhaseNumber::new(0).is_err());
        assert!(PhaseNumber::new(4).is_err());
        assert!(PhaseNumber::new(-1).is_err());
        assert_eq!(PhaseNumber::new(2).unwrap().get(), 2);
    }

    #[test]
    fn test_phase_neighbours() {
        assert_eq!(PhaseNumber::FIRST.previous(), None);
        assert_eq!(PhaseNumber::LAST.next(), None);
        assert_eq!(PhaseNumber::FIRST.next(), PhaseNumber::new(2).ok());
        assert!(!PhaseNumber::FIRST.requires_subscription());
        assert!(PhaseNumber::LAST.requires_subscription());
    }

    #[test]
    fn test_phase_state_labels() {
        assert_eq!(PhaseState::None.to_string(), "NONE");
        assert_eq!(
            PhaseState::Active(PhaseNumber::FIRST).to_string(),
            "PHASE_1_ACTIVE"
        );
        assert!(PhaseState::Done(PhaseNumber::LAST).is_terminal());
        assert_eq!(
            serde_json::to_value(PhaseState::Done(PhaseNumber::FIRST)).unwrap(),
            "PHASE_1_DONE"
        );
    }
}

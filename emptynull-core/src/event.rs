//! Trigger firing events and the precondition checks run against them.

use crate::InvocationError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PACKED EVENT WORD LAYOUT
// ============================================================================

/// Mask selecting the operation bits of a packed event word.
pub const EVENT_OPMASK: u32 = 0x03;
pub const EVENT_INSERT: u32 = 0x00;
pub const EVENT_DELETE: u32 = 0x01;
pub const EVENT_UPDATE: u32 = 0x02;
pub const EVENT_TRUNCATE: u32 = 0x03;
/// Set when the trigger fires once per row.
pub const EVENT_ROW: u32 = 0x04;
/// Mask selecting the timing bits of a packed event word.
pub const EVENT_TIMINGMASK: u32 = 0x18;
pub const EVENT_BEFORE: u32 = 0x08;
pub const EVENT_AFTER: u32 = 0x00;
pub const EVENT_INSTEAD: u32 = 0x10;

// ============================================================================
// EVENT ENUMS
// ============================================================================

/// Mutation that fired the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOperation {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl TriggerOperation {
    pub fn as_sql_str(&self) -> &'static str {
        match self {
            TriggerOperation::Insert => "INSERT",
            TriggerOperation::Update => "UPDATE",
            TriggerOperation::Delete => "DELETE",
            TriggerOperation::Truncate => "TRUNCATE",
        }
    }
}

impl fmt::Display for TriggerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql_str())
    }
}

/// When the trigger fires relative to the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

/// Invocation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerLevel {
    Row,
    Statement,
}

/// Which version of the row the transform operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectRow {
    /// The row about to be inserted.
    Inserted,
    /// The proposed new version of an updated row.
    UpdatedNew,
}

/// A fully decoded trigger firing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub operation: TriggerOperation,
    pub timing: TriggerTiming,
    pub level: TriggerLevel,
}

impl TriggerEvent {
    pub fn new(operation: TriggerOperation, timing: TriggerTiming, level: TriggerLevel) -> Self {
        Self {
            operation,
            timing,
            level,
        }
    }

    pub fn before_row_insert() -> Self {
        Self::new(TriggerOperation::Insert, TriggerTiming::Before, TriggerLevel::Row)
    }

    pub fn before_row_update() -> Self {
        Self::new(TriggerOperation::Update, TriggerTiming::Before, TriggerLevel::Row)
    }

    /// Decode a packed host event word.
    pub fn from_bits(bits: u32) -> Result<Self, InvocationError> {
        let operation = match bits & EVENT_OPMASK {
            EVENT_INSERT => TriggerOperation::Insert,
            EVENT_DELETE => TriggerOperation::Delete,
            EVENT_UPDATE => TriggerOperation::Update,
            _ => TriggerOperation::Truncate,
        };

        let timing = match bits & EVENT_TIMINGMASK {
            EVENT_BEFORE => TriggerTiming::Before,
            EVENT_AFTER => TriggerTiming::After,
            EVENT_INSTEAD => TriggerTiming::InsteadOf,
            _ => return Err(InvocationError::InvalidEvent { bits }),
        };

        let level = if bits & EVENT_ROW != 0 {
            TriggerLevel::Row
        } else {
            TriggerLevel::Statement
        };

        Ok(Self::new(operation, timing, level))
    }

    /// Encode back into the packed host layout.
    pub fn to_bits(&self) -> u32 {
        let op = match self.operation {
            TriggerOperation::Insert => EVENT_INSERT,
            TriggerOperation::Delete => EVENT_DELETE,
            TriggerOperation::Update => EVENT_UPDATE,
            TriggerOperation::Truncate => EVENT_TRUNCATE,
        };
        let timing = match self.timing {
            TriggerTiming::Before => EVENT_BEFORE,
            TriggerTiming::After => EVENT_AFTER,
            TriggerTiming::InsteadOf => EVENT_INSTEAD,
        };
        let level = match self.level {
            TriggerLevel::Row => EVENT_ROW,
            TriggerLevel::Statement => 0,
        };
        op | timing | level
    }

    /// Run the attachment preconditions and pick the subject row.
    ///
    /// Checks run in a fixed order: granularity, timing, then operation.
    pub fn validate(&self) -> Result<SubjectRow, InvocationError> {
        if self.level != TriggerLevel::Row {
            return Err(InvocationError::NotRowLevel);
        }
        if self.timing != TriggerTiming::Before {
            return Err(InvocationError::NotBefore);
        }
        match self.operation {
            TriggerOperation::Insert => Ok(SubjectRow::Inserted),
            TriggerOperation::Update => Ok(SubjectRow::UpdatedNew),
            TriggerOperation::Delete => Err(InvocationError::DeleteNotSupported),
            TriggerOperation::Truncate => Err(InvocationError::UnsupportedOperation {
                operation: self.operation.to_string(),
            }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

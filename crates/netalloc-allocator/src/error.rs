// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Allocation error types shared by the bitmap, range and manager layers.

use crate::Id;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocatorError {
    #[error("invalid range: base {base} is greater than max {max}")]
    InvalidRange { base: Id, max: Id },

    #[error("offset {offset} is out of bounds for a map of size {size}")]
    OutOfBounds { offset: usize, size: usize },

    #[error("id {id} is not in range {base}-{max}")]
    InvalidId { id: Id, base: Id, max: Id },

    #[error("id {id} is already allocated")]
    AlreadyAllocated { id: Id },

    #[error("{range} is full")]
    Exhausted { range: String },

    #[error("id {id} is outside {range}")]
    OutOfRange { id: Id, range: String },

    #[error("id {id} is already bound to '{holder}'")]
    Conflict { id: Id, holder: String },

    #[error("range {base}-{max} does not fit in memory on this target")]
    RangeTooLarge { base: Id, max: Id },
}

impl AllocatorError {
    /// Whether a later attempt may succeed without the caller changing its input.
    ///
    /// Only exhaustion qualifies: another resource may release its id in the meantime.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AllocatorError::Exhausted { .. })
    }
}

/// Result type for allocator operations
pub type AllocatorResult<T> = Result<T, AllocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exhaustion_is_retryable() {
        let exhausted = AllocatorError::Exhausted {
            range: "VNI range [1-1]".to_string(),
        };
        assert!(exhausted.is_retryable());

        let conflict = AllocatorError::Conflict {
            id: 7,
            holder: "default/a".to_string(),
        };
        assert!(!conflict.is_retryable());
        assert!(!AllocatorError::InvalidRange { base: 2, max: 1 }.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = AllocatorError::InvalidId {
            id: 10,
            base: 100,
            max: 200,
        };
        assert_eq!(err.to_string(), "id 10 is not in range 100-200");

        let err = AllocatorError::Exhausted {
            range: "ASN range [100-100]".to_string(),
        };
        assert_eq!(err.to_string(), "ASN range [100-100] is full");
    }
}

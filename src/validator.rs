// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request validation for the post feed.
//!
//! - Post content length, counted in characters
//! - Requested feed page size

use crate::config::{FeedConfig, ValidationConfig};
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Post content must be between {min} and {max} characters, got {actual}")]
    ContentLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Page size must be between 1 and {max}, got {actual}")]
    PageSize { max: usize, actual: usize },
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Input is valid
    Valid,
    /// Input is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(e) => Err(e),
        }
    }
}

/// Validator for post content and feed paging parameters.
#[derive(Debug, Clone)]
pub struct PostValidator {
    content: ValidationConfig,
    feed: FeedConfig,
}

impl PostValidator {
    /// Create a new validator with the given limits.
    ///
    /// Out of range feed limits are replaced as in [`FeedConfig::sanitized`].
    pub fn new(content: ValidationConfig, feed: FeedConfig) -> Self {
        Self {
            content,
            feed: feed.sanitized(),
        }
    }

    /// Validate post content length.
    pub fn validate_content(&self, content: &str) -> ValidationResult {
        let actual = content.chars().count();
        let (min, max) = (
            self.content.min_content_chars,
            self.content.max_content_chars,
        );

        if (min..=max).contains(&actual) {
            ValidationResult::Valid
        } else {
            debug!(actual, min, max, "Content length out of range");
            ValidationResult::Invalid(ValidationError::ContentLength { min, max, actual })
        }
    }

    /// Resolve the page size for a feed request, applying the default.
    pub fn page_size(&self, requested: Option<usize>) -> Result<usize, ValidationError> {
        let max = self.feed.max_page_size;
        match requested {
            None => Ok(self.feed.default_page_size),
            Some(n) if (1..=max).contains(&n) => Ok(n),
            Some(actual) => {
                debug!(actual, max, "Page size out of range");
                Err(ValidationError::PageSize { max, actual })
            }
        }
    }
}

impl Default for PostValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default(), FeedConfig::default())
    }
}

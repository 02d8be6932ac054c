//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement (in characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error message for a missing display name
pub const MSG_NAME_REQUIRED: &str = "name is required";

/// Error message for a missing email address
pub const MSG_EMAIL_REQUIRED: &str = "email is required";

/// Error message when the email is already held by another account
pub const MSG_EMAIL_TAKEN: &str = "user with this email";

// =============================================================================
// Timestamps
// =============================================================================

/// Sub-second digits kept on entity timestamps.
///
/// Matches PostgreSQL `timestamptz` (microseconds), so a record read back
/// from storage compares equal to the value that was written.
pub const TIMESTAMP_PRECISION_DIGITS: u16 = 6;

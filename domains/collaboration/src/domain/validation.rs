//! Validation helpers for collaboration inputs

/// Check an email given to `invite_collaborator` before it reaches the store
///
/// Only input that can never name a user is rejected. Stored emails are not
/// guaranteed to be well-formed addresses, so anything else is left to the
/// user lookup.
pub fn validate_invite_email(email: &str) -> bool {
    !email.is_empty()
}

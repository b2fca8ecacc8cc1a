use validator::Validate;

use crate::api::errors::ApiError;

/// Runs the payload's declared rules; violations list every offending field.
pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::UnprocessableEntity(e.to_string()))
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Usernames are the local part of the e-mail address.
pub(crate) fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn username_is_local_part() {
        assert_eq!(username_from_email("ada.lovelace@example.com"), "ada.lovelace");
        assert_eq!(username_from_email("no-at-sign"), "no-at-sign");
    }
}

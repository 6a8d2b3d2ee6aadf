use uuid::{Uuid, Variant};

use crate::utils::error::{ApiError, ApiResult};

/// Accepts only the canonical hyphenated UUID v4 form
/// (`xxxxxxxx-xxxx-4xxx-[89ab]xxx-xxxxxxxxxxxx`, any case).
pub fn parse_event_id(raw: &str) -> ApiResult<Uuid> {
    let raw = raw.trim();
    if raw.len() != 36 {
        return Err(invalid_id(raw));
    }
    let id = Uuid::try_parse(raw).map_err(|_| invalid_id(raw))?;
    if id.get_version_num() != 4 || id.get_variant() != Variant::RFC4122 {
        return Err(invalid_id(raw));
    }
    Ok(id)
}

fn invalid_id(raw: &str) -> ApiError {
    ApiError::validation(format!("Invalid event ID: '{}'", raw))
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(name, tld)| !name.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

use crate::error::{AppError, AppResult};

/// Anything but `\d+` does not name a route.
fn digits(raw: &str) -> AppResult<&str> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::not_found(format!("No route found for segment '{raw}'")));
    }
    Ok(raw)
}

/// Parses an id segment. Ids too large for `i64` cannot exist.
pub fn id_param(raw: &str) -> AppResult<i64> {
    digits(raw)?
        .parse()
        .map_err(|_| AppError::not_found(format!("No record with id {raw}")))
}

pub fn quantity_param(raw: &str) -> AppResult<u32> {
    digits(raw)?
        .parse()
        .map_err(|_| AppError::BadRequest(format!("'{raw}' is out of range")))
}

//! Resource name rules checked before synthesis

use types::DEV_NAME_PREFIX;

/// Longest bucket name the provider accepts
pub const MAX_BUCKET_NAME_LEN: usize = 63;
/// Longest repository name the provider accepts
pub const MAX_REPOSITORY_NAME_LEN: usize = 256;

/// Check a bucket base name. The limit leaves room for the development prefix.
pub fn check_bucket_name(name: &str) -> Result<(), String> {
    check_unprefixed(name)?;

    let max_len = MAX_BUCKET_NAME_LEN - DEV_NAME_PREFIX.len();
    if name.len() < 3 || name.len() > max_len {
        return Err(format!("must be between 3 and {} characters", max_len));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err("may only contain lowercase letters, digits, '-' and '.'".to_string());
    }

    if !starts_and_ends_alphanumeric(name) {
        return Err("must start and end with a letter or digit".to_string());
    }

    Ok(())
}

/// Check a container repository base name
pub fn check_repository_name(name: &str) -> Result<(), String> {
    check_unprefixed(name)?;

    let max_len = MAX_REPOSITORY_NAME_LEN - DEV_NAME_PREFIX.len();
    if name.len() < 2 || name.len() > max_len {
        return Err(format!("must be between 2 and {} characters", max_len));
    }

    if !name.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.' | '/')
    }) {
        return Err("may only contain lowercase letters, digits, '-', '_', '.' and '/'".to_string());
    }

    if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err("must start with a letter or digit".to_string());
    }

    Ok(())
}

fn check_unprefixed(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("cannot be empty".to_string());
    }
    if name.starts_with(DEV_NAME_PREFIX) {
        return Err(format!(
            "must not carry the '{}' environment prefix",
            DEV_NAME_PREFIX
        ));
    }
    Ok(())
}

fn starts_and_ends_alphanumeric(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric())
}

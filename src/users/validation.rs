//! Input normalization and validation for user fields.

pub const USERNAME_MESSAGE: &str =
    "Username must be 3-50 characters and contain only letters, numbers, and underscores";
pub const EMAIL_MESSAGE: &str = "Invalid email format";

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;

/// Trim and check a username. Returns the normalized value.
pub fn normalize_username(raw: &str) -> Result<String, &'static str> {
    let username = raw.trim();
    let len = username.chars().count();
    let valid = (USERNAME_MIN..=USERNAME_MAX).contains(&len)
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(username.to_string())
    } else {
        Err(USERNAME_MESSAGE)
    }
}

/// Trim, lowercase and check an email address. Returns the normalized value.
pub fn normalize_email(raw: &str) -> Result<String, &'static str> {
    let email = raw.trim().to_lowercase();
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(EMAIL_MESSAGE)
    }
}

/// `local@domain.tld`: local part of letters, digits and `._%+-`, domain of
/// letters, digits, `.` and `-`, and an alphabetic TLD of two or more letters.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}

// SPDX-License-Identifier: MIT

//! Helpers for deriving display names and usernames from email addresses.

/// Derive a display name from the email local-part: dots stripped, first
/// letter uppercased, the rest lowercased.
pub fn extract_name_from_email(email: &str) -> String {
    let Some((local, _)) = email.split_once('@') else {
        return String::new();
    };

    let name = local.replace('.', "");
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Derive a username from the email local-part (lowercased, dots kept).
pub fn extract_username_from_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) => local.to_lowercase(),
        None => String::new(),
    }
}

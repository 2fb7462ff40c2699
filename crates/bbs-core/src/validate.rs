//! Input normalisation shared by the `New*` and `*Patch` types.

use crate::{Error, Result};

/// Trim `value` and require it to be non-empty and at most `max` chars.
pub(crate) fn text(field: &str, value: &str, max: usize) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::validation(format!("{field} must not be empty")));
  }
  if trimmed.chars().count() > max {
    return Err(Error::validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(trimmed.to_owned())
}

/// Like [`text`], but blank input becomes `None`.
pub(crate) fn optional_text(
  field: &str,
  value: Option<&str>,
  max: usize,
) -> Result<Option<String>> {
  match value.map(str::trim).filter(|v| !v.is_empty()) {
    Some(v) => text(field, v, max).map(Some),
    None => Ok(None),
  }
}

/// Trimmed, lowercased address with a non-empty local part and domain.
pub(crate) fn email(value: &str) -> Result<String> {
  let email = text("email", value, 254)?.to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
    _ => Err(Error::validation("email is not a valid address")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trims_and_bounds() {
    assert_eq!(text("title", "  hi  ", 10).unwrap(), "hi");
    assert!(text("title", "   ", 10).is_err());
    assert!(text("title", "abcdefghijk", 10).is_err());
    assert_eq!(optional_text("bio", Some("  "), 10).unwrap(), None);
    assert_eq!(optional_text("bio", None, 10).unwrap(), None);
  }

  #[test]
  fn emails_need_both_halves() {
    assert_eq!(email(" Bob@Example.COM ").unwrap(), "bob@example.com");
    assert!(email("bob@").is_err());
    assert!(email("@example.com").is_err());
    assert!(email("bob.example.com").is_err());
  }
}

//! Redacting wrapper for the Order Service bearer token.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// Credential text that is zeroed on drop and never printed or serialized.
///
/// Surrounding whitespace is dropped on construction, so a token pasted with
/// a trailing newline still authenticates and a blank token counts as absent.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(raw: impl AsRef<str>) -> Self {
		Self(Zeroizing::new(raw.as_ref().trim().to_string()))
	}

	/// Returns the secret text. Never log the result.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `None` for a blank token, so callers can skip the auth header.
	pub fn non_empty(self) -> Option<Self> {
		(!self.is_empty()).then_some(self)
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SecretString").field(&REDACTED).finish()
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(raw: String) -> Self {
		Self::new(raw)
	}
}

impl From<&str> for SecretString {
	fn from(raw: &str) -> Self {
		Self::new(raw)
	}
}

impl Serialize for SecretString {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = Zeroizing::new(String::deserialize(deserializer)?);
		Ok(Self::new(raw.as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_token_is_redacted() {
		let token = SecretString::from("abc123\n");
		assert_eq!(token.to_string(), REDACTED);
		assert!(!format!("{:?}", token).contains("abc123"));
		assert_eq!(serde_json::to_string(&token).unwrap(), "\"***REDACTED***\"");
		assert_eq!(token.expose_secret(), "abc123");
	}

	#[test]
	fn test_blank_token_is_absent() {
		assert!(SecretString::from("  ").non_empty().is_none());
		assert_eq!(
			SecretString::from(" t ").non_empty(),
			Some(SecretString::from("t"))
		);
	}
}

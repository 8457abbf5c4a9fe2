use anyhow::{Result, ensure};
use serde::Deserialize;

/// Names of the environment variables read by [`EnvCredentials`].
pub const ENV_CONSUMER_KEY: &str = "TWEETMAP_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "TWEETMAP_CONSUMER_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "TWEETMAP_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "TWEETMAP_ACCESS_TOKEN_SECRET";

/// Source of the four OAuth 1.0a secrets.
pub trait CredentialProvider {
	fn consumer_key(&self) -> &str;
	fn consumer_secret(&self) -> &str;
	fn access_token(&self) -> &str;
	fn access_token_secret(&self) -> &str;

	/// Fails if one of the four values is empty.
	fn validate(&self) -> Result<()> {
		for (name, value) in [
			("consumer_key", self.consumer_key()),
			("consumer_secret", self.consumer_secret()),
			("access_token", self.access_token()),
			("access_token_secret", self.access_token_secret()),
		] {
			ensure!(!value.trim().is_empty(), "credential '{name}' is missing or empty");
		}
		Ok(())
	}
}

/// Credentials held in memory, usually deserialized from the `credentials` config section.
#[derive(Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
	#[serde(default)]
	pub consumer_key: String,
	#[serde(default)]
	pub consumer_secret: String,
	#[serde(default)]
	pub access_token: String,
	#[serde(default)]
	pub access_token_secret: String,
}

impl Credentials {
	pub fn new(consumer_key: &str, consumer_secret: &str, access_token: &str, access_token_secret: &str) -> Self {
		Credentials {
			consumer_key: consumer_key.to_string(),
			consumer_secret: consumer_secret.to_string(),
			access_token: access_token.to_string(),
			access_token_secret: access_token_secret.to_string(),
		}
	}

	/// Replaces every value for which `other` has a non-empty one.
	pub fn override_with(&mut self, other: &impl CredentialProvider) {
		fn replace(target: &mut String, value: &str) {
			if !value.is_empty() {
				*target = value.to_string();
			}
		}
		replace(&mut self.consumer_key, other.consumer_key());
		replace(&mut self.consumer_secret, other.consumer_secret());
		replace(&mut self.access_token, other.access_token());
		replace(&mut self.access_token_secret, other.access_token_secret());
	}
}

// Secrets never end up in log output.
impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials")
			.field("consumer_key", &redact(&self.consumer_key))
			.field("consumer_secret", &redact(&self.consumer_secret))
			.field("access_token", &redact(&self.access_token))
			.field("access_token_secret", &redact(&self.access_token_secret))
			.finish()
	}
}

fn redact(value: &str) -> &'static str {
	if value.is_empty() { "<empty>" } else { "***" }
}

impl CredentialProvider for Credentials {
	fn consumer_key(&self) -> &str {
		&self.consumer_key
	}
	fn consumer_secret(&self) -> &str {
		&self.consumer_secret
	}
	fn access_token(&self) -> &str {
		&self.access_token
	}
	fn access_token_secret(&self) -> &str {
		&self.access_token_secret
	}
}

/// Credentials read from `TWEETMAP_*` environment variables. Unset variables are empty.
#[derive(Clone, Debug, Default)]
pub struct EnvCredentials(Credentials);

impl EnvCredentials {
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let get = |name: &str| lookup(name).unwrap_or_default();
		EnvCredentials(Credentials {
			consumer_key: get(ENV_CONSUMER_KEY),
			consumer_secret: get(ENV_CONSUMER_SECRET),
			access_token: get(ENV_ACCESS_TOKEN),
			access_token_secret: get(ENV_ACCESS_TOKEN_SECRET),
		})
	}
}

impl CredentialProvider for EnvCredentials {
	fn consumer_key(&self) -> &str {
		self.0.consumer_key()
	}
	fn consumer_secret(&self) -> &str {
		self.0.consumer_secret()
	}
	fn access_token(&self) -> &str {
		self.0.access_token()
	}
	fn access_token_secret(&self) -> &str {
		self.0.access_token_secret()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn validate() {
		assert!(Credentials::new("a", "b", "c", "d").validate().is_ok());

		let err = Credentials::new("a", "b", " ", "d").validate().unwrap_err();
		assert_eq!(err.to_string(), "credential 'access_token' is missing or empty");

		assert!(Credentials::default().validate().is_err());
	}

	#[test]
	fn env_lookup() {
		let vars: HashMap<&str, &str> = [(ENV_CONSUMER_KEY, "key"), (ENV_ACCESS_TOKEN_SECRET, "ts")].into();
		let env = EnvCredentials::from_lookup(|name| vars.get(name).map(|v| (*v).to_string()));
		assert_eq!(env.consumer_key(), "key");
		assert_eq!(env.consumer_secret(), "");
		assert_eq!(env.access_token(), "");
		assert_eq!(env.access_token_secret(), "ts");
	}

	#[test]
	fn override_with_env() {
		let mut credentials = Credentials::new("a", "b", "c", "d");
		let env = EnvCredentials::from_lookup(|name| (name == ENV_CONSUMER_SECRET).then(|| String::from("B")));
		credentials.override_with(&env);
		assert_eq!(credentials, Credentials::new("a", "B", "c", "d"));
	}

	#[test]
	fn debug_hides_secrets() {
		let text = format!("{:?}", Credentials::new("key", "", "token", "secret"));
		assert!(!text.contains("key\""));
		assert!(!text.contains("secret\""));
		assert!(text.contains("<empty>"));
	}
}

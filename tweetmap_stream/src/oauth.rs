//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).

use crate::CredentialProvider;
use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved characters is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

pub(crate) fn encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Produces `Authorization` header values for signed requests.
#[derive(Clone)]
pub struct OAuthSigner {
	consumer_key: String,
	consumer_secret: String,
	token: String,
	token_secret: String,
}

impl OAuthSigner {
	/// # Errors
	///
	/// Returns an error if one of the credentials is empty.
	pub fn new(credentials: &impl CredentialProvider) -> Result<Self> {
		credentials.validate().context("Failed to set up OAuth signing")?;
		Ok(OAuthSigner {
			consumer_key: credentials.consumer_key().to_string(),
			consumer_secret: credentials.consumer_secret().to_string(),
			token: credentials.access_token().to_string(),
			token_secret: credentials.access_token_secret().to_string(),
		})
	}

	/// Signs a request with a fresh nonce and the current time.
	///
	/// `params` are the query and form body parameters, unencoded.
	pub fn authorization(&self, method: &str, url: &str, params: &[(&str, &str)]) -> Result<String> {
		let timestamp = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.context("system clock is before 1970")?
			.as_secs()
			.to_string();
		let nonce = uuid::Uuid::new_v4().simple().to_string();
		Ok(self.authorization_with(method, url, params, &nonce, &timestamp))
	}

	/// Signs a request with the given nonce and timestamp.
	pub fn authorization_with(
		&self,
		method: &str,
		url: &str,
		params: &[(&str, &str)],
		nonce: &str,
		timestamp: &str,
	) -> String {
		let mut oauth_params = vec![
			("oauth_consumer_key", self.consumer_key.as_str()),
			("oauth_nonce", nonce),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", timestamp),
			("oauth_token", self.token.as_str()),
			("oauth_version", "1.0"),
		];

		let signature = self.signature(method, url, params, &oauth_params);
		oauth_params.push(("oauth_signature", signature.as_str()));
		oauth_params.sort_unstable();

		let fields = oauth_params
			.iter()
			.map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
			.collect::<Vec<_>>()
			.join(", ");
		format!("OAuth {fields}")
	}

	fn signature(&self, method: &str, url: &str, params: &[(&str, &str)], oauth_params: &[(&str, &str)]) -> String {
		let mut pairs: Vec<(String, String)> = params
			.iter()
			.map(|(key, value)| (encode(key), encode(value)))
			.collect();
		pairs.extend(oauth_params.iter().map(|(key, value)| (encode(key), encode(value))));
		pairs.sort();

		let parameter_string = pairs
			.iter()
			.map(|(key, value)| format!("{key}={value}"))
			.collect::<Vec<_>>()
			.join("&");

		let base_string = format!(
			"{}&{}&{}",
			method.to_ascii_uppercase(),
			encode(url),
			encode(&parameter_string)
		);
		log::trace!("OAuth signature base string: {base_string}");

		let key = format!("{}&{}", encode(&self.consumer_secret), encode(&self.token_secret));
		// HMAC accepts keys of any length
		let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
		mac.update(base_string.as_bytes());
		STANDARD.encode(mac.finalize().into_bytes())
	}
}

impl std::fmt::Debug for OAuthSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OAuthSigner").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Credentials;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	fn reference_signer() -> OAuthSigner {
		OAuthSigner::new(&Credentials::new(
			"xvz1evFS4wEEPTGEFPHBog",
			"kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
			"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
			"LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
		))
		.unwrap()
	}

	const REFERENCE_PARAMS: [(&str, &str); 2] = [
		("include_entities", "true"),
		("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
	];

	#[test]
	fn reference_signature() {
		let header = reference_signer().authorization_with(
			"POST",
			"https://api.twitter.com/1.1/statuses/update.json",
			&REFERENCE_PARAMS,
			"kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
			"1318622958",
		);

		assert_eq!(
			header,
			"OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", \
			oauth_nonce=\"kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg\", \
			oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\", \
			oauth_signature_method=\"HMAC-SHA1\", \
			oauth_timestamp=\"1318622958\", \
			oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\", \
			oauth_version=\"1.0\""
		);
	}

	#[test]
	fn fresh_nonce_per_request() {
		let signer = reference_signer();
		let url = "https://stream.twitter.com/1.1/statuses/filter.json";
		let a = signer.authorization("POST", url, &[("locations", "-180,-90,180,90")]).unwrap();
		let b = signer.authorization("POST", url, &[("locations", "-180,-90,180,90")]).unwrap();
		assert!(a.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
		assert_ne!(a, b);
	}

	#[test]
	fn rejects_empty_credentials() {
		assert!(OAuthSigner::new(&Credentials::new("a", "", "c", "d")).is_err());
	}

	#[rstest]
	#[case("abcXYZ019-._~", "abcXYZ019-._~")]
	#[case("Ladies + Gentlemen", "Ladies%20%2B%20Gentlemen")]
	#[case("-180,-90,180,90", "-180%2C-90%2C180%2C90")]
	#[case("ü", "%C3%BC")]
	fn percent_encoding(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(encode(input), expected);
	}
}

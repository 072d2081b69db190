use crate::shared::{AuditError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const DATE_HEADER: &str = "x-ms-date";
pub const CONTENT_HASH_HEADER: &str = "x-ms-content-sha256";

/// Headers produced for one signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub date: String,
    pub content_hash: String,
    pub authorization: String,
}

/// Signs cloud-email requests with the resource access key (HMAC-SHA256).
///
/// The string to sign is `METHOD\npath?query\ndate;host;content-hash`.
pub struct RequestSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Builds a signer from the base64 access key of the resource
    pub fn from_base64_key(access_key: &str) -> Result<Self> {
        let key = STANDARD.decode(access_key.trim()).map_err(|_| {
            AuditError::config(
                "cloud email access key is not valid base64",
                "Copy the access key exactly as shown for the communication resource",
            )
        })?;
        Ok(Self { key })
    }

    pub fn sign(
        &self,
        method: &str,
        url: &reqwest::Url,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<SignedHeaders> {
        let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_hash = STANDARD.encode(Sha256::digest(body));

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(AuditError::delivery(format!("request url has no host: {}", url)).into())
            }
        };
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let string_to_sign = format!(
            "{}\n{}\n{};{};{}",
            method.to_uppercase(),
            path_and_query,
            date,
            host,
            content_hash
        );

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AuditError::delivery(format!("cannot initialise request signer: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            authorization: format!(
                "HMAC-SHA256 SignedHeaders={};host;{}&Signature={}",
                DATE_HEADER, CONTENT_HASH_HEADER, signature
            ),
            date,
            content_hash,
        })
    }
}

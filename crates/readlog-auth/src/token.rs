use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use readlog_types::claim::TimeLimited;
use serde::de::DeserializeOwned;

use crate::error::Result;

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// Issues and checks HS256 signed bearer tokens
pub struct TokenManager {
    keys: Keys,
    default_validity: std::time::Duration,
    header: Header,
    validation: Validation,
}

impl TokenManager {
    pub fn new(secret: impl AsRef<[u8]>, default_validity: std::time::Duration) -> Self {
        Self {
            keys: Keys::new(secret),
            default_validity,
            header: Header::default(),
            validation: Validation::default(),
        }
    }

    pub fn issue(&self, claims: impl serde::Serialize + TimeLimited) -> Result<String> {
        self.issue_until(claims, std::time::SystemTime::now() + self.default_validity)
    }

    pub fn issue_until(
        &self,
        mut claims: impl serde::Serialize + TimeLimited,
        until: std::time::SystemTime,
    ) -> Result<String> {
        claims.set_validity(until);
        let token = encode(&self.header, &claims, &self.keys.encoding)?;
        Ok(token)
    }

    pub fn validate<T>(&self, token: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let data = decode::<T>(token, &self.keys.decoding, &self.validation)?;
        Ok(data.claims)
    }

    pub fn default_validity(&self) -> std::time::Duration {
        self.default_validity
    }
}

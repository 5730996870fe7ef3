use jsonwebtoken::errors::Error as JwtError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
    #[error("Secret file error: {0}")]
    SecretError(#[from] std::io::Error),
    #[error("Invalid secret: {0}")]
    InvalidSecret(&'static str),
}

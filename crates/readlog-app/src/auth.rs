use axum::{extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use http::request::Parts;
use readlog_types::claim::ApiClaim;
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Id of the user, taken from verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

impl FromRequestParts<AppState> for ApiClaim {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                debug!("No bearer token: {e}");
                ApiError::Unauthorized
            })?;

        state
            .tokens()
            .validate::<ApiClaim>(bearer.token())
            .map_err(|e| {
                warn!("Failed to validate token: {e}");
                ApiError::Unauthorized
            })
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claim = ApiClaim::from_request_parts(parts, state).await?;
        claim.user_id().map(CurrentUser).ok_or_else(|| {
            warn!("Token subject {} is not user id", claim.sub);
            ApiError::Unauthorized
        })
    }
}

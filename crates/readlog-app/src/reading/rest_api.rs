use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use axum_extra::extract::WithRejection;
use http::{request::Parts, StatusCode};
use readlog_dal::reading_record::ReadingRecord;
use readlog_types::validation::{
    validate_finish_date_change, validate_reread, validate_score_change, validate_status_change,
    FinishDateChangeRequest, RereadRequest, ScoreChangeRequest, StatusChangeRequest,
};
use serde::{Deserialize, Serialize};

use super::ReadingManager;
use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

impl FromRequestParts<AppState> for ReadingManager {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ReadingManager::from_pool(state.pool()))
    }
}

/// Only the JSON shape is checked on extraction, handlers run the validators to get typed changes
type ValidJson<T> = WithRejection<Json<T>, ApiError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<ReadingRecord>,
}

/// Responds with `null` when record was removed
pub async fn change_status(
    manager: ReadingManager,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(request), _): ValidJson<StatusChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let change = validate_status_change(&request)?;
    let record = manager.change_status(user_id, change).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub async fn change_score(
    manager: ReadingManager,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(request), _): ValidJson<ScoreChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let change = validate_score_change(&request)?;
    let record = manager.change_score(user_id, change).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub async fn change_finish_date(
    manager: ReadingManager,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(request), _): ValidJson<FinishDateChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let change = validate_finish_date_change(&request)?;
    let record = manager.change_finish_date(user_id, change).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub async fn add_reread(
    manager: ReadingManager,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(request), _): ValidJson<RereadRequest>,
) -> ApiResult<impl IntoResponse> {
    let change = validate_reread(&request)?;
    let record = manager.add_reread(user_id, change).await?;
    Ok((StatusCode::OK, Json(record)))
}

pub async fn get_all(
    manager: ReadingManager,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let books = manager.list_all(user_id).await?;
    Ok((StatusCode::OK, Json(BookList { books })))
}

/// Routes for reading records of the authenticated user, nested under /book
pub fn reading_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/changeStatus", post(change_status))
        .route("/changeScore", post(change_score))
        .route("/changeFinishDate", post(change_finish_date))
        .route("/addReread", post(add_reread))
        .route("/getAll", get(get_all))
}

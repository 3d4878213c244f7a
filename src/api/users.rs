// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use tracing::debug;

use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    models::{CreateUserRequest, CreateUserResponse, UserResponse},
    state::AppState,
};

pub const USER_NOT_FOUND: &str = "User does not exist";
pub const USER_FIELDS_REQUIRED: &str = "Please provide first name, last name and email";

/// Look up a user profile by email.
#[utoipa::path(
    get,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Email the profile was created with")
    ),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Email segment is not valid UTF-8"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "No user with this email"),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(email) = path?;
    debug!(subject = %caller.subject, %email, "Fetching user");

    let user = state
        .store
        .get_user(&email)?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    Ok(Json(user.into()))
}

/// Create or overwrite a user profile.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Stored profile", body = CreateUserResponse),
        (status = 400, description = "Missing first name, last name or email"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let Json(request) = payload?;
    let user = request
        .into_record()
        .ok_or_else(|| ApiError::bad_request(USER_FIELDS_REQUIRED))?;

    debug!(subject = %caller.subject, email = %user.email, "Storing user");
    state.store.put_user(&user)?;

    Ok(Json(CreateUserResponse::from(&user)))
}

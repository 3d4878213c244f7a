// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Heart-rate metric endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use tracing::debug;

use crate::{
    auth::AuthenticatedUser,
    error::ApiError,
    models::{MetricPoint, MetricRangeQuery, PostMetricRequest, PostMetricResponse},
    state::AppState,
};

pub const METRIC_FIELDS_REQUIRED: &str = "Please provide deviceId, datetime and email";

/// Record a heart-rate sample, overwriting any sample with the same
/// `(metricId, datetime)`.
#[utoipa::path(
    post,
    path = "/metrics",
    request_body = PostMetricRequest,
    tag = "Metrics",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Stored sample", body = PostMetricResponse),
        (status = 400, description = "Missing deviceId, datetime or email"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn post_metric(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<PostMetricRequest>, JsonRejection>,
) -> Result<Json<PostMetricResponse>, ApiError> {
    let Json(request) = payload?;
    let metric = request
        .into_record()
        .ok_or_else(|| ApiError::bad_request(METRIC_FIELDS_REQUIRED))?;

    debug!(
        subject = %caller.subject,
        metric_id = %metric.metric_id,
        datetime = %metric.datetime,
        "Storing metric"
    );
    state.store.put_metric(&metric)?;

    Ok(Json(PostMetricResponse::from(&metric)))
}

/// Query samples for a metric ID.
///
/// With both `from` and `to` the inclusive range is returned oldest first;
/// otherwise only the most recent sample. A query string that does not
/// deserialize (e.g. a repeated `from`) is treated as absent.
#[utoipa::path(
    get,
    path = "/metrics/{metric_id}",
    params(
        ("metric_id" = String, Path, description = "Composite key `{deviceId}-{email}`"),
        MetricRangeQuery
    ),
    tag = "Metrics",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Matching samples, possibly empty", body = [MetricPoint]),
        (status = 400, description = "Metric ID segment is not valid UTF-8"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_metrics(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<MetricRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<MetricPoint>>, ApiError> {
    let Path(metric_id) = path?;
    let range = match query {
        Ok(Query(range)) => range,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Ignoring unreadable metric range");
            MetricRangeQuery::default()
        }
    };

    let metrics = match range.bounds() {
        Some((from, to)) => {
            debug!(subject = %caller.subject, %metric_id, from, to, "Querying metric range");
            state.store.metrics_between(&metric_id, from, to)?
        }
        None => {
            debug!(subject = %caller.subject, %metric_id, "Querying latest metric");
            state.store.latest_metric(&metric_id)?.into_iter().collect()
        }
    };

    Ok(Json(metrics.into_iter().map(MetricPoint::from).collect()))
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request, response and stored-record types for the two record families.
//! All types derive `Serialize`/`Deserialize` and `ToSchema` for JSON handling
//! and OpenAPI documentation.
//!
//! ## Wire Names
//!
//! Field names follow the stored data, including the camel-cased `deviceId`
//! and `metricId`. `age` and `heart_rate` are strings end to end; existing
//! records depend on that representation, so no numeric types appear here.
//!
//! ## Model Categories
//!
//! - **Users**: profile records keyed by email
//! - **Metrics**: heart-rate samples keyed by `(metricId, datetime)`

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Composite Keys
// =============================================================================

/// Build the metric partition key for a device/email pair.
///
/// The parts are joined verbatim with `-`; neither side is validated, so
/// distinct pairs can collide (`"a-b" + "c"` vs `"a" + "b-c"`).
pub fn metric_id(device_id: &str, email: &str) -> String {
    format!("{device_id}-{email}")
}

/// Returns the value only if it is present and non-empty.
///
/// Required fields treat `""` the same as a missing key.
pub(crate) fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// =============================================================================
// User Models
// =============================================================================

/// A user profile as persisted in the users table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserRecord {
    /// Partition key.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: String,
    #[serde(default, rename = "deviceId")]
    pub device_id: String,
}

/// Request body for `POST /users`.
///
/// Every field is optional at the serde level so that a missing required
/// field surfaces as a 400 with our own message rather than a rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,
}

impl CreateUserRequest {
    /// Convert into a storable record, or `None` if a required field is
    /// missing or empty.
    pub fn into_record(self) -> Option<UserRecord> {
        let first_name = required(&self.first_name)?.to_string();
        let last_name = required(&self.last_name)?.to_string();
        let email = required(&self.email)?.to_string();

        Some(UserRecord {
            email,
            first_name,
            last_name,
            gender: self.gender.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
        })
    }
}

/// Echo returned by `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreateUserResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&UserRecord> for CreateUserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Body returned by `GET /users/{email}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub age: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            gender: user.gender,
            age: user.age,
            device_id: user.device_id,
        }
    }
}

// =============================================================================
// Metric Models
// =============================================================================

/// A heart-rate sample as persisted in the metrics table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MetricRecord {
    /// Partition key, `"{deviceId}-{email}"`.
    #[serde(rename = "metricId")]
    pub metric_id: String,
    /// Sort key. Compared lexicographically, never parsed.
    pub datetime: String,
    #[serde(default)]
    pub heart_rate: String,
}

/// Request body for `POST /metrics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PostMetricRequest {
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,
    pub datetime: Option<String>,
    pub email: Option<String>,
    pub heart_rate: Option<String>,
}

impl PostMetricRequest {
    /// Convert into a storable record, deriving the composite key.
    ///
    /// Returns `None` if `deviceId`, `datetime` or `email` is missing or empty.
    /// A missing `heart_rate` is stored as an empty string.
    pub fn into_record(self) -> Option<MetricRecord> {
        let device_id = required(&self.device_id)?;
        let email = required(&self.email)?;
        let datetime = required(&self.datetime)?.to_string();

        Some(MetricRecord {
            metric_id: metric_id(device_id, email),
            datetime,
            heart_rate: self.heart_rate.unwrap_or_default(),
        })
    }
}

/// Echo returned by `POST /metrics`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PostMetricResponse {
    #[serde(rename = "metricId")]
    pub metric_id: String,
    pub datetime: String,
    pub heart_rate: String,
}

impl From<&MetricRecord> for PostMetricResponse {
    fn from(metric: &MetricRecord) -> Self {
        Self {
            metric_id: metric.metric_id.clone(),
            datetime: metric.datetime.clone(),
            heart_rate: metric.heart_rate.clone(),
        }
    }
}

/// One element of the `GET /metrics/{metricId}` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MetricPoint {
    pub datetime: String,
    pub heart_rate: String,
}

impl From<MetricRecord> for MetricPoint {
    fn from(metric: MetricRecord) -> Self {
        Self {
            datetime: metric.datetime,
            heart_rate: metric.heart_rate,
        }
    }
}

/// Optional inclusive `datetime` range for metric queries.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetricRangeQuery {
    /// Lower bound (inclusive).
    pub from: Option<String>,
    /// Upper bound (inclusive).
    pub to: Option<String>,
}

impl MetricRangeQuery {
    /// Both bounds, if both are present and non-empty.
    pub fn bounds(&self) -> Option<(&str, &str)> {
        Some((required(&self.from)?, required(&self.to)?))
    }
}

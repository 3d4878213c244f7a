// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

pub const GREETING: &str = "Antibiotic backend v0.1";

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service banner", body = String, content_type = "text/plain"))
)]
pub async fn index() -> &'static str {
    GREETING
}

//! Admin reports over sold line items and orders.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::report_service::DEFAULT_WINDOW_DAYS;
use crate::application::reporting::{DailyBucket, DashboardSummary, SummaryRow, TopProducts};
use crate::errors::AppError;
use crate::handlers::session::AdminSession;
use crate::AppState;

const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryRowResponse {
    /// Category or product name
    pub key: String,
    pub count: i64,
    pub quantity: i64,
    pub revenue: String,
}

impl From<SummaryRow> for SummaryRowResponse {
    fn from(row: SummaryRow) -> Self {
        Self {
            key: row.key,
            count: row.count,
            quantity: row.quantity,
            revenue: row.revenue.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProductsResponse {
    pub by_quantity: Vec<SummaryRowResponse>,
    pub by_revenue: Vec<SummaryRowResponse>,
}

impl From<TopProducts> for TopProductsResponse {
    fn from(top: TopProducts) -> Self {
        Self {
            by_quantity: top.by_quantity.into_iter().map(Into::into).collect(),
            by_revenue: top.by_revenue.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyBucketResponse {
    /// Local calendar day (YYYY-MM-DD)
    pub date: String,
    /// dd/mm
    pub label: String,
    pub count: i64,
    pub revenue: String,
}

impl From<DailyBucket> for DailyBucketResponse {
    fn from(bucket: DailyBucket) -> Self {
        Self {
            date: bucket.date.to_string(),
            label: bucket.label,
            count: bucket.count,
            revenue: bucket.revenue.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub total_revenue: String,
    pub completed_orders: i64,
    pub pending_orders: i64,
    pub total_users: i64,
    /// Users created in the last 30 days
    pub new_users: i64,
}

impl From<DashboardSummary> for SummaryResponse {
    fn from(s: DashboardSummary) -> Self {
        Self {
            total_revenue: s.total_revenue.to_string(),
            completed_orders: s.completed_orders,
            pending_orders: s.pending_orders,
            total_users: s.total_users,
            new_users: s.new_users,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopProductsParams {
    /// Entries per ranking (default 10)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyParams {
    /// Trailing window in days, today included (default 30, max 366)
    pub days: Option<usize>,
}

/// GET /reports/revenue-by-category
#[utoipa::path(
    get,
    path = "/reports/revenue-by-category",
    responses(
        (status = 200, description = "Revenue per category, highest first", body = [SummaryRowResponse]),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "reports"
)]
pub async fn revenue_by_category(
    _admin: AdminSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || state.reports.revenue_by_category()).await??;
    let rows: Vec<SummaryRowResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /reports/top-products
///
/// Products are grouped by the name recorded on each line item.
#[utoipa::path(
    get,
    path = "/reports/top-products",
    params(TopProductsParams),
    responses(
        (status = 200, description = "Top products by quantity and by revenue", body = TopProductsResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "reports"
)]
pub async fn top_products(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<TopProductsParams>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT).max(1);
    let top = web::block(move || state.reports.top_products(limit)).await??;
    Ok(HttpResponse::Ok().json(TopProductsResponse::from(top)))
}

/// GET /reports/orders-daily
#[utoipa::path(
    get,
    path = "/reports/orders-daily",
    params(DailyParams),
    responses(
        (status = 200, description = "One bucket per calendar day, oldest first", body = [DailyBucketResponse]),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "reports"
)]
pub async fn orders_daily(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<DailyParams>,
) -> Result<HttpResponse, AppError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let buckets = web::block(move || state.reports.orders_daily(days)).await??;
    let buckets: Vec<DailyBucketResponse> = buckets.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(buckets))
}

/// GET /reports/summary
#[utoipa::path(
    get,
    path = "/reports/summary",
    responses(
        (status = 200, description = "Dashboard totals", body = SummaryResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "reports"
)]
pub async fn summary(
    _admin: AdminSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || state.reports.summary()).await??;
    Ok(HttpResponse::Ok().json(SummaryResponse::from(summary)))
}

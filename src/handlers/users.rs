use actix_web::{web, HttpResponse};

use crate::application::presenter::TableQuery;
use crate::errors::AppError;
use crate::handlers::entities::TableParams;
use crate::handlers::session::AdminSession;
use crate::AppState;

/// GET /users
///
/// Profiles with their admin flag, searchable by email, plus stats over
/// every user.
pub async fn list_users(
    _admin: AdminSession,
    state: web::Data<AppState>,
    params: web::Query<TableParams>,
) -> Result<HttpResponse, AppError> {
    let query = TableQuery::from(params.into_inner());
    let list = web::block(move || state.users.list(&query)).await??;
    Ok(HttpResponse::Ok().json(list))
}

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::support::TicketForm;
use crate::domain::user::SupportTicket;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TicketRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct DataDeletionRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub status: String,
    pub created_at: String,
}

impl From<SupportTicket> for TicketResponse {
    fn from(t: SupportTicket) -> Self {
        Self {
            id: t.id,
            name: t.name,
            email: t.email,
            subject: t.subject,
            status: t.status,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

/// POST /support/tickets
///
/// Public contact form. No session required.
#[utoipa::path(
    post,
    path = "/support/tickets",
    request_body = TicketRequest,
    responses(
        (status = 201, description = "Ticket opened", body = TicketResponse),
        (status = 422, description = "Missing field or malformed email"),
    ),
    tag = "support"
)]
pub async fn open_ticket(
    state: web::Data<AppState>,
    body: web::Json<TicketRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let form = TicketForm {
        name: body.name,
        email: body.email,
        subject: body.subject,
        message: body.message,
    };
    let ticket = web::block(move || state.support.open_ticket(&form)).await??;
    Ok(HttpResponse::Created().json(TicketResponse::from(ticket)))
}

/// POST /support/data-deletion
///
/// Records an account and data deletion request as a support ticket.
#[utoipa::path(
    post,
    path = "/support/data-deletion",
    request_body = DataDeletionRequest,
    responses(
        (status = 201, description = "Request recorded", body = TicketResponse),
        (status = 422, description = "Missing or malformed email"),
    ),
    tag = "support"
)]
pub async fn request_data_deletion(
    state: web::Data<AppState>,
    body: web::Json<DataDeletionRequest>,
) -> Result<HttpResponse, AppError> {
    let email = body.into_inner().email;
    let ticket = web::block(move || state.support.request_data_deletion(&email)).await??;
    Ok(HttpResponse::Created().json(TicketResponse::from(ticket)))
}

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::forms::RaffleForm;
use crate::application::presenter::{Placeholder, TableQuery};
use crate::application::raffle_service::{CreatedRaffle, Draw, RaffleBoard};
use crate::application::session::Session;
use crate::domain::raffle::{Participant, Raffle};
use crate::errors::AppError;
use crate::handlers::entities::{DeleteParams, ImagePayload, TableParams};
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateRaffleRequest {
    pub name: String,
    pub description: String,
    /// Prize product, optional
    pub product_id: String,
    /// YYYY-MM-DD, optional
    pub start_date: String,
    /// YYYY-MM-DD, optional, not before `start_date`
    pub end_date: String,
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RaffleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_by: Uuid,
    pub created_at: String,
}

impl From<Raffle> for RaffleResponse {
    fn from(r: Raffle) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            product_id: r.product_id,
            image_url: r.image_url,
            start_date: r.start_date.map(|d| d.to_rfc3339()),
            end_date: r.end_date.map(|d| d.to_rfc3339()),
            created_by: r.created_by,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RaffleBoardResponse {
    pub rows: Vec<RaffleResponse>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    /// Set when nothing is shown: `{"kind": "empty" | "no_matches", "message": ...}`
    #[schema(value_type = Option<Object>)]
    pub placeholder: Option<Placeholder>,
    /// Users who would be enrolled in a new raffle
    pub user_count: i64,
}

impl From<RaffleBoard> for RaffleBoardResponse {
    fn from(board: RaffleBoard) -> Self {
        let table = board.raffles;
        Self {
            rows: table.rows.into_iter().map(Into::into).collect(),
            total: table.total,
            page: table.page,
            per_page: table.per_page,
            total_pages: table.total_pages,
            placeholder: table.placeholder,
            user_count: board.user_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedRaffleResponse {
    pub raffle: RaffleResponse,
    pub participants: usize,
}

impl From<CreatedRaffle> for CreatedRaffleResponse {
    fn from(created: CreatedRaffle) -> Self {
        Self {
            raffle: created.raffle.into(),
            participants: created.participants,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            user_id: p.user_id,
            email: p.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    pub winner: ParticipantResponse,
    /// Index of the winner in `participants`
    pub winner_index: usize,
    pub participants: Vec<ParticipantResponse>,
    /// Highlighted participant index per tick; the last one is the winner
    pub frames: Vec<usize>,
    pub tick_interval_ms: u64,
}

impl From<Draw> for DrawResponse {
    fn from(draw: Draw) -> Self {
        Self {
            winner: draw.winner.into(),
            winner_index: draw.winner_index,
            participants: draw.participants.into_iter().map(Into::into).collect(),
            frames: draw.frames,
            tick_interval_ms: draw.tick_interval_ms,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RaffleListParams {
    /// Search over name and description
    pub q: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /raffles
#[utoipa::path(
    get,
    path = "/raffles",
    params(RaffleListParams),
    responses(
        (status = 200, description = "Raffles and the current user count", body = RaffleBoardResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "raffles"
)]
pub async fn list_raffles(
    _session: Session,
    state: web::Data<AppState>,
    query: web::Query<RaffleListParams>,
) -> Result<HttpResponse, AppError> {
    let p = query.into_inner();
    let query: TableQuery = TableParams {
        q: p.q,
        page: p.page,
        per_page: p.per_page,
    }
    .into();
    let board = web::block(move || state.raffles.board(&query)).await??;
    Ok(HttpResponse::Ok().json(RaffleBoardResponse::from(board)))
}

/// POST /raffles
///
/// Creates the raffle and enrolls every current user in one transaction.
#[utoipa::path(
    post,
    path = "/raffles",
    request_body = CreateRaffleRequest,
    responses(
        (status = 201, description = "Raffle created", body = CreatedRaffleResponse),
        (status = 422, description = "Invalid draft or image"),
        (status = 409, description = "Rejected by the database"),
    ),
    tag = "raffles"
)]
pub async fn create_raffle(
    session: Session,
    state: web::Data<AppState>,
    body: web::Json<CreateRaffleRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let image = body.image.map(ImagePayload::decode).transpose()?;
    let draft = RaffleForm {
        name: body.name,
        description: body.description,
        product_id: body.product_id,
        start_date: body.start_date,
        end_date: body.end_date,
    };
    let created =
        web::block(move || state.raffles.create(&session, &draft, image.as_ref())).await??;
    Ok(HttpResponse::Created().json(CreatedRaffleResponse::from(created)))
}

/// DELETE /raffles/{id}
#[utoipa::path(
    delete,
    path = "/raffles/{id}",
    params(
        ("id" = Uuid, Path, description = "Raffle UUID"),
        ("confirm" = Option<bool>, Query, description = "Must be true to delete"),
    ),
    responses(
        (status = 204, description = "Raffle deleted"),
        (status = 404, description = "Raffle not found"),
        (status = 428, description = "Deletion not confirmed"),
    ),
    tag = "raffles"
)]
pub async fn delete_raffle(
    _session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let confirmed = params.confirm;
    web::block(move || state.raffles.delete(id, confirmed)).await??;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /raffles/{id}/participants
#[utoipa::path(
    get,
    path = "/raffles/{id}/participants",
    params(
        ("id" = Uuid, Path, description = "Raffle UUID"),
    ),
    responses(
        (status = 200, description = "Enrolled users", body = [ParticipantResponse]),
        (status = 404, description = "Raffle not found"),
    ),
    tag = "raffles"
)]
pub async fn list_participants(
    _session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let participants = web::block(move || state.raffles.participants(id)).await??;
    let participants: Vec<ParticipantResponse> =
        participants.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(participants))
}

/// POST /raffles/{id}/draw
///
/// Draws a winner and returns the spin that lands on it.
#[utoipa::path(
    post,
    path = "/raffles/{id}/draw",
    params(
        ("id" = Uuid, Path, description = "Raffle UUID"),
    ),
    responses(
        (status = 200, description = "Winner drawn", body = DrawResponse),
        (status = 404, description = "Raffle not found"),
        (status = 409, description = "The raffle has no participants"),
    ),
    tag = "raffles"
)]
pub async fn draw_winner(
    _session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let draw = web::block(move || state.raffles.draw(id)).await??;
    Ok(HttpResponse::Ok().json(DrawResponse::from(draw)))
}

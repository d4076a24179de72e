//! Table, form, save and delete endpoints shared by the catalogue entities.

use actix_web::{web, HttpResponse, Scope};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::entity_service::EntityService;
use crate::application::forms::{
    AccessoryForm, EntityForm, NotificationForm, PartnerForm, ProductForm, RedemptionLevelForm,
};
use crate::application::images::ImageUpload;
use crate::application::presenter::{Searchable, TableQuery};
use crate::application::session::Session;
use crate::application::submission::ImageChange;
use crate::domain::catalog::{Accessory, Product};
use crate::domain::marketing::{Notification, Partner, RedemptionLevel};
use crate::domain::ports::Entity;
use crate::errors::AppError;
use crate::AppState;

/// An entity served through the generic endpoints.
pub trait CatalogEntity: Entity + Searchable + Serialize {
    type Form: EntityForm<Record = Self>;
    const ADMIN_ONLY: bool = false;

    fn service(state: &AppState) -> &EntityService<Self>;
}

impl CatalogEntity for Product {
    type Form = ProductForm;

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.products
    }
}

impl CatalogEntity for Accessory {
    type Form = AccessoryForm;

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.accessories
    }
}

impl CatalogEntity for Notification {
    type Form = NotificationForm;

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.notifications
    }
}

impl CatalogEntity for Partner {
    type Form = PartnerForm;

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.partners
    }
}

impl CatalogEntity for RedemptionLevel {
    type Form = RedemptionLevelForm;
    const ADMIN_ONLY: bool = true;

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.redemption_levels
    }
}

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl From<TableParams> for TableQuery {
    fn from(p: TableParams) -> Self {
        TableQuery::new(p.q, p.page, p.per_page)
    }
}

/// An image carried inline in a JSON body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ImagePayload {
    pub file_name: String,
    /// MIME type, e.g. "image/png"
    pub content_type: String,
    /// Base64-encoded file content
    pub data: String,
}

impl ImagePayload {
    pub fn decode(self) -> Result<ImageUpload, AppError> {
        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|e| AppError::BadRequest(format!("image data is not valid base64: {e}")))?;
        Ok(ImageUpload {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "F: DeserializeOwned"))]
pub struct SaveRequest<F> {
    #[serde(flatten)]
    pub draft: F,
    #[serde(default)]
    pub image: Option<ImagePayload>,
    #[serde(default)]
    pub remove_image: bool,
}

impl<F> SaveRequest<F> {
    fn into_parts(self) -> Result<(F, ImageChange), AppError> {
        let change = match (self.image, self.remove_image) {
            (Some(image), _) => ImageChange::Replace(image.decode()?),
            (None, true) => ImageChange::Remove,
            (None, false) => ImageChange::Keep,
        };
        Ok((self.draft, change))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

fn authorize<E: CatalogEntity>(session: &Session) -> Result<(), AppError> {
    if E::ADMIN_ONLY {
        session.require_admin()?;
    }
    Ok(())
}

async fn list<E: CatalogEntity>(
    session: Session,
    state: web::Data<AppState>,
    params: web::Query<TableParams>,
) -> Result<HttpResponse, AppError> {
    authorize::<E>(&session)?;
    let query = TableQuery::from(params.into_inner());
    let view = web::block(move || E::service(&state).list(&query)).await??;
    Ok(HttpResponse::Ok().json(view))
}

async fn new_form<E: CatalogEntity>(
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    authorize::<E>(&session)?;
    let form = web::block(move || E::service(&state).form::<E::Form>(None)).await??;
    Ok(HttpResponse::Ok().json(form))
}

async fn edit_form<E: CatalogEntity>(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    authorize::<E>(&session)?;
    let id = path.into_inner();
    let form = web::block(move || E::service(&state).form::<E::Form>(Some(id))).await??;
    Ok(HttpResponse::Ok().json(form))
}

async fn create<E: CatalogEntity>(
    session: Session,
    state: web::Data<AppState>,
    body: web::Json<SaveRequest<E::Form>>,
) -> Result<HttpResponse, AppError> {
    authorize::<E>(&session)?;
    let (draft, image) = body.into_inner().into_parts()?;
    let owner = session.user.id;
    let record =
        web::block(move || E::service(&state).save::<E::Form>(owner, None, draft, image)).await??;
    Ok(HttpResponse::Created().json(record))
}

async fn update<E: CatalogEntity>(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SaveRequest<E::Form>>,
) -> Result<HttpResponse, AppError> {
    authorize::<E>(&session)?;
    let id = path.into_inner();
    let (draft, image) = body.into_inner().into_parts()?;
    let owner = session.user.id;
    let record = web::block(move || {
        E::service(&state).save::<E::Form>(owner, Some(id), draft, image)
    })
    .await??;
    Ok(HttpResponse::Ok().json(record))
}

async fn delete<E: CatalogEntity>(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, AppError> {
    authorize::<E>(&session)?;
    let id = path.into_inner();
    let confirmed = params.confirm;
    web::block(move || E::service(&state).delete(id, confirmed)).await??;
    Ok(HttpResponse::NoContent().finish())
}

/// Mounts the table/form endpoints for one entity under `path`.
pub fn scope<E: CatalogEntity>(path: &str) -> Scope {
    web::scope(path)
        .route("", web::get().to(list::<E>))
        .route("", web::post().to(create::<E>))
        .route("/form", web::get().to(new_form::<E>))
        .route("/{id}", web::put().to(update::<E>))
        .route("/{id}", web::delete().to(delete::<E>))
        .route("/{id}/form", web::get().to(edit_form::<E>))
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::{Accessory, AccessoryPayload, Product, ProductPayload};
use super::errors::DomainError;
use super::marketing::{
    Notification, NotificationPayload, Partner, PartnerPayload, RedemptionLevel,
    RedemptionLevelPayload,
};
use super::order::{ListResult, Order, OrderFilter, OrderStatus, OrderView, SoldItem};
use super::raffle::{Participant, Raffle, RafflePayload};
use super::user::{CurrentUser, NewSupportTicket, SupportTicket, UserProfile};

/// A record type managed through the generic table + form pattern.
pub trait Entity: Clone + Send + Sync + 'static {
    type Payload: Clone + Send + Sync + 'static;

    /// Singular name used in log lines.
    const LABEL: &'static str;
    /// Storage bucket holding this entity's image, if it has one.
    const IMAGE_BUCKET: Option<&'static str> = None;

    fn id(&self) -> Uuid;

    fn image_url(&self) -> Option<&str> {
        None
    }

    fn set_payload_image(_payload: &mut Self::Payload, _url: Option<String>) {}
}

pub trait EntityRepository<E: Entity>: Send + Sync + 'static {
    /// All records in the entity's display order.
    fn list(&self) -> Result<Vec<E>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<E>, DomainError>;
    fn insert(&self, owner: Uuid, payload: &E::Payload) -> Result<E, DomainError>;
    fn update(&self, id: Uuid, payload: &E::Payload) -> Result<E, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn list(&self, filter: &OrderFilter, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError>;
    /// Orders created at or after `since`, newest first.
    fn created_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Order>, DomainError>;
    fn sold_items(&self) -> Result<Vec<SoldItem>, DomainError>;
}

pub trait RaffleRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Raffle>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Raffle>, DomainError>;
    /// Inserts the raffle and enrolls every current user, atomically.
    /// Returns the raffle and the number of participants enrolled.
    fn create_with_participants(
        &self,
        creator: Uuid,
        payload: &RafflePayload,
    ) -> Result<(Raffle, usize), DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    fn participants(&self, raffle_id: Uuid) -> Result<Vec<Participant>, DomainError>;
}

pub trait UserDirectory: Send + Sync + 'static {
    fn is_admin(&self, user_id: Uuid) -> Result<bool, DomainError>;
    /// Profiles newest first, with the admin flag resolved from role assignments.
    fn profiles(&self) -> Result<Vec<UserProfile>, DomainError>;
    fn emails(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError>;
    /// Distinct users with a role assignment, optionally only those created since.
    fn count_users(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError>;
}

pub trait SupportDesk: Send + Sync + 'static {
    fn open_ticket(&self, ticket: &NewSupportTicket) -> Result<SupportTicket, DomainError>;
}

pub trait ObjectStorage: Send + Sync + 'static {
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), DomainError>;
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, DomainError>;
    fn delete(&self, bucket: &str, paths: &[String]) -> Result<(), DomainError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
    /// Inverse of `public_url` for objects of this store.
    fn path_for_url(&self, bucket: &str, url: &str) -> Option<String>;
}

pub trait IdentityProvider: Send + Sync + 'static {
    fn current_user(&self, bearer_token: &str) -> Result<CurrentUser, DomainError>;
}

impl Entity for Product {
    type Payload = ProductPayload;
    const LABEL: &'static str = "product";
    const IMAGE_BUCKET: Option<&'static str> = Some("product-images");

    fn id(&self) -> Uuid {
        self.id
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn set_payload_image(payload: &mut ProductPayload, url: Option<String>) {
        payload.image_url = url;
    }
}

impl Entity for Accessory {
    type Payload = AccessoryPayload;
    const LABEL: &'static str = "accessory";
    const IMAGE_BUCKET: Option<&'static str> = Some("product-images");

    fn id(&self) -> Uuid {
        self.id
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn set_payload_image(payload: &mut AccessoryPayload, url: Option<String>) {
        payload.image_url = url;
    }
}

impl Entity for Partner {
    type Payload = PartnerPayload;
    const LABEL: &'static str = "partner";
    const IMAGE_BUCKET: Option<&'static str> = Some("partner-logos");

    fn id(&self) -> Uuid {
        self.id
    }

    fn image_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    fn set_payload_image(payload: &mut PartnerPayload, url: Option<String>) {
        payload.logo_url = url;
    }
}

impl Entity for Notification {
    type Payload = NotificationPayload;
    const LABEL: &'static str = "notification";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for RedemptionLevel {
    type Payload = RedemptionLevelPayload;
    const LABEL: &'static str = "redemption level";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Raffle {
    type Payload = RafflePayload;
    const LABEL: &'static str = "raffle";
    const IMAGE_BUCKET: Option<&'static str> = Some("sorteio-images");

    fn id(&self) -> Uuid {
        self.id
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn set_payload_image(payload: &mut RafflePayload, url: Option<String>) {
        payload.image_url = url;
    }
}

//! In-memory adapters for the ports, shared by unit and HTTP tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::http::header;
use actix_web::web;
use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::application::realtime::ChangeFeed;

use crate::domain::catalog::{Accessory, Product};
use crate::domain::errors::DomainError;
use crate::domain::marketing::{Notification, Partner, RedemptionLevel};
use crate::domain::order::{ListResult, Order, OrderFilter, OrderStatus, OrderView, SoldItem};
use crate::domain::ports::{
    Entity, EntityRepository, IdentityProvider, ObjectStorage, OrderRepository, RaffleRepository,
    SupportDesk, UserDirectory,
};
use crate::domain::raffle::{Participant, Raffle, RafflePayload};
use crate::domain::user::{CurrentUser, NewSupportTicket, SupportTicket, UserProfile};
use crate::{Adapters, AppState};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap()
}

/// Ordered record of side effects across fakes.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        lock(&self.0).push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.0).clone()
    }

    pub fn clear(&self) {
        lock(&self.0).clear();
    }
}

pub struct MemoryStorage {
    journal: Journal,
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    fail_uploads: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            objects: Mutex::new(HashMap::new()),
            fail_uploads: Mutex::new(false),
        }
    }

    pub fn fail_uploads(&self) {
        *lock(&self.fail_uploads) = true;
    }

    pub fn contains_url(&self, bucket: &str, url: &str) -> bool {
        self.path_for_url(bucket, url)
            .is_some_and(|path| lock(&self.objects).contains_key(&(bucket.to_owned(), path)))
    }

    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }
}

impl ObjectStorage for MemoryStorage {
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), DomainError> {
        if *lock(&self.fail_uploads) {
            return Err(DomainError::Backend("storage quota exceeded".into()));
        }
        let mut objects = lock(&self.objects);
        let key = (bucket.to_owned(), path.to_owned());
        if objects.contains_key(&key) {
            return Err(DomainError::Backend(format!("The resource already exists: {bucket}/{path}")));
        }
        self.journal.push(format!("upload {bucket}/{path}"));
        objects.insert(key, bytes.to_vec());
        Ok(())
    }

    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, DomainError> {
        lock(&self.objects)
            .get(&(bucket.to_owned(), path.to_owned()))
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    fn delete(&self, bucket: &str, paths: &[String]) -> Result<(), DomainError> {
        let mut objects = lock(&self.objects);
        for path in paths {
            self.journal.push(format!("delete {bucket}/{path}"));
            objects.remove(&(bucket.to_owned(), path.clone()));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }

    fn path_for_url(&self, bucket: &str, url: &str) -> Option<String> {
        url.strip_prefix(&format!("memory://{bucket}/"))
            .map(str::to_owned)
    }
}

/// Builds a stored record from a payload, the way the database would.
pub trait Fixture: Entity {
    fn build(id: Uuid, owner: Uuid, created_at: DateTime<Utc>, payload: &Self::Payload) -> Self;

    fn owner(&self) -> Uuid {
        Uuid::nil()
    }

    fn created_at(&self) -> DateTime<Utc>;
}

pub struct MemoryRepo<E> {
    journal: Journal,
    records: Mutex<Vec<E>>,
    failure: Mutex<Option<String>>,
}

impl<E: Fixture> MemoryRepo<E> {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            records: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn with(records: Vec<E>) -> Self {
        let repo = Self::new(Journal::default());
        *lock(&repo.records) = records;
        repo
    }

    pub fn fail_writes_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_owned());
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    fn check_failure(&self) -> Result<(), DomainError> {
        match lock(&self.failure).clone() {
            Some(message) => Err(DomainError::Backend(message)),
            None => Ok(()),
        }
    }
}

impl<E: Fixture> EntityRepository<E> for MemoryRepo<E> {
    fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(lock(&self.records).clone())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<E>, DomainError> {
        Ok(lock(&self.records).iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, owner: Uuid, payload: &E::Payload) -> Result<E, DomainError> {
        self.check_failure()?;
        let record = E::build(Uuid::new_v4(), owner, Utc::now(), payload);
        self.journal.push(format!("insert {}", record.id()));
        lock(&self.records).insert(0, record.clone());
        Ok(record)
    }

    fn update(&self, id: Uuid, payload: &E::Payload) -> Result<E, DomainError> {
        self.check_failure()?;
        let mut records = lock(&self.records);
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(DomainError::NotFound)?;
        *slot = E::build(id, slot.owner(), slot.created_at(), payload);
        self.journal.push(format!("update {id}"));
        Ok(slot.clone())
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.check_failure()?;
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(DomainError::NotFound);
        }
        self.journal.push(format!("remove {id}"));
        Ok(())
    }
}

impl Fixture for Product {
    fn build(id: Uuid, owner: Uuid, created_at: DateTime<Utc>, p: &Self::Payload) -> Self {
        Product {
            id,
            user_id: owner,
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price.clone(),
            stock: p.stock,
            category: p.category,
            image_url: p.image_url.clone(),
            created_at,
            updated_at: Utc::now(),
        }
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Fixture for Accessory {
    fn build(id: Uuid, owner: Uuid, created_at: DateTime<Utc>, p: &Self::Payload) -> Self {
        Accessory {
            id,
            user_id: owner,
            name: p.name.clone(),
            price: p.price.clone(),
            stock: p.stock,
            image_url: p.image_url.clone(),
            created_at,
            updated_at: Utc::now(),
        }
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Fixture for Notification {
    fn build(id: Uuid, owner: Uuid, created_at: DateTime<Utc>, p: &Self::Payload) -> Self {
        Notification {
            id,
            user_id: owner,
            title: p.title.clone(),
            message: p.message.clone(),
            kind: p.kind,
            expire_at: p.expire_at,
            product_id: p.product_id,
            created_at,
            updated_at: Utc::now(),
        }
    }

    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Fixture for Partner {
    fn build(id: Uuid, _owner: Uuid, created_at: DateTime<Utc>, p: &Self::Payload) -> Self {
        Partner {
            id,
            name: p.name.clone(),
            description: p.description.clone(),
            address: p.address.clone(),
            logo_url: p.logo_url.clone(),
            coupon_code: p.coupon_code.clone(),
            discount_amount: p.discount_amount.clone(),
            is_active: p.is_active,
            created_at,
            updated_at: Utc::now(),
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Fixture for RedemptionLevel {
    fn build(id: Uuid, _owner: Uuid, created_at: DateTime<Utc>, p: &Self::Payload) -> Self {
        RedemptionLevel {
            id,
            points_required: p.points_required,
            discount_amount: p.discount_amount.clone(),
            description: p.description.clone(),
            is_active: p.is_active,
            created_at,
            updated_at: Utc::now(),
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Default)]
pub struct MemoryOrders {
    orders: Mutex<Vec<OrderView>>,
    sold: Mutex<Vec<SoldItem>>,
}

impl MemoryOrders {
    pub fn with(orders: Vec<OrderView>, sold: Vec<SoldItem>) -> Self {
        Self {
            orders: Mutex::new(orders),
            sold: Mutex::new(sold),
        }
    }
}

impl OrderRepository for MemoryOrders {
    fn list(&self, filter: &OrderFilter, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut matching: Vec<OrderView> = lock(&self.orders)
            .iter()
            .filter(|v| filter.matches(&v.order))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|mut v| {
                v.user_email = None;
                v
            })
            .collect();
        Ok(ListResult { items, total })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(lock(&self.orders)
            .iter()
            .find(|v| v.order.id == id)
            .cloned()
            .map(|mut v| {
                v.user_email = None;
                v
            }))
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let mut orders = lock(&self.orders);
        let view = orders
            .iter_mut()
            .find(|v| v.order.id == id)
            .ok_or(DomainError::NotFound)?;
        view.order.status = status;
        Ok(view.order.clone())
    }

    fn created_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = lock(&self.orders)
            .iter()
            .map(|v| v.order.clone())
            .filter(|o| since.map_or(true, |s| o.created_at >= s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    fn sold_items(&self) -> Result<Vec<SoldItem>, DomainError> {
        Ok(lock(&self.sold).clone())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    profiles: Mutex<Vec<UserProfile>>,
}

impl MemoryUsers {
    pub fn with(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
        }
    }

    pub fn ids(&self) -> Vec<Uuid> {
        lock(&self.profiles).iter().map(|p| p.id).collect()
    }
}

impl UserDirectory for MemoryUsers {
    fn is_admin(&self, user_id: Uuid) -> Result<bool, DomainError> {
        Ok(lock(&self.profiles)
            .iter()
            .any(|p| p.id == user_id && p.is_admin))
    }

    fn profiles(&self) -> Result<Vec<UserProfile>, DomainError> {
        let mut profiles = lock(&self.profiles).clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    fn emails(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        Ok(lock(&self.profiles)
            .iter()
            .filter(|p| user_ids.contains(&p.id))
            .map(|p| (p.id, p.email.clone()))
            .collect())
    }

    fn count_users(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError> {
        Ok(lock(&self.profiles)
            .iter()
            .filter(|p| since.map_or(true, |s| p.created_at >= s))
            .count() as i64)
    }
}

/// Raffles whose fan-out enrolls every profile of a `MemoryUsers`.
pub struct MemoryRaffles {
    users: Arc<MemoryUsers>,
    raffles: Mutex<Vec<Raffle>>,
    participants: Mutex<HashMap<Uuid, Vec<Participant>>>,
    fail_creates: Mutex<bool>,
}

impl MemoryRaffles {
    pub fn new(users: Arc<MemoryUsers>) -> Self {
        Self {
            users,
            raffles: Mutex::new(Vec::new()),
            participants: Mutex::new(HashMap::new()),
            fail_creates: Mutex::new(false),
        }
    }

    pub fn fail_creates(&self) {
        *lock(&self.fail_creates) = true;
    }

    pub fn count(&self) -> usize {
        lock(&self.raffles).len()
    }
}

impl RaffleRepository for MemoryRaffles {
    fn list(&self) -> Result<Vec<Raffle>, DomainError> {
        Ok(lock(&self.raffles).clone())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Raffle>, DomainError> {
        Ok(lock(&self.raffles).iter().find(|r| r.id == id).cloned())
    }

    fn create_with_participants(
        &self,
        creator: Uuid,
        payload: &RafflePayload,
    ) -> Result<(Raffle, usize), DomainError> {
        if *lock(&self.fail_creates) {
            return Err(DomainError::Backend("insert into sorteio_participants failed".into()));
        }
        let raffle = Raffle {
            id: Uuid::new_v4(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            product_id: payload.product_id,
            image_url: payload.image_url.clone(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            created_by: creator,
            created_at: Utc::now(),
        };
        let enrolled: Vec<Participant> = self
            .users
            .profiles()?
            .into_iter()
            .map(|p| Participant {
                user_id: p.id,
                email: p.email,
            })
            .collect();
        let count = enrolled.len();
        lock(&self.participants).insert(raffle.id, enrolled);
        lock(&self.raffles).insert(0, raffle.clone());
        Ok((raffle, count))
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        lock(&self.raffles).retain(|r| r.id != id);
        lock(&self.participants).remove(&id);
        Ok(())
    }

    fn participants(&self, raffle_id: Uuid) -> Result<Vec<Participant>, DomainError> {
        Ok(lock(&self.participants)
            .get(&raffle_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryDesk {
    tickets: Mutex<Vec<SupportTicket>>,
}

impl MemoryDesk {
    pub fn tickets(&self) -> Vec<SupportTicket> {
        lock(&self.tickets).clone()
    }
}

impl SupportDesk for MemoryDesk {
    fn open_ticket(&self, ticket: &NewSupportTicket) -> Result<SupportTicket, DomainError> {
        let stored = SupportTicket {
            id: Uuid::new_v4(),
            name: ticket.name.clone(),
            email: ticket.email.clone(),
            subject: ticket.subject.clone(),
            message: ticket.message.clone(),
            status: "open".into(),
            created_at: Utc::now(),
        };
        lock(&self.tickets).push(stored.clone());
        Ok(stored)
    }
}

/// Bearer tokens mapped straight to users.
#[derive(Default)]
pub struct StaticIdentity {
    tokens: HashMap<String, CurrentUser>,
}

impl StaticIdentity {
    pub fn with_token(mut self, token: &str, user: CurrentUser) -> Self {
        self.tokens.insert(token.to_owned(), user);
        self
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self, bearer_token: &str) -> Result<CurrentUser, DomainError> {
        self.tokens
            .get(bearer_token)
            .cloned()
            .ok_or(DomainError::Unauthenticated)
    }
}

pub fn profile(email: &str, is_admin: bool) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        email: email.into(),
        points: 0,
        is_admin,
        created_at: Utc::now(),
    }
}

pub const ADMIN_TOKEN: &str = "admin-token";
pub const MEMBER_TOKEN: &str = "member-token";

/// Every port backed by an in-memory fake, plus one admin and one member.
pub struct Harness {
    pub journal: Journal,
    pub storage: Arc<MemoryStorage>,
    pub users: Arc<MemoryUsers>,
    pub products: Arc<MemoryRepo<Product>>,
    pub accessories: Arc<MemoryRepo<Accessory>>,
    pub notifications: Arc<MemoryRepo<Notification>>,
    pub partners: Arc<MemoryRepo<Partner>>,
    pub redemption_levels: Arc<MemoryRepo<RedemptionLevel>>,
    pub orders: Arc<MemoryOrders>,
    pub raffles: Arc<MemoryRaffles>,
    pub desk: Arc<MemoryDesk>,
    pub feed: ChangeFeed,
    pub admin: UserProfile,
    pub member: UserProfile,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_orders(|_, _| MemoryOrders::default())
    }

    /// `orders` receives the admin and the member profiles.
    pub fn with_orders(orders: impl FnOnce(&UserProfile, &UserProfile) -> MemoryOrders) -> Self {
        let journal = Journal::default();
        let admin = profile("admin@gas.com", true);
        let member = profile("cliente@gas.com", false);
        let orders = orders(&admin, &member);
        let users = Arc::new(MemoryUsers::with(vec![admin.clone(), member.clone()]));
        Self {
            storage: Arc::new(MemoryStorage::new(journal.clone())),
            products: Arc::new(MemoryRepo::new(journal.clone())),
            accessories: Arc::new(MemoryRepo::new(journal.clone())),
            notifications: Arc::new(MemoryRepo::new(journal.clone())),
            partners: Arc::new(MemoryRepo::new(journal.clone())),
            redemption_levels: Arc::new(MemoryRepo::new(journal.clone())),
            orders: Arc::new(orders),
            raffles: Arc::new(MemoryRaffles::new(users.clone())),
            desk: Arc::new(MemoryDesk::default()),
            feed: ChangeFeed::new(),
            users,
            journal,
            admin,
            member,
        }
    }

    pub fn state(&self) -> web::Data<AppState> {
        let as_user = |p: &UserProfile| CurrentUser {
            id: p.id,
            email: Some(p.email.clone()),
        };
        let identity = StaticIdentity::default()
            .with_token(ADMIN_TOKEN, as_user(&self.admin))
            .with_token(MEMBER_TOKEN, as_user(&self.member));
        let adapters = Adapters {
            identity: Arc::new(identity),
            users: self.users.clone(),
            products: self.products.clone(),
            accessories: self.accessories.clone(),
            notifications: self.notifications.clone(),
            partners: self.partners.clone(),
            redemption_levels: self.redemption_levels.clone(),
            orders: self.orders.clone(),
            raffles: self.raffles.clone(),
            support: self.desk.clone(),
            storage: self.storage.clone(),
        };
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        web::Data::new(AppState::new(adapters, self.feed.clone(), offset))
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

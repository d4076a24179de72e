//! Read-only table projections: search, placeholders, display formatting
//! and the confirmation step in front of deletes.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::catalog::{Accessory, Product};
use crate::domain::marketing::{Notification, Partner, RedemptionLevel};
use crate::domain::raffle::Raffle;
use crate::domain::user::UserProfile;

pub trait Searchable {
    /// Text fields a search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, needle_lowercase: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lowercase))
    }
}

/// Case-insensitive substring filter. A blank term keeps everything.
pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(&needle)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placeholder {
    /// The collection itself is empty.
    Empty { message: String },
    /// Records exist but none match the search term.
    NoMatches { message: String },
}

impl Placeholder {
    pub fn for_view(total_records: usize, visible: usize, term: &str) -> Option<Self> {
        if total_records == 0 {
            Some(Placeholder::Empty {
                message: "Nenhum registro cadastrado ainda.".into(),
            })
        } else if visible == 0 {
            Some(Placeholder::NoMatches {
                message: format!("Nenhum resultado encontrado para \"{}\".", term.trim()),
            })
        } else {
            None
        }
    }
}

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub term: String,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            term: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl TableQuery {
    pub fn new(term: Option<String>, page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            term: term.unwrap_or_default(),
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }
}

/// One page of a searched collection, in the order the caller supplied.
#[derive(Debug, Clone, Serialize)]
pub struct TableView<T> {
    pub rows: Vec<T>,
    /// Rows matching the search, across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub placeholder: Option<Placeholder>,
}

impl<T: Searchable + Clone> TableView<T> {
    pub fn build(items: &[T], query: &TableQuery) -> Self {
        let matching = filter(items, &query.term);
        let total = matching.len();
        let per_page = query.per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        let rows: Vec<T> = matching
            .into_iter()
            .skip((query.page.max(1) - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();
        let placeholder = if total == 0 {
            Placeholder::for_view(items.len(), 0, &query.term)
        } else {
            None
        };
        Self {
            rows,
            total,
            page: query.page.max(1),
            per_page,
            total_pages,
            placeholder,
        }
    }
}

/// Lifecycle of a delete intent: nothing happens until it is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteConfirmation {
    #[default]
    Idle,
    Pending(Uuid),
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: Uuid) {
        *self = DeleteConfirmation::Pending(id);
    }

    pub fn cancel(&mut self) {
        *self = DeleteConfirmation::Idle;
    }

    /// Returns the id to hand to the delete callback, if one was pending.
    pub fn confirm(&mut self) -> Option<Uuid> {
        match std::mem::take(self) {
            DeleteConfirmation::Pending(id) => Some(id),
            DeleteConfirmation::Idle => None,
        }
    }
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,50`.
pub fn format_brl(amount: &BigDecimal) -> String {
    let rounded = amount.with_scale_round(2, RoundingMode::HalfUp).to_string();
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}R$ {grouped},{frac_part}")
}

/// `dd/mm/yyyy` in the operator's local offset.
pub fn format_local_date(at: &DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d/%m/%Y").to_string()
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.category.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Searchable for Accessory {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Searchable for Notification {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }
}

impl Searchable for Partner {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.coupon_code.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.address.as_deref());
        fields
    }
}

impl Searchable for RedemptionLevel {
    fn search_fields(&self) -> Vec<&str> {
        self.description.as_deref().into_iter().collect()
    }
}

impl Searchable for UserProfile {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.email.as_str()]
    }
}

impl Searchable for Raffle {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

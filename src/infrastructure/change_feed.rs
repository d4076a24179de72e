//! Background poller that moves trigger-recorded rows from `change_events`
//! into the in-process `ChangeFeed`.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use tokio::task::JoinHandle;

use super::models::ChangeEventRow;
use super::DieselStore;
use crate::application::realtime::{ChangeEvent, ChangeFeed};
use crate::domain::errors::DomainError;
use crate::schema::change_events;

const BATCH_SIZE: i64 = 500;
/// How long a missing id may hold the cursor back before it is given up.
const GAP_GRACE: Duration = Duration::from_secs(10);
/// Recorded changes older than this are deleted.
const RETENTION: chrono::Duration = chrono::Duration::hours(1);
const PRUNE_EVERY: Duration = Duration::from_secs(60);

impl TryFrom<ChangeEventRow> for ChangeEvent {
    type Error = String;

    fn try_from(row: ChangeEventRow) -> Result<Self, Self::Error> {
        Ok(ChangeEvent {
            id: row.id,
            op: row.operation.parse()?,
            table: row.table_name,
            row: row.row_data,
            at: row.created_at,
        })
    }
}

impl DieselStore {
    /// Id of the newest recorded change, or 0 when the table is empty.
    pub fn latest_change_id(&self) -> Result<i64, DomainError> {
        let mut conn = self.conn()?;
        let latest: Option<i64> = change_events::table
            .select(max(change_events::id))
            .first(&mut conn)?;
        Ok(latest.unwrap_or(0))
    }

    /// Changes recorded after `cursor`, oldest first.
    pub fn changes_after(&self, cursor: i64) -> Result<Vec<ChangeEventRow>, DomainError> {
        let mut conn = self.conn()?;
        let rows = change_events::table
            .filter(change_events::id.gt(cursor))
            .order(change_events::id.asc())
            .limit(BATCH_SIZE)
            .select(ChangeEventRow::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    /// Deletes changes recorded before `cutoff` and returns how many went.
    pub fn prune_changes(&self, cutoff: chrono::DateTime<Utc>) -> Result<usize, DomainError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(change_events::table.filter(change_events::created_at.lt(cutoff)))
            .execute(&mut conn)?;
        Ok(deleted)
    }
}

/// Position of the poller in `change_events`.
///
/// Sequence ids are taken when a row is written but become visible at
/// commit, so a lower id can show up after a higher one was published.
/// Every id up to `floor` is settled. Above it, ids already published are
/// remembered and missing ids are waited for until `grace` has passed.
struct ChangeCursor {
    floor: i64,
    published: BTreeSet<i64>,
    gaps: BTreeMap<i64, Instant>,
    grace: Duration,
}

impl ChangeCursor {
    fn new(floor: i64, grace: Duration) -> Self {
        Self {
            floor,
            published: BTreeSet::new(),
            gaps: BTreeMap::new(),
            grace,
        }
    }

    fn floor(&self) -> i64 {
        self.floor
    }

    /// Drops everything pending and continues after `id`.
    fn skip_to(&mut self, id: i64) {
        self.floor = id;
        self.published.clear();
        self.gaps.clear();
    }

    /// Keeps the rows not published yet, marks them published and moves
    /// the floor as far as the settled ids allow.
    fn accept(&mut self, rows: Vec<ChangeEventRow>, now: Instant) -> Vec<ChangeEventRow> {
        let fresh: Vec<ChangeEventRow> = rows
            .into_iter()
            .filter(|row| row.id > self.floor && self.published.insert(row.id))
            .collect();

        if let Some(&highest) = self.published.last() {
            for id in self.floor + 1..highest {
                if !self.published.contains(&id) {
                    self.gaps.entry(id).or_insert(now);
                }
            }
        }
        for row in &fresh {
            self.gaps.remove(&row.id);
        }

        loop {
            let next = self.floor + 1;
            if self.published.remove(&next) {
                self.floor = next;
                continue;
            }
            match self.gaps.get(&next) {
                Some(since) if now.duration_since(*since) >= self.grace => {
                    log::debug!("change event {next} never appeared; moving past it");
                    self.gaps.remove(&next);
                    self.floor = next;
                }
                _ => break,
            }
        }
        fresh
    }
}

/// Publishes rows in order. Rows with an unknown operation are skipped.
fn publish_rows(feed: &ChangeFeed, rows: Vec<ChangeEventRow>) {
    for row in rows {
        let id = row.id;
        match ChangeEvent::try_from(row) {
            Ok(event) => {
                feed.publish(&event);
            }
            Err(e) => log::warn!("skipping change event {id}: {e}"),
        }
    }
}

/// Starts tailing `change_events` from the current end of the table.
/// Only changes recorded after start-up are published, and changes older
/// than an hour are pruned.
pub fn spawn_change_poller(store: DieselStore, feed: ChangeFeed, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = loop {
            let s = store.clone();
            match tokio::task::spawn_blocking(move || s.latest_change_id()).await {
                Ok(Ok(id)) => break id,
                Ok(Err(e)) => log::error!("change feed could not read its start position: {e}"),
                Err(e) => log::error!("change feed start-up task failed: {e}"),
            }
            tokio::time::sleep(every).await;
        };
        log::info!("change feed polling every {every:?} from event {start}");
        let mut cursor = ChangeCursor::new(start, GAP_GRACE);
        let mut last_prune: Option<Instant> = None;

        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if last_prune.map_or(true, |at| at.elapsed() >= PRUNE_EVERY) {
                last_prune = Some(Instant::now());
                let s = store.clone();
                match tokio::task::spawn_blocking(move || s.prune_changes(Utc::now() - RETENTION)).await {
                    Ok(Ok(0)) => {}
                    Ok(Ok(n)) => log::debug!("pruned {n} change events"),
                    Ok(Err(e)) => log::warn!("change feed prune failed: {e}"),
                    Err(e) => log::error!("change feed prune task failed: {e}"),
                }
            }
            if feed.subscriber_count() == 0 {
                // Nobody listening; skip ahead so late subscribers only see new events.
                let s = store.clone();
                if let Ok(Ok(id)) = tokio::task::spawn_blocking(move || s.latest_change_id()).await {
                    cursor.skip_to(id);
                }
                continue;
            }
            let s = store.clone();
            let floor = cursor.floor();
            match tokio::task::spawn_blocking(move || s.changes_after(floor)).await {
                Ok(Ok(rows)) => publish_rows(&feed, cursor.accept(rows, Instant::now())),
                Ok(Err(e)) => log::warn!("change feed poll failed: {e}"),
                Err(e) => log::error!("change feed poll task failed: {e}"),
            }
        }
    })
}

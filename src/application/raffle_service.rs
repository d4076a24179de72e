use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::forms::{EntityForm, RaffleForm};
use super::images::ImageUpload;
use super::presenter::{TableQuery, TableView};
use super::raffle_selector::{plan_spin, TICK_INTERVAL};
use super::session::Session;
use super::submission::{remove_stored_image, StagedImage};
use crate::domain::errors::DomainError;
use crate::domain::ports::{Entity, ObjectStorage, RaffleRepository, UserDirectory};
use crate::domain::raffle::{Participant, Raffle};

#[derive(Debug, Clone, Serialize)]
pub struct RaffleBoard {
    pub raffles: TableView<Raffle>,
    /// Users a new raffle would enroll.
    pub user_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedRaffle {
    pub raffle: Raffle,
    pub participants: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Draw {
    pub winner: Participant,
    pub winner_index: usize,
    pub participants: Vec<Participant>,
    pub frames: Vec<usize>,
    pub tick_interval_ms: u64,
}

pub struct RaffleService {
    raffles: Arc<dyn RaffleRepository>,
    users: Arc<dyn UserDirectory>,
    storage: Arc<dyn ObjectStorage>,
}

impl RaffleService {
    pub fn new(
        raffles: Arc<dyn RaffleRepository>,
        users: Arc<dyn UserDirectory>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            raffles,
            users,
            storage,
        }
    }

    pub fn board(&self, query: &TableQuery) -> Result<RaffleBoard, DomainError> {
        let raffles = self.raffles.list()?;
        Ok(RaffleBoard {
            raffles: TableView::build(&raffles, query),
            user_count: self.users.count_users(None)?,
        })
    }

    /// Validates the draft, uploads the image, then writes the raffle and
    /// its participants in one transaction. The upload is removed again if
    /// that transaction fails.
    pub fn create(
        &self,
        session: &Session,
        draft: &RaffleForm,
        image: Option<&ImageUpload>,
    ) -> Result<CreatedRaffle, DomainError> {
        let mut payload = draft.to_payload()?;
        let staged = match (image, Raffle::IMAGE_BUCKET) {
            (Some(image), Some(bucket)) => Some(StagedImage::upload(
                self.storage.as_ref(),
                bucket,
                session.user.id,
                image,
            )?),
            _ => None,
        };
        payload.image_url = staged.as_ref().map(|s| s.url.clone());

        match self.raffles.create_with_participants(session.user.id, &payload) {
            Ok((raffle, participants)) => {
                log::info!("raffle {} created with {} participants", raffle.id, participants);
                Ok(CreatedRaffle {
                    raffle,
                    participants,
                })
            }
            Err(e) => {
                if let Some(staged) = staged {
                    staged.discard(self.storage.as_ref());
                }
                Err(e)
            }
        }
    }

    pub fn delete(&self, id: Uuid, confirmed: bool) -> Result<(), DomainError> {
        if !confirmed {
            return Err(DomainError::ConfirmationRequired);
        }
        let raffle = self.raffles.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        self.raffles.delete(id)?;
        if let (Some(bucket), Some(url)) = (Raffle::IMAGE_BUCKET, raffle.image_url.as_deref()) {
            remove_stored_image(self.storage.as_ref(), bucket, url);
        }
        log::info!("deleted raffle {id}");
        Ok(())
    }

    pub fn participants(&self, id: Uuid) -> Result<Vec<Participant>, DomainError> {
        self.raffles.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        self.raffles.participants(id)
    }

    pub fn draw(&self, id: Uuid) -> Result<Draw, DomainError> {
        let participants = self.participants(id)?;
        let plan = plan_spin(participants.len(), 0, &mut rand::thread_rng())?;
        let winner = participants
            .get(plan.winner)
            .cloned()
            .ok_or_else(|| DomainError::Internal("winner index out of range".into()))?;
        log::info!("raffle {} drawn: {}", id, winner.user_id);
        Ok(Draw {
            winner,
            winner_index: plan.winner,
            participants,
            frames: plan.frames,
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
        })
    }
}

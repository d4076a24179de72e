use diesel::prelude::*;
use uuid::Uuid;

use super::models::{NewParticipantRow, NewRaffleRow, RaffleRow};
use super::DieselStore;
use crate::domain::errors::DomainError;
use crate::domain::ports::RaffleRepository;
use crate::domain::raffle::{Participant, Raffle, RafflePayload};
use crate::schema::{profiles, sorteio_participants, sorteios, user_roles};

/// Keeps each multi-row insert well under Postgres' bind parameter limit.
const PARTICIPANT_CHUNK: usize = 1000;

impl RaffleRepository for DieselStore {
    fn list(&self) -> Result<Vec<Raffle>, DomainError> {
        let mut conn = self.conn()?;
        let rows = sorteios::table
            .select(RaffleRow::as_select())
            .order(sorteios::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Raffle::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Raffle>, DomainError> {
        let mut conn = self.conn()?;
        let row = sorteios::table
            .find(id)
            .select(RaffleRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Raffle::from))
    }

    fn create_with_participants(
        &self,
        creator: Uuid,
        payload: &RafflePayload,
    ) -> Result<(Raffle, usize), DomainError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let raffle: RaffleRow = diesel::insert_into(sorteios::table)
                .values(&NewRaffleRow::new(creator, payload))
                .returning(RaffleRow::as_returning())
                .get_result(conn)?;

            // Everyone with a role assignment takes part, once.
            let user_ids: Vec<Uuid> = user_roles::table
                .select(user_roles::user_id)
                .distinct()
                .load(conn)?;

            for chunk in user_ids.chunks(PARTICIPANT_CHUNK) {
                let rows: Vec<NewParticipantRow> = chunk
                    .iter()
                    .map(|&user_id| NewParticipantRow {
                        id: Uuid::new_v4(),
                        sorteio_id: raffle.id,
                        user_id,
                    })
                    .collect();
                diesel::insert_into(sorteio_participants::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            Ok((raffle.into(), user_ids.len()))
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(sorteios::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn participants(&self, raffle_id: Uuid) -> Result<Vec<Participant>, DomainError> {
        let mut conn = self.conn()?;
        let rows: Vec<(Uuid, Option<String>)> = sorteio_participants::table
            .left_join(profiles::table.on(profiles::id.eq(sorteio_participants::user_id)))
            .filter(sorteio_participants::sorteio_id.eq(raffle_id))
            .select((sorteio_participants::user_id, profiles::email.nullable()))
            .order(sorteio_participants::created_at.asc())
            .then_order_by(profiles::email.nullable().asc())
            .then_order_by(sorteio_participants::user_id.asc())
            .load(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(user_id, email)| Participant {
                user_id,
                email: email.unwrap_or_default(),
            })
            .collect())
    }
}

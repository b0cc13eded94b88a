//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{
    CompanyId, Event, EventId, EventStatus, EventTitle, EventUpdate, NewEvent, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{EventChangeset, EventRow, NewEventRow};
use super::pool::{DbPool, PoolError};
use super::schema::{company_members, events};

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Domain(EventRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<EventRepositoryError> for TxError {
    fn from(error: EventRepositoryError) -> Self {
        Self::Domain(error)
    }
}

fn map_pool_error(error: PoolError) -> EventRepositoryError {
    map_basic_pool_error(error, EventRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> EventRepositoryError {
    map_basic_diesel_error(
        error,
        EventRepositoryError::query,
        EventRepositoryError::connection,
    )
}

fn map_tx_error(error: TxError) -> EventRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Domain(error) => error,
    }
}

fn event_from_row(row: EventRow) -> Result<Event, EventRepositoryError> {
    let title = EventTitle::new(&row.title).map_err(|err| {
        EventRepositoryError::query(format!("stored event {} is invalid: {err}", row.id))
    })?;
    let status = EventStatus::parse(&row.status).ok_or_else(|| {
        EventRepositoryError::query(format!(
            "stored event {} has unknown status {}",
            row.id, row.status
        ))
    })?;
    Ok(Event {
        id: EventId::new(row.id),
        company_id: row.company_id.map(CompanyId::new),
        created_by: UserId::new(row.created_by),
        title,
        description: row.description,
        start_time: row.start_time,
        end_time: row.end_time,
        place_name: row.place_name,
        place_link: row.place_link,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

async fn is_member(
    conn: &mut AsyncPgConnection,
    company: i64,
    user: i64,
) -> Result<bool, diesel::result::Error> {
    diesel::select(exists(
        company_members::table
            .filter(company_members::company_id.eq(company))
            .filter(company_members::user_id.eq(user)),
    ))
    .get_result(conn)
    .await
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn create_event(&self, event: &NewEvent) -> Result<EventId, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewEventRow {
            company_id: event.company_id.map(CompanyId::get),
            created_by: event.created_by.get(),
            title: event.title.as_ref(),
            description: event.description.as_deref(),
            start_time: event.time.start(),
            end_time: event.time.end(),
            place_name: event.place_name.as_deref(),
            place_link: event.place_link.as_deref(),
            status: EventStatus::Pending.as_str(),
        };

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                if let Some(company) = row.company_id {
                    if !is_member(conn, company, row.created_by).await? {
                        return Err(EventRepositoryError::NotMember.into());
                    }
                }
                let id = diesel::insert_into(events::table)
                    .values(&row)
                    .returning(events::id)
                    .get_result::<i64>(conn)
                    .await?;
                Ok(EventId::new(id))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn get_event(
        &self,
        event: EventId,
        viewer: UserId,
    ) -> Result<Option<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = events::table
            .find(event.get())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let member = match row.company_id {
            Some(company) => is_member(&mut conn, company, viewer.get())
                .await
                .map_err(map_diesel_error)?,
            None => false,
        };
        let found = event_from_row(row)?;
        Ok(found.is_visible_to(viewer, member).then_some(found))
    }

    async fn list_events(&self, viewer: UserId) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let memberships = company_members::table
            .filter(company_members::user_id.eq(viewer.get()))
            .select(company_members::company_id.nullable());
        let rows: Vec<EventRow> = events::table
            .filter(
                events::company_id
                    .is_null()
                    .and(events::created_by.eq(viewer.get()))
                    .or(events::company_id.eq_any(memberships)),
            )
            .order((events::created_at.desc(), events::id.desc()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(event_from_row).collect()
    }

    async fn list_company_events(
        &self,
        company: CompanyId,
        viewer: UserId,
    ) -> Result<Vec<Event>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if !is_member(&mut conn, company.get(), viewer.get())
            .await
            .map_err(map_diesel_error)?
        {
            return Err(EventRepositoryError::not_member());
        }
        let rows: Vec<EventRow> = events::table
            .filter(events::company_id.eq(company.get()))
            .order((events::created_at.desc(), events::id.desc()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(event_from_row).collect()
    }

    async fn update_event(
        &self,
        event: EventId,
        editor: UserId,
        update: &EventUpdate,
    ) -> Result<(), EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                if let Some(company) = update.company_id {
                    if !is_member(conn, company.get(), editor.get()).await? {
                        return Err(EventRepositoryError::NotMember.into());
                    }
                }
                let row = events::table
                    .filter(events::id.eq(event.get()))
                    .filter(events::created_by.eq(editor.get()))
                    .select(EventRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(EventRepositoryError::NotFound)?;
                let merged = event_from_row(row)?
                    .apply(update)
                    .map_err(EventRepositoryError::invalid)?;
                diesel::update(events::table.find(event.get()))
                    .set(&EventChangeset {
                        company_id: merged.company_id.map(CompanyId::get),
                        title: merged.title.as_ref(),
                        description: merged.description.as_deref(),
                        start_time: merged.start_time,
                        end_time: merged.end_time,
                        place_name: merged.place_name.as_deref(),
                        place_link: merged.place_link.as_deref(),
                        updated_at: Utc::now(),
                    })
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn delete_event(
        &self,
        event: EventId,
        editor: UserId,
    ) -> Result<(), EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(
            events::table
                .filter(events::id.eq(event.get()))
                .filter(events::created_by.eq(editor.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(EventRepositoryError::not_found());
        }
        Ok(())
    }
}

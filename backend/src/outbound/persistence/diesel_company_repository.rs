//! PostgreSQL-backed `CompanyRepository` implementation using Diesel ORM.
//!
//! Company creation, invitation issuance and acceptance each run inside one
//! transaction. Rule violations detected mid-transaction are carried out as
//! [`TxError::Domain`] so Diesel rolls the whole unit back.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CompanyRepository, CompanyRepositoryError};
use crate::domain::{
    Company, CompanyId, CompanyInvitation, CompanyName, CompanyUpdate, InvitationId,
    InvitationPreconditions, InvitationRejection, InvitationStatus, InvitationView, MemberRole,
    NewCompany, NewNotification, UserId, Username,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{
    CompanyChangeset, CompanyRow, InvitationRow, NewCompanyRow, NewInvitationRow, NewMemberRow,
    NewNotificationRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{companies, company_invitations, company_members, notifications, users};

const PENDING_INVITATION_INDEX: &str = "company_invitations_one_pending_idx";

/// Diesel-backed implementation of the `CompanyRepository` port.
#[derive(Clone)]
pub struct DieselCompanyRepository {
    pool: DbPool,
}

impl DieselCompanyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction body.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Domain(CompanyRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<CompanyRepositoryError> for TxError {
    fn from(error: CompanyRepositoryError) -> Self {
        Self::Domain(error)
    }
}

fn map_pool_error(error: PoolError) -> CompanyRepositoryError {
    map_basic_pool_error(error, CompanyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CompanyRepositoryError {
    map_basic_diesel_error(
        error,
        CompanyRepositoryError::query,
        CompanyRepositoryError::connection,
    )
}

fn map_tx_error(error: TxError) -> CompanyRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Domain(error) => error,
    }
}

/// A concurrent invite that slipped past the pending check trips the index.
fn map_invitation_tx_error(error: TxError) -> CompanyRepositoryError {
    match &error {
        TxError::Diesel(inner)
            if unique_violation_constraint(inner) == Some(PENDING_INVITATION_INDEX) =>
        {
            CompanyRepositoryError::rejected(InvitationRejection::AlreadyInvited)
        }
        _ => map_tx_error(error),
    }
}

fn corrupt(what: &str, id: i64, detail: impl std::fmt::Display) -> CompanyRepositoryError {
    CompanyRepositoryError::query(format!("stored {what} {id} is invalid: {detail}"))
}

fn company_from_row(row: CompanyRow) -> Result<Company, CompanyRepositoryError> {
    let name = CompanyName::new(&row.name).map_err(|err| corrupt("company", row.id, err))?;
    Ok(Company {
        id: CompanyId::new(row.id),
        name,
        description: row.description,
        created_by: UserId::new(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn parse_status(id: i64, raw: &str) -> Result<InvitationStatus, CompanyRepositoryError> {
    InvitationStatus::parse(raw).ok_or_else(|| corrupt("invitation", id, raw))
}

fn invitation_from_row(row: InvitationRow) -> Result<CompanyInvitation, CompanyRepositoryError> {
    Ok(CompanyInvitation {
        id: InvitationId::new(row.id),
        company_id: CompanyId::new(row.company_id),
        invited_user_id: UserId::new(row.invited_user_id),
        invited_by: UserId::new(row.invited_by),
        status: parse_status(row.id, &row.status)?,
        created_at: row.created_at,
        responded_at: row.responded_at,
    })
}

type InvitationViewRow = (i64, i64, String, i64, String, String, chrono::DateTime<Utc>);

fn view_from_row(row: InvitationViewRow) -> Result<InvitationView, CompanyRepositoryError> {
    let (id, company_id, company_name, invited_by, username, status, created_at) = row;
    Ok(InvitationView {
        id: InvitationId::new(id),
        company_id: CompanyId::new(company_id),
        company_name: CompanyName::new(&company_name)
            .map_err(|err| corrupt("company", company_id, err))?,
        invited_by: UserId::new(invited_by),
        invited_by_username: Username::new(&username)
            .map_err(|err| corrupt("user", invited_by, err))?,
        status: parse_status(id, &status)?,
        created_at,
    })
}

#[async_trait]
impl CompanyRepository for DieselCompanyRepository {
    async fn create_company(
        &self,
        company: &NewCompany,
    ) -> Result<CompanyId, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCompanyRow {
            name: company.name.as_ref(),
            description: company.description.as_deref(),
            created_by: company.created_by.get(),
        };

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let id = diesel::insert_into(companies::table)
                    .values(&row)
                    .returning(companies::id)
                    .get_result::<i64>(conn)
                    .await?;
                diesel::insert_into(company_members::table)
                    .values(&NewMemberRow {
                        company_id: id,
                        user_id: row.created_by,
                        role: MemberRole::Owner.as_str(),
                    })
                    .execute(conn)
                    .await?;
                Ok(id)
            }
            .scope_boxed()
        })
        .await
        .map(CompanyId::new)
        .map_err(map_diesel_error)
    }

    async fn get_company(
        &self,
        company: CompanyId,
        viewer: UserId,
    ) -> Result<Option<Company>, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = companies::table
            .inner_join(company_members::table)
            .filter(companies::id.eq(company.get()))
            .filter(company_members::user_id.eq(viewer.get()))
            .select(CompanyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(company_from_row).transpose()
    }

    async fn list_companies(&self, member: UserId) -> Result<Vec<Company>, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CompanyRow> = companies::table
            .inner_join(company_members::table)
            .filter(company_members::user_id.eq(member.get()))
            .order((companies::created_at.desc(), companies::id.desc()))
            .select(CompanyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(company_from_row).collect()
    }

    async fn update_company(
        &self,
        company: CompanyId,
        owner: UserId,
        update: &CompanyUpdate,
    ) -> Result<(), CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = CompanyChangeset {
            name: update.name.as_ref().map(|name| name.as_ref()),
            description: update.description.as_deref(),
            updated_at: Utc::now(),
        };
        let affected = diesel::update(
            companies::table
                .filter(companies::id.eq(company.get()))
                .filter(companies::created_by.eq(owner.get())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(CompanyRepositoryError::company_not_found());
        }
        Ok(())
    }

    async fn delete_company(
        &self,
        company: CompanyId,
        owner: UserId,
    ) -> Result<(), CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(
            companies::table
                .filter(companies::id.eq(company.get()))
                .filter(companies::created_by.eq(owner.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(CompanyRepositoryError::company_not_found());
        }
        Ok(())
    }

    async fn company_owner(
        &self,
        company: CompanyId,
    ) -> Result<Option<UserId>, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = companies::table
            .find(company.get())
            .select(companies::created_by)
            .first::<i64>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(owner.map(UserId::new))
    }

    async fn create_invitation(
        &self,
        company: CompanyId,
        invited_by: UserId,
        username: &Username,
    ) -> Result<CompanyInvitation, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let (owner, company_name) = companies::table
                        .find(company.get())
                        .select((companies::created_by, companies::name))
                        .first::<(i64, String)>(conn)
                        .await
                        .optional()?
                        .ok_or(CompanyRepositoryError::CompanyNotFound)?;
                    InvitationPreconditions::check_owner(UserId::new(owner), invited_by)
                        .map_err(CompanyRepositoryError::rejected)?;

                    let invitee = users::table
                        .filter(users::username.eq(username.as_ref()))
                        .select(users::id)
                        .first::<i64>(conn)
                        .await
                        .optional()?
                        .ok_or(CompanyRepositoryError::UserNotFound)?;

                    let invitee_is_member = diesel::select(exists(
                        company_members::table
                            .filter(company_members::company_id.eq(company.get()))
                            .filter(company_members::user_id.eq(invitee)),
                    ))
                    .get_result::<bool>(conn)
                    .await?;
                    let pending_exists = diesel::select(exists(
                        company_invitations::table
                            .filter(company_invitations::company_id.eq(company.get()))
                            .filter(company_invitations::invited_user_id.eq(invitee))
                            .filter(
                                company_invitations::status.eq(InvitationStatus::Pending.as_str()),
                            ),
                    ))
                    .get_result::<bool>(conn)
                    .await?;

                    InvitationPreconditions {
                        owner: UserId::new(owner),
                        inviter: invited_by,
                        invitee: UserId::new(invitee),
                        invitee_is_member,
                        pending_exists,
                    }
                    .evaluate()
                    .map_err(CompanyRepositoryError::rejected)?;

                    let row = diesel::insert_into(company_invitations::table)
                        .values(&NewInvitationRow {
                            company_id: company.get(),
                            invited_user_id: invitee,
                            invited_by: invited_by.get(),
                            status: InvitationStatus::Pending.as_str(),
                        })
                        .returning(InvitationRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let inviter_name = users::table
                        .find(invited_by.get())
                        .select(users::username)
                        .first::<String>(conn)
                        .await?;
                    let company_name = CompanyName::new(&company_name)
                        .map_err(|err| corrupt("company", company.get(), err))?;
                    let inviter_name = Username::new(&inviter_name)
                        .map_err(|err| corrupt("user", invited_by.get(), err))?;
                    let note = NewNotification::company_invite(
                        UserId::new(invitee),
                        InvitationId::new(row.id),
                        &company_name,
                        &inviter_name,
                    );
                    diesel::insert_into(notifications::table)
                        .values(&NewNotificationRow {
                            user_id: note.user_id.get(),
                            kind: note.kind,
                            title: &note.title,
                            message: &note.message,
                            related_entity_type: note.related_entity_type,
                            related_entity_id: note.related_entity_id,
                        })
                        .execute(conn)
                        .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_invitation_tx_error)?;

        invitation_from_row(row)
    }

    async fn list_invitations(
        &self,
        invitee: UserId,
    ) -> Result<Vec<InvitationView>, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InvitationViewRow> = company_invitations::table
            .inner_join(companies::table)
            .inner_join(users::table.on(users::id.eq(company_invitations::invited_by)))
            .filter(company_invitations::invited_user_id.eq(invitee.get()))
            .filter(company_invitations::status.eq(InvitationStatus::Pending.as_str()))
            .order((
                company_invitations::created_at.desc(),
                company_invitations::id.desc(),
            ))
            .select((
                company_invitations::id,
                company_invitations::company_id,
                companies::name,
                company_invitations::invited_by,
                users::username,
                company_invitations::status,
                company_invitations::created_at,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(view_from_row).collect()
    }

    async fn accept_invitation(
        &self,
        invitation: InvitationId,
        invitee: UserId,
    ) -> Result<(), CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let row = company_invitations::table
                    .filter(company_invitations::id.eq(invitation.get()))
                    .filter(company_invitations::invited_user_id.eq(invitee.get()))
                    .select(InvitationRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(CompanyRepositoryError::InvitationNotFound)?;
                parse_status(row.id, &row.status)?
                    .respond(InvitationStatus::Accepted)
                    .map_err(|_| CompanyRepositoryError::InvitationAlreadyHandled)?;

                diesel::insert_into(company_members::table)
                    .values(&NewMemberRow {
                        company_id: row.company_id,
                        user_id: invitee.get(),
                        role: MemberRole::Member.as_str(),
                    })
                    .on_conflict((company_members::company_id, company_members::user_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;

                let flipped = diesel::update(
                    company_invitations::table
                        .filter(company_invitations::id.eq(row.id))
                        .filter(company_invitations::status.eq(InvitationStatus::Pending.as_str())),
                )
                .set((
                    company_invitations::status.eq(InvitationStatus::Accepted.as_str()),
                    company_invitations::responded_at.eq(Some(Utc::now())),
                ))
                .execute(conn)
                .await?;
                if flipped == 0 {
                    return Err(CompanyRepositoryError::InvitationAlreadyHandled.into());
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn decline_invitation(
        &self,
        invitation: InvitationId,
        invitee: UserId,
    ) -> Result<(), CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            company_invitations::table
                .filter(company_invitations::id.eq(invitation.get()))
                .filter(company_invitations::invited_user_id.eq(invitee.get()))
                .filter(company_invitations::status.eq(InvitationStatus::Pending.as_str())),
        )
        .set((
            company_invitations::status.eq(InvitationStatus::Declined.as_str()),
            company_invitations::responded_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(CompanyRepositoryError::invitation_not_found());
        }
        Ok(())
    }

    async fn is_member(
        &self,
        company: CompanyId,
        user: UserId,
    ) -> Result<bool, CompanyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            company_members::table
                .filter(company_members::company_id.eq(company.get()))
                .filter(company_members::user_id.eq(user.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Mapping and row conversion coverage.
    use super::*;
    use chrono::TimeZone;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct Violation(&'static str);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("company_invitations")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: &'static str) -> TxError {
        TxError::Diesel(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Violation(constraint)),
        ))
    }

    #[rstest]
    fn pending_index_violation_means_already_invited() {
        assert_eq!(
            map_invitation_tx_error(unique_violation(PENDING_INVITATION_INDEX)),
            CompanyRepositoryError::rejected(InvitationRejection::AlreadyInvited)
        );
    }

    #[rstest]
    fn other_unique_violations_stay_query_errors() {
        let mapped = map_invitation_tx_error(unique_violation("company_invitations_pkey"));
        assert!(matches!(mapped, CompanyRepositoryError::Query { .. }));
    }

    #[rstest]
    fn domain_errors_pass_through_transactions() {
        let mapped = map_tx_error(TxError::Domain(CompanyRepositoryError::UserNotFound));
        assert_eq!(mapped, CompanyRepositoryError::UserNotFound);
    }

    #[rstest]
    fn unknown_invitation_status_is_reported() {
        let row = InvitationRow {
            id: 4,
            company_id: 1,
            invited_user_id: 2,
            invited_by: 1,
            status: "expired".to_owned(),
            created_at: Utc.timestamp_opt(0, 0).single().expect("epoch"),
            responded_at: None,
        };
        let err = invitation_from_row(row).expect_err("unknown status");
        assert!(err.to_string().contains("stored invitation 4 is invalid"));
    }
}

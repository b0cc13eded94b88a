//! In-process store implementing every repository port.
//!
//! Used when no database URL is configured and by the scenario tests. All
//! tables sit behind one mutex, so each operation is trivially atomic and the
//! invitation workflow sees the same preconditions the SQL adapter checks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{
    CompanyRepository, CompanyRepositoryError, EventRepository, EventRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Company, CompanyId, CompanyInvitation, CompanyUpdate, Email, Event, EventId, EventStatus,
    EventUpdate, InvitationId, InvitationPreconditions, InvitationStatus, InvitationView,
    MemberRole, NewCompany, NewEvent, NewNotification, NewUser, PasswordHash, UserId, Username,
};

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    email: Email,
    username: Username,
    password_hash: PasswordHash,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<UserId, UserRecord>,
    companies: BTreeMap<CompanyId, Company>,
    members: BTreeMap<(CompanyId, UserId), MemberRole>,
    invitations: BTreeMap<InvitationId, CompanyInvitation>,
    notifications: Vec<NewNotification>,
    events: BTreeMap<EventId, Event>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn is_member(&self, company: CompanyId, user: UserId) -> bool {
        self.members.contains_key(&(company, user))
    }

    fn user_by_username(&self, username: &Username) -> Option<&UserRecord> {
        self.users.values().find(|user| &user.username == username)
    }

    fn owned_company(&mut self, company: CompanyId, owner: UserId) -> Option<&mut Company> {
        self.companies
            .get_mut(&company)
            .filter(|found| found.created_by == owner)
    }

    fn owned_event(&mut self, event: EventId, editor: UserId) -> Option<&mut Event> {
        self.events
            .get_mut(&event)
            .filter(|found| found.created_by == editor)
    }
}

/// Newest first, ties broken by id.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Shared in-memory store; clones share the same tables.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Notifications addressed to `user`, oldest first.
    pub fn notifications_for(&self, user: UserId) -> Vec<NewNotification> {
        self.tables()
            .notifications
            .iter()
            .filter(|note| note.user_id == user)
            .cloned()
            .collect()
    }

    /// Role of `user` in `company`, if any.
    pub fn role_of(&self, company: CompanyId, user: UserId) -> Option<MemberRole> {
        self.tables().members.get(&(company, user)).copied()
    }

    /// Every invitation regardless of status.
    pub fn invitation(&self, id: InvitationId) -> Option<CompanyInvitation> {
        self.tables().invitations.get(&id).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn user_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        Ok(self.tables().users.values().any(|user| &user.email == email))
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        let mut tables = self.tables();
        if tables.users.values().any(|found| found.email == user.email) {
            return Err(UserPersistenceError::duplicate("email taken"));
        }
        if tables.user_by_username(&user.username).is_some() {
            return Err(UserPersistenceError::duplicate("username taken"));
        }
        let id = UserId::new(tables.next_id());
        tables.users.insert(
            id,
            UserRecord {
                id,
                email: user.email.clone(),
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(id)
    }

    async fn find_user_id(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|user| &user.email == email && &user.password_hash == password_hash)
            .map(|user| user.id))
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn create_company(
        &self,
        company: &NewCompany,
    ) -> Result<CompanyId, CompanyRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        let id = CompanyId::new(tables.next_id());
        tables.companies.insert(
            id,
            Company {
                id,
                name: company.name.clone(),
                description: company.description.clone(),
                created_by: company.created_by,
                created_at: now,
                updated_at: now,
            },
        );
        tables
            .members
            .insert((id, company.created_by), MemberRole::Owner);
        Ok(id)
    }

    async fn get_company(
        &self,
        company: CompanyId,
        viewer: UserId,
    ) -> Result<Option<Company>, CompanyRepositoryError> {
        let tables = self.tables();
        Ok(tables
            .companies
            .get(&company)
            .filter(|_| tables.is_member(company, viewer))
            .cloned())
    }

    async fn list_companies(&self, member: UserId) -> Result<Vec<Company>, CompanyRepositoryError> {
        let tables = self.tables();
        let mut found: Vec<Company> = tables
            .companies
            .values()
            .filter(|company| tables.is_member(company.id, member))
            .cloned()
            .collect();
        newest_first(&mut found, |company| (company.created_at, company.id.get()));
        Ok(found)
    }

    async fn update_company(
        &self,
        company: CompanyId,
        owner: UserId,
        update: &CompanyUpdate,
    ) -> Result<(), CompanyRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        let found = tables
            .owned_company(company, owner)
            .ok_or(CompanyRepositoryError::CompanyNotFound)?;
        if let Some(name) = &update.name {
            found.name = name.clone();
        }
        if let Some(description) = &update.description {
            found.description = Some(description.clone());
        }
        found.updated_at = now;
        Ok(())
    }

    async fn delete_company(
        &self,
        company: CompanyId,
        owner: UserId,
    ) -> Result<(), CompanyRepositoryError> {
        let mut tables = self.tables();
        if tables.owned_company(company, owner).is_none() {
            return Err(CompanyRepositoryError::company_not_found());
        }
        tables.companies.remove(&company);
        tables.members.retain(|(id, _), _| *id != company);
        tables
            .invitations
            .retain(|_, invitation| invitation.company_id != company);
        tables
            .events
            .retain(|_, event| event.company_id != Some(company));
        Ok(())
    }

    async fn company_owner(
        &self,
        company: CompanyId,
    ) -> Result<Option<UserId>, CompanyRepositoryError> {
        Ok(self
            .tables()
            .companies
            .get(&company)
            .map(|found| found.created_by))
    }

    async fn create_invitation(
        &self,
        company: CompanyId,
        invited_by: UserId,
        username: &Username,
    ) -> Result<CompanyInvitation, CompanyRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        let found = tables
            .companies
            .get(&company)
            .ok_or(CompanyRepositoryError::CompanyNotFound)?;
        let owner = found.created_by;
        let company_name = found.name.clone();
        InvitationPreconditions::check_owner(owner, invited_by)
            .map_err(CompanyRepositoryError::rejected)?;

        let invitee = tables
            .user_by_username(username)
            .map(|user| user.id)
            .ok_or(CompanyRepositoryError::UserNotFound)?;
        let pending_exists = tables.invitations.values().any(|invitation| {
            invitation.company_id == company
                && invitation.invited_user_id == invitee
                && invitation.status == InvitationStatus::Pending
        });
        InvitationPreconditions {
            owner,
            inviter: invited_by,
            invitee,
            invitee_is_member: tables.is_member(company, invitee),
            pending_exists,
        }
        .evaluate()
        .map_err(CompanyRepositoryError::rejected)?;

        let inviter_name = tables
            .users
            .get(&invited_by)
            .map(|user| user.username.clone())
            .ok_or_else(|| CompanyRepositoryError::query("inviting user is missing"))?;
        let invitation = CompanyInvitation {
            id: InvitationId::new(tables.next_id()),
            company_id: company,
            invited_user_id: invitee,
            invited_by,
            status: InvitationStatus::Pending,
            created_at: now,
            responded_at: None,
        };
        tables.notifications.push(NewNotification::company_invite(
            invitee,
            invitation.id,
            &company_name,
            &inviter_name,
        ));
        tables.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn list_invitations(
        &self,
        invitee: UserId,
    ) -> Result<Vec<InvitationView>, CompanyRepositoryError> {
        let tables = self.tables();
        let mut views = Vec::new();
        for invitation in tables.invitations.values().filter(|invitation| {
            invitation.invited_user_id == invitee && invitation.status == InvitationStatus::Pending
        }) {
            let (Some(company), Some(inviter)) = (
                tables.companies.get(&invitation.company_id),
                tables.users.get(&invitation.invited_by),
            ) else {
                continue;
            };
            views.push(InvitationView {
                id: invitation.id,
                company_id: invitation.company_id,
                company_name: company.name.clone(),
                invited_by: invitation.invited_by,
                invited_by_username: inviter.username.clone(),
                status: invitation.status,
                created_at: invitation.created_at,
            });
        }
        newest_first(&mut views, |view| (view.created_at, view.id.get()));
        Ok(views)
    }

    async fn accept_invitation(
        &self,
        invitation: InvitationId,
        invitee: UserId,
    ) -> Result<(), CompanyRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        let found = tables
            .invitations
            .get_mut(&invitation)
            .filter(|found| found.invited_user_id == invitee)
            .ok_or(CompanyRepositoryError::InvitationNotFound)?;
        found.status = found
            .status
            .respond(InvitationStatus::Accepted)
            .map_err(|_| CompanyRepositoryError::InvitationAlreadyHandled)?;
        found.responded_at = Some(now);
        let company = found.company_id;
        tables
            .members
            .entry((company, invitee))
            .or_insert(MemberRole::Member);
        Ok(())
    }

    async fn decline_invitation(
        &self,
        invitation: InvitationId,
        invitee: UserId,
    ) -> Result<(), CompanyRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        let found = tables
            .invitations
            .get_mut(&invitation)
            .filter(|found| {
                found.invited_user_id == invitee && found.status == InvitationStatus::Pending
            })
            .ok_or(CompanyRepositoryError::InvitationNotFound)?;
        found.status = InvitationStatus::Declined;
        found.responded_at = Some(now);
        Ok(())
    }

    async fn is_member(
        &self,
        company: CompanyId,
        user: UserId,
    ) -> Result<bool, CompanyRepositoryError> {
        Ok(self.tables().is_member(company, user))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create_event(&self, event: &NewEvent) -> Result<EventId, EventRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        if let Some(company) = event.company_id {
            if !tables.is_member(company, event.created_by) {
                return Err(EventRepositoryError::not_member());
            }
        }
        let id = EventId::new(tables.next_id());
        tables.events.insert(
            id,
            Event {
                id,
                company_id: event.company_id,
                created_by: event.created_by,
                title: event.title.clone(),
                description: event.description.clone(),
                start_time: event.time.start(),
                end_time: event.time.end(),
                place_name: event.place_name.clone(),
                place_link: event.place_link.clone(),
                status: EventStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get_event(
        &self,
        event: EventId,
        viewer: UserId,
    ) -> Result<Option<Event>, EventRepositoryError> {
        let tables = self.tables();
        Ok(tables
            .events
            .get(&event)
            .filter(|found| {
                let member = found
                    .company_id
                    .is_some_and(|company| tables.is_member(company, viewer));
                found.is_visible_to(viewer, member)
            })
            .cloned())
    }

    async fn list_events(&self, viewer: UserId) -> Result<Vec<Event>, EventRepositoryError> {
        let tables = self.tables();
        let mut found: Vec<Event> = tables
            .events
            .values()
            .filter(|event| {
                let member = event
                    .company_id
                    .is_some_and(|company| tables.is_member(company, viewer));
                event.is_visible_to(viewer, member)
            })
            .cloned()
            .collect();
        newest_first(&mut found, |event| (event.created_at, event.id.get()));
        Ok(found)
    }

    async fn list_company_events(
        &self,
        company: CompanyId,
        viewer: UserId,
    ) -> Result<Vec<Event>, EventRepositoryError> {
        let tables = self.tables();
        if !tables.is_member(company, viewer) {
            return Err(EventRepositoryError::not_member());
        }
        let mut found: Vec<Event> = tables
            .events
            .values()
            .filter(|event| event.company_id == Some(company))
            .cloned()
            .collect();
        newest_first(&mut found, |event| (event.created_at, event.id.get()));
        Ok(found)
    }

    async fn update_event(
        &self,
        event: EventId,
        editor: UserId,
        update: &EventUpdate,
    ) -> Result<(), EventRepositoryError> {
        let now = self.now();
        let mut tables = self.tables();
        if let Some(company) = update.company_id {
            if !tables.is_member(company, editor) {
                return Err(EventRepositoryError::not_member());
            }
        }
        let found = tables
            .owned_event(event, editor)
            .ok_or(EventRepositoryError::NotFound)?;
        let mut merged = found.apply(update).map_err(EventRepositoryError::invalid)?;
        merged.updated_at = now;
        *found = merged;
        Ok(())
    }

    async fn delete_event(
        &self,
        event: EventId,
        editor: UserId,
    ) -> Result<(), EventRepositoryError> {
        let mut tables = self.tables();
        if tables.owned_event(event, editor).is_none() {
            return Err(EventRepositoryError::not_found());
        }
        tables.events.remove(&event);
        Ok(())
    }
}

#[cfg(test)]
mod tests;

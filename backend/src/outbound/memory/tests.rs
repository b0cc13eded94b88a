//! Behavioural coverage for the in-memory store.

use super::*;
use chrono::{Local, TimeDelta, TimeZone};
use rstest::{fixture, rstest};

use crate::domain::{CompanyName, EventTitle, InvitationRejection, TimeRange};

struct TickingClock(Mutex<DateTime<Utc>>);

impl Clock for TickingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    /// Each reading is one second after the last, so insert order is visible
    /// in timestamps.
    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now += TimeDelta::seconds(1);
        *now
    }
}

#[fixture]
fn store() -> MemoryStore {
    let start = Utc
        .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
        .single()
        .expect("valid start");
    MemoryStore::new(Arc::new(TickingClock(Mutex::new(start))))
}

async fn register(store: &MemoryStore, name: &str) -> UserId {
    store
        .create_user(&NewUser {
            email: Email::new(format!("{name}@example.com")).expect("valid email"),
            username: Username::new(name).expect("valid username"),
            password_hash: PasswordHash::new(format!("{name}-digest")),
        })
        .await
        .expect("user created")
}

async fn found_company(store: &MemoryStore, owner: UserId, name: &str) -> CompanyId {
    store
        .create_company(&NewCompany {
            name: CompanyName::new(name).expect("valid name"),
            description: None,
            created_by: owner,
        })
        .await
        .expect("company created")
}

fn draft(creator: UserId, company: Option<CompanyId>, title: &str) -> NewEvent {
    NewEvent {
        company_id: company,
        created_by: creator,
        title: EventTitle::new(title).expect("valid title"),
        description: None,
        time: TimeRange::default(),
        place_name: None,
        place_link: None,
    }
}

fn username(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

#[rstest]
#[tokio::test]
async fn duplicate_accounts_are_refused(store: MemoryStore) {
    register(&store, "ann").await;
    let clash = NewUser {
        email: Email::new("ann@example.com").expect("valid email"),
        username: username("other"),
        password_hash: PasswordHash::new("x"),
    };
    assert_eq!(
        store.create_user(&clash).await,
        Err(UserPersistenceError::duplicate("email taken"))
    );
    let clash = NewUser {
        email: Email::new("other@example.com").expect("valid email"),
        username: username("ann"),
        password_hash: PasswordHash::new("x"),
    };
    assert_eq!(
        store.create_user(&clash).await,
        Err(UserPersistenceError::duplicate("username taken"))
    );
}

#[rstest]
#[tokio::test]
async fn company_owner_follows_the_company(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let acme = found_company(&store, ann, "Acme").await;

    assert_eq!(store.company_owner(acme).await, Ok(Some(ann)));
    store.delete_company(acme, ann).await.expect("deleted");
    assert_eq!(store.company_owner(acme).await, Ok(None));
}

#[rstest]
#[tokio::test]
async fn login_requires_matching_digest(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let email = Email::new("ann@example.com").expect("valid email");
    assert_eq!(
        store
            .find_user_id(&email, &PasswordHash::new("ann-digest"))
            .await,
        Ok(Some(ann))
    );
    assert_eq!(
        store.find_user_id(&email, &PasswordHash::new("wrong")).await,
        Ok(None)
    );
    assert_eq!(store.user_exists(&email).await, Ok(true));
}

#[rstest]
#[tokio::test]
async fn founder_becomes_owner_and_only_members_see_the_company(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;

    assert_eq!(store.role_of(acme, ann), Some(MemberRole::Owner));
    assert!(store.get_company(acme, ann).await.expect("query").is_some());
    assert_eq!(store.get_company(acme, bob).await, Ok(None));
}

#[rstest]
#[tokio::test]
async fn companies_are_listed_newest_first(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let first = found_company(&store, ann, "First").await;
    let second = found_company(&store, ann, "Second").await;

    let ids: Vec<_> = store
        .list_companies(ann)
        .await
        .expect("listed")
        .into_iter()
        .map(|company| company.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[rstest]
#[tokio::test]
async fn only_the_owner_may_update_or_delete(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;
    let update = CompanyUpdate {
        name: Some(CompanyName::new("Acme Ltd").expect("valid name")),
        description: None,
    };

    assert_eq!(
        store.update_company(acme, bob, &update).await,
        Err(CompanyRepositoryError::CompanyNotFound)
    );
    assert_eq!(
        store.delete_company(acme, bob).await,
        Err(CompanyRepositoryError::CompanyNotFound)
    );
    store
        .update_company(acme, ann, &update)
        .await
        .expect("owner updates");
    let renamed = store
        .get_company(acme, ann)
        .await
        .expect("query")
        .expect("present");
    assert_eq!(renamed.name.as_ref(), "Acme Ltd");
    assert!(renamed.updated_at > renamed.created_at);
}

#[rstest]
#[tokio::test]
async fn deleting_a_company_cascades(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let acme = found_company(&store, ann, "Acme").await;
    let event = store
        .create_event(&draft(ann, Some(acme), "Kick-off"))
        .await
        .expect("event created");

    store.delete_company(acme, ann).await.expect("deleted");

    assert_eq!(store.role_of(acme, ann), None);
    assert_eq!(store.get_event(event, ann).await, Ok(None));
}

#[rstest]
#[tokio::test]
async fn invitation_issues_a_notification(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;

    let invitation = store
        .create_invitation(acme, ann, &username("bob"))
        .await
        .expect("invited");

    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.invited_user_id, bob);
    let notes = store.notifications_for(bob);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "You were invited to Acme by ann");
    assert_eq!(notes[0].related_entity_id, invitation.id.get());
}

#[rstest]
#[tokio::test]
async fn ownership_is_checked_before_the_invitee_exists(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;

    assert_eq!(
        store
            .create_invitation(acme, bob, &username("ghost"))
            .await,
        Err(CompanyRepositoryError::rejected(InvitationRejection::NotOwner))
    );
    assert_eq!(
        store
            .create_invitation(acme, ann, &username("ghost"))
            .await,
        Err(CompanyRepositoryError::UserNotFound)
    );
    assert_eq!(
        store
            .create_invitation(CompanyId::new(999), ann, &username("bob"))
            .await,
        Err(CompanyRepositoryError::CompanyNotFound)
    );
}

#[rstest]
#[tokio::test]
async fn repeated_and_redundant_invitations_are_rejected(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;

    store
        .create_invitation(acme, ann, &username("bob"))
        .await
        .expect("first invitation");
    assert_eq!(
        store.create_invitation(acme, ann, &username("bob")).await,
        Err(CompanyRepositoryError::rejected(
            InvitationRejection::AlreadyInvited
        ))
    );
    assert_eq!(
        store.create_invitation(acme, ann, &username("ann")).await,
        Err(CompanyRepositoryError::rejected(InvitationRejection::SelfInvitation))
    );
}

#[rstest]
#[tokio::test]
async fn accepting_grants_membership_once(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;
    let invitation = store
        .create_invitation(acme, ann, &username("bob"))
        .await
        .expect("invited");

    assert_eq!(
        store.accept_invitation(invitation.id, ann).await,
        Err(CompanyRepositoryError::InvitationNotFound)
    );
    store
        .accept_invitation(invitation.id, bob)
        .await
        .expect("accepted");

    assert_eq!(store.role_of(acme, bob), Some(MemberRole::Member));
    let stored = store.invitation(invitation.id).expect("kept");
    assert_eq!(stored.status, InvitationStatus::Accepted);
    assert!(stored.responded_at.is_some());
    assert_eq!(
        store.accept_invitation(invitation.id, bob).await,
        Err(CompanyRepositoryError::InvitationAlreadyHandled)
    );
    assert_eq!(
        store.create_invitation(acme, ann, &username("bob")).await,
        Err(CompanyRepositoryError::rejected(
            InvitationRejection::AlreadyMember
        ))
    );
}

#[rstest]
#[tokio::test]
async fn declined_invitations_leave_the_pending_list(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;
    let globex = found_company(&store, ann, "Globex").await;
    let first = store
        .create_invitation(acme, ann, &username("bob"))
        .await
        .expect("invited");
    let second = store
        .create_invitation(globex, ann, &username("bob"))
        .await
        .expect("invited");

    let pending = store.list_invitations(bob).await.expect("listed");
    assert_eq!(
        pending.iter().map(|view| view.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
    assert_eq!(pending[0].company_name.as_ref(), "Globex");
    assert_eq!(pending[0].invited_by_username.as_ref(), "ann");

    store
        .decline_invitation(first.id, bob)
        .await
        .expect("declined");
    assert_eq!(
        store.decline_invitation(first.id, bob).await,
        Err(CompanyRepositoryError::InvitationNotFound)
    );
    let pending = store.list_invitations(bob).await.expect("listed");
    assert_eq!(pending.len(), 1);
    assert_eq!(store.role_of(acme, bob), None);
}

#[rstest]
#[tokio::test]
async fn company_events_need_membership(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;

    assert_eq!(
        store.create_event(&draft(bob, Some(acme), "Crash")).await,
        Err(EventRepositoryError::NotMember)
    );
    assert_eq!(
        store.list_company_events(acme, bob).await,
        Err(EventRepositoryError::NotMember)
    );
}

#[rstest]
#[tokio::test]
async fn visibility_follows_membership(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let acme = found_company(&store, ann, "Acme").await;
    let personal = store
        .create_event(&draft(ann, None, "Dentist"))
        .await
        .expect("created");
    let shared = store
        .create_event(&draft(ann, Some(acme), "Retro"))
        .await
        .expect("created");

    let ids: Vec<_> = store
        .list_events(ann)
        .await
        .expect("listed")
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(ids, vec![shared, personal]);
    assert_eq!(store.list_events(bob).await, Ok(vec![]));
    assert_eq!(store.get_event(personal, bob).await, Ok(None));

    let invitation = store
        .create_invitation(acme, ann, &username("bob"))
        .await
        .expect("invited");
    store
        .accept_invitation(invitation.id, bob)
        .await
        .expect("accepted");
    let seen: Vec<_> = store
        .list_events(bob)
        .await
        .expect("listed")
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(seen, vec![shared]);
}

#[rstest]
#[tokio::test]
async fn only_the_creator_edits_events(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let event = store
        .create_event(&draft(ann, None, "Dentist"))
        .await
        .expect("created");
    let update = EventUpdate {
        place_name: Some("Clinic".to_owned()),
        ..EventUpdate::default()
    };

    assert_eq!(
        store.update_event(event, bob, &update).await,
        Err(EventRepositoryError::NotFound)
    );
    assert_eq!(
        store.delete_event(event, bob).await,
        Err(EventRepositoryError::NotFound)
    );
    store
        .update_event(event, ann, &update)
        .await
        .expect("updated");
    let stored = store
        .get_event(event, ann)
        .await
        .expect("query")
        .expect("present");
    assert_eq!(stored.place_name.as_deref(), Some("Clinic"));

    store.delete_event(event, ann).await.expect("deleted");
    assert_eq!(store.get_event(event, ann).await, Ok(None));
}

#[rstest]
#[tokio::test]
async fn moving_an_event_requires_target_membership(store: MemoryStore) {
    let ann = register(&store, "ann").await;
    let bob = register(&store, "bob").await;
    let foreign = found_company(&store, bob, "Globex").await;
    let event = store
        .create_event(&draft(ann, None, "Dentist"))
        .await
        .expect("created");
    let update = EventUpdate {
        company_id: Some(foreign),
        ..EventUpdate::default()
    };

    assert_eq!(
        store.update_event(event, ann, &update).await,
        Err(EventRepositoryError::NotMember)
    );
}

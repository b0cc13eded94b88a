//! Integration tests for `DieselCompanyRepository` against embedded PostgreSQL.
//!
//! Covers the transactional invitation workflow: ownership and duplicate
//! rules, the pending-invitation index under concurrent issuance, and
//! accept/decline retries.

use diesel::sql_types::BigInt;
use diesel::{QueryableByName, sql_query};
use diesel_async::RunQueryDsl;
use rstest::{fixture, rstest};

use crewplan_backend::domain::ports::{
    CompanyRepository, CompanyRepositoryError, UserRepository,
};
use crewplan_backend::domain::{
    CompanyId, CompanyName, Email, InvitationRejection, InvitationStatus, NewCompany, NewUser,
    PasswordHash, UserId, Username,
};
use crewplan_backend::outbound::persistence::{
    DbPool, DieselCompanyRepository, DieselUserRepository,
};

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{PgContext, pg_context};

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Ann owns Acme; Bob and Carol have accounts only.
struct World {
    ctx: PgContext,
    repo: DieselCompanyRepository,
    ann: UserId,
    bob: UserId,
    carol: UserId,
    acme: CompanyId,
}

impl World {
    fn run<T>(&self, future: impl Future<Output = T>) -> T {
        self.ctx.runtime.block_on(future)
    }

    fn count(&self, query: &'static str, id: i64) -> i64 {
        let pool = self.ctx.pool.clone();
        self.run(async move {
            let mut conn = pool.get().await.expect("connection");
            sql_query(query)
                .bind::<BigInt, _>(id)
                .get_result::<Count>(&mut conn)
                .await
                .expect("count query")
                .count
        })
    }
}

fn username(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

async fn register(pool: &DbPool, name: &str) -> UserId {
    DieselUserRepository::new(pool.clone())
        .create_user(&NewUser {
            email: Email::new(format!("{name}@example.com")).expect("valid email"),
            username: username(name),
            password_hash: PasswordHash::new(format!("{name}-digest")),
        })
        .await
        .expect("user stored")
}

fn build_world(ctx: PgContext) -> World {
    let repo = DieselCompanyRepository::new(ctx.pool.clone());
    let (ann, bob, carol, acme) = ctx.runtime.block_on(async {
        let ann = register(&ctx.pool, "ann").await;
        let bob = register(&ctx.pool, "bob").await;
        let carol = register(&ctx.pool, "carol").await;
        let acme = repo
            .create_company(&NewCompany {
                name: CompanyName::new("Acme").expect("valid name"),
                description: Some("Rockets".to_owned()),
                created_by: ann,
            })
            .await
            .expect("company stored");
        (ann, bob, carol, acme)
    });
    World {
        ctx,
        repo,
        ann,
        bob,
        carol,
        acme,
    }
}

#[fixture]
fn world() -> Option<World> {
    pg_context(8).map(build_world)
}

macro_rules! world_or_skip {
    ($world:expr) => {
        match $world {
            Some(world) => world,
            None => {
                eprintln!("SKIP-TEST-CLUSTER: embedded PostgreSQL unavailable");
                return;
            }
        }
    };
}

#[rstest]
fn creator_becomes_the_owning_member(world: Option<World>) {
    let w = world_or_skip!(world);

    assert_eq!(w.run(w.repo.is_member(w.acme, w.ann)), Ok(true));
    assert_eq!(w.run(w.repo.company_owner(w.acme)), Ok(Some(w.ann)));
    let listed = w.run(w.repo.list_companies(w.ann)).expect("companies");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, w.acme);
    assert_eq!(listed[0].created_by, w.ann);
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM company_members \
             WHERE user_id = $1 AND role = 'owner'",
            w.ann.get(),
        ),
        1
    );
}

#[rstest]
fn accepted_invitation_grants_membership_once(world: Option<World>) {
    let w = world_or_skip!(world);

    let invitation = w
        .run(w.repo.create_invitation(w.acme, w.ann, &username("bob")))
        .expect("invited");
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.invited_user_id, w.bob);
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM notifications \
             WHERE user_id = $1 AND kind = 'company_invite'",
            w.bob.get(),
        ),
        1
    );

    let pending = w.run(w.repo.list_invitations(w.bob)).expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].company_name.as_ref(), "Acme");
    assert_eq!(pending[0].invited_by_username.as_ref(), "ann");

    assert_eq!(w.run(w.repo.accept_invitation(invitation.id, w.bob)), Ok(()));
    assert_eq!(w.run(w.repo.is_member(w.acme, w.bob)), Ok(true));
    assert!(w.run(w.repo.list_invitations(w.bob)).expect("pending").is_empty());

    assert_eq!(
        w.run(w.repo.accept_invitation(invitation.id, w.bob)),
        Err(CompanyRepositoryError::InvitationAlreadyHandled)
    );
    assert_eq!(
        w.run(w.repo.decline_invitation(invitation.id, w.bob)),
        Err(CompanyRepositoryError::InvitationNotFound)
    );
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM company_members WHERE user_id = $1",
            w.bob.get(),
        ),
        1
    );
}

#[rstest]
fn invitations_answer_only_to_their_invitee(world: Option<World>) {
    let w = world_or_skip!(world);
    let invitation = w
        .run(w.repo.create_invitation(w.acme, w.ann, &username("bob")))
        .expect("invited");

    assert_eq!(
        w.run(w.repo.accept_invitation(invitation.id, w.carol)),
        Err(CompanyRepositoryError::InvitationNotFound)
    );
    assert_eq!(w.run(w.repo.is_member(w.acme, w.carol)), Ok(false));
    assert_eq!(w.run(w.repo.list_invitations(w.bob)).expect("pending").len(), 1);
}

#[rstest]
fn non_owner_invitations_leave_no_rows(world: Option<World>) {
    let w = world_or_skip!(world);

    assert_eq!(
        w.run(w.repo.create_invitation(w.acme, w.carol, &username("bob"))),
        Err(CompanyRepositoryError::rejected(InvitationRejection::NotOwner))
    );
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM company_invitations WHERE company_id = $1",
            w.acme.get(),
        ),
        0
    );
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM notifications WHERE user_id = $1",
            w.bob.get(),
        ),
        0
    );
}

#[rstest]
fn invitation_rules_are_enforced_in_order(world: Option<World>) {
    let w = world_or_skip!(world);

    assert_eq!(
        w.run(w.repo.create_invitation(w.acme, w.ann, &username("nobody"))),
        Err(CompanyRepositoryError::UserNotFound)
    );
    assert_eq!(
        w.run(w.repo.create_invitation(w.acme, w.ann, &username("ann"))),
        Err(CompanyRepositoryError::rejected(InvitationRejection::SelfInvitation))
    );
    assert_eq!(
        w.run(w.repo.create_invitation(CompanyId::new(9_999), w.ann, &username("bob"))),
        Err(CompanyRepositoryError::CompanyNotFound)
    );

    w.run(w.repo.create_invitation(w.acme, w.ann, &username("bob")))
        .expect("first invitation");
    assert_eq!(
        w.run(w.repo.create_invitation(w.acme, w.ann, &username("bob"))),
        Err(CompanyRepositoryError::rejected(InvitationRejection::AlreadyInvited))
    );
}

#[rstest]
fn declined_invitations_can_be_reissued(world: Option<World>) {
    let w = world_or_skip!(world);
    let first = w
        .run(w.repo.create_invitation(w.acme, w.ann, &username("carol")))
        .expect("invited");

    assert_eq!(w.run(w.repo.decline_invitation(first.id, w.carol)), Ok(()));
    assert_eq!(w.run(w.repo.is_member(w.acme, w.carol)), Ok(false));

    let second = w
        .run(w.repo.create_invitation(w.acme, w.ann, &username("carol")))
        .expect("reissued");
    assert_ne!(second.id, first.id);
    w.run(w.repo.accept_invitation(second.id, w.carol))
        .expect("accepted");

    assert_eq!(
        w.run(w.repo.create_invitation(w.acme, w.ann, &username("carol"))),
        Err(CompanyRepositoryError::rejected(InvitationRejection::AlreadyMember))
    );
}

#[rstest]
fn concurrent_invitations_leave_one_pending_row(world: Option<World>) {
    let w = world_or_skip!(world);

    let results = w.run(async {
        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let repo = w.repo.clone();
                let (acme, ann) = (w.acme, w.ann);
                tokio::spawn(async move {
                    repo.create_invitation(acme, ann, &username("bob")).await
                })
            })
            .collect();
        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            results.push(task.await.expect("task completed"));
        }
        results
    });

    let issued = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(issued, 1, "results: {results:?}");
    for result in results.iter().filter(|result| result.is_err()) {
        assert_eq!(
            result,
            &Err(CompanyRepositoryError::rejected(InvitationRejection::AlreadyInvited))
        );
    }
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM company_invitations \
             WHERE invited_user_id = $1 AND status = 'pending'",
            w.bob.get(),
        ),
        1
    );
    assert_eq!(
        w.count(
            "SELECT COUNT(*) AS count FROM notifications WHERE user_id = $1",
            w.bob.get(),
        ),
        1
    );
}

#[rstest]
fn deleting_a_company_withdraws_its_invitations(world: Option<World>) {
    let w = world_or_skip!(world);
    w.run(w.repo.create_invitation(w.acme, w.ann, &username("bob")))
        .expect("invited");

    assert_eq!(
        w.run(w.repo.delete_company(w.acme, w.bob)),
        Err(CompanyRepositoryError::CompanyNotFound)
    );
    assert_eq!(w.run(w.repo.delete_company(w.acme, w.ann)), Ok(()));

    assert!(w.run(w.repo.list_invitations(w.bob)).expect("pending").is_empty());
    assert_eq!(w.run(w.repo.company_owner(w.acme)), Ok(None));
    assert_eq!(w.run(w.repo.get_company(w.acme, w.ann)), Ok(None));
}

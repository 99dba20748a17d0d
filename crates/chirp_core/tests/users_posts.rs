use chirp_core::db::open_db_in_memory;
use chirp_core::service::user_service::SUGGESTION_LIMIT;
use chirp_core::{
    CreatePostRequest, EntityRef, ForbiddenAction, InvalidOperation, PostService,
    PostValidationError, ProfilePatch, RegisterUserRequest, ServiceError, SocialService,
    SqliteFollowRepository, SqlitePostRepository, SqliteUserRepository, UserId, UserService,
};
use rusqlite::Connection;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;
use uuid::Uuid;

fn users(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
}

fn posts(
    conn: &Connection,
) -> PostService<SqlitePostRepository<'_>, SqliteUserRepository<'_>> {
    PostService::new(
        SqlitePostRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    )
}

fn social(
    conn: &Connection,
) -> SocialService<SqliteFollowRepository<'_>, SqlitePostRepository<'_>> {
    SocialService::new(
        SqliteFollowRepository::try_new(conn).unwrap(),
        SqlitePostRepository::try_new(conn).unwrap(),
    )
}

fn register(conn: &Connection, username: &str) -> UserId {
    users(conn)
        .register(&RegisterUserRequest {
            username: username.to_string(),
            full_name: username.to_string(),
            email: Some(format!("{username}@example.com")),
        })
        .unwrap()
        .user
        .id
}

fn text_post(text: &str) -> CreatePostRequest {
    CreatePostRequest {
        text: Some(text.to_string()),
        img: None,
    }
}

#[test]
fn register_rejects_duplicate_username_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "alice");

    let err = users(&conn)
        .register(&RegisterUserRequest {
            username: "ALICE".to_string(),
            full_name: "Other".to_string(),
            email: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidOperation(InvalidOperation::Conflict { field: "username", .. })
    ));
}

#[test]
fn profile_lookup_by_username_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");

    let profile = users(&conn).get_profile_by_username("Alice").unwrap();
    assert_eq!(profile.user.id, alice);

    let err = users(&conn).get_profile_by_username("nobody").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Username(_))));
}

#[test]
fn update_profile_applies_patch_and_checks_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    register(&conn, "bob");
    let users = users(&conn);

    let updated = users
        .update_profile(
            alice,
            &ProfilePatch {
                bio: Some("hello there".to_string()),
                link: Some("https://alice.dev".to_string()),
                ..ProfilePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.user.bio.as_deref(), Some("hello there"));
    assert_eq!(updated.user.username, "alice");

    let err = users
        .update_profile(
            alice,
            &ProfilePatch {
                email: Some("bob@example.com".to_string()),
                ..ProfilePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidOperation(InvalidOperation::Conflict { field: "email", .. })
    ));
}

#[test]
fn suggestions_exclude_self_and_followed_and_cap_at_four() {
    let conn = open_db_in_memory().unwrap();
    let actor = register(&conn, "actor");
    let mut others = Vec::new();
    for idx in 0..6 {
        others.push(register(&conn, &format!("user{idx}")));
    }
    let social = social(&conn);
    social.follow_unfollow(actor, others[0]).unwrap();
    social.follow_unfollow(actor, others[1]).unwrap();

    let suggestions = users(&conn).suggested_users(actor).unwrap();
    assert_eq!(suggestions.len(), SUGGESTION_LIMIT);
    let ids: HashSet<UserId> = suggestions.iter().map(|profile| profile.id).collect();
    assert_eq!(ids.len(), SUGGESTION_LIMIT);
    assert!(!ids.contains(&actor));
    assert!(!ids.contains(&others[0]));
    assert!(!ids.contains(&others[1]));
}

#[test]
fn suggestions_may_be_under_filled() {
    let conn = open_db_in_memory().unwrap();
    let actor = register(&conn, "actor");
    let other = register(&conn, "other");

    let suggestions = users(&conn).suggested_users(actor).unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].id, other);

    let err = users(&conn).suggested_users(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::User(_))));
}

#[test]
fn create_post_requires_text_or_image() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");

    let err = posts(&conn)
        .create_post(alice, CreatePostRequest::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidOperation(InvalidOperation::InvalidPost(
            PostValidationError::EmptyBody
        ))
    ));

    let created = posts(&conn)
        .create_post(
            alice,
            CreatePostRequest {
                text: None,
                img: Some("https://cdn.example.com/a.png".to_string()),
            },
        )
        .unwrap();
    assert_eq!(created.post.owner, alice);
    assert_eq!(created.owner_profile.username, "alice");
    assert!(created.likes.is_empty());
    assert!(created.comments.is_empty());
}

#[test]
fn delete_post_is_owner_only_and_cascades() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let posts = posts(&conn);
    let post = posts.create_post(alice, text_post("bye")).unwrap().post.id;
    let social = social(&conn);
    social.like_unlike(bob, post).unwrap();
    social.comment(bob, post, "nice").unwrap();

    let err = posts.delete_post(bob, post).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Forbidden(ForbiddenAction::DeletePost(id)) if id == post
    ));

    posts.delete_post(alice, post).unwrap();
    assert!(matches!(
        posts.get_post(post).unwrap_err(),
        ServiceError::NotFound(EntityRef::Post(_))
    ));
    assert!(users(&conn).get_profile(bob).unwrap().liked_posts.is_empty());
    let comments: i64 = conn
        .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(comments, 0);
}

#[test]
fn feeds_filter_by_relationship_and_list_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let bob = register(&conn, "bob");
    let carol = register(&conn, "carol");
    let posts = posts(&conn);
    let social = social(&conn);

    let bob_first = posts.create_post(bob, text_post("b1")).unwrap().post.id;
    let carol_post = posts.create_post(carol, text_post("c1")).unwrap().post.id;
    let bob_second = posts.create_post(bob, text_post("b2")).unwrap().post.id;

    let all: Vec<_> = posts
        .all_posts()
        .unwrap()
        .into_iter()
        .map(|record| record.post.id)
        .collect();
    assert_eq!(all, vec![bob_second, carol_post, bob_first]);

    social.follow_unfollow(alice, bob).unwrap();
    let following: Vec<_> = posts
        .following_posts(alice)
        .unwrap()
        .into_iter()
        .map(|record| record.post.id)
        .collect();
    assert_eq!(following, vec![bob_second, bob_first]);

    social.like_unlike(alice, carol_post).unwrap();
    let liked = posts.liked_posts(alice).unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].post.id, carol_post);
    assert!(liked[0].is_liked_by(alice));

    let by_bob = posts.user_posts("BOB").unwrap();
    assert_eq!(by_bob.len(), 2);
    assert!(by_bob.iter().all(|record| record.post.owner == bob));

    assert!(matches!(
        posts.following_posts(Uuid::new_v4()).unwrap_err(),
        ServiceError::NotFound(EntityRef::User(_))
    ));
    assert!(matches!(
        posts.user_posts("nobody").unwrap_err(),
        ServiceError::NotFound(EntityRef::Username(_))
    ));
}

#[test]
fn timestamps_have_millisecond_resolution() {
    let conn = open_db_in_memory().unwrap();
    let alice = register(&conn, "alice");
    let posts = posts(&conn);

    let first = posts.create_post(alice, text_post("one")).unwrap();
    sleep(Duration::from_millis(20));
    let second = posts.create_post(alice, text_post("two")).unwrap();

    let gap = second.post.created_at - first.post.created_at;
    assert!(gap >= 15, "gap was {gap}ms");
    assert_ne!(gap % 1000, 0, "gap was {gap}ms");

    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    assert!((now_ms - second.post.created_at).abs() < 60_000);
}

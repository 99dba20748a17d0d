use chirp_core::db::open_db_in_memory;
use chirp_core::{
    CreatePostRequest, EntityRef, InvalidOperation, NotificationKind, NotificationService,
    PostId, PostService, PostValidationError, RegisterUserRequest, ServiceError, SocialService,
    SqliteFollowRepository, SqliteNotificationRepository, SqlitePostRepository,
    SqliteUserRepository, UserId, UserService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn register(conn: &Connection, username: &str) -> UserId {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
        .register(&RegisterUserRequest {
            username: username.to_string(),
            full_name: username.to_uppercase(),
            email: None,
        })
        .unwrap()
        .user
        .id
}

fn publish(conn: &Connection, owner: UserId, text: &str) -> PostId {
    PostService::new(
        SqlitePostRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    )
    .create_post(
        owner,
        CreatePostRequest {
            text: Some(text.to_string()),
            img: None,
        },
    )
    .unwrap()
    .post
    .id
}

fn social(
    conn: &Connection,
) -> SocialService<SqliteFollowRepository<'_>, SqlitePostRepository<'_>> {
    SocialService::new(
        SqliteFollowRepository::try_new(conn).unwrap(),
        SqlitePostRepository::try_new(conn).unwrap(),
    )
}

fn notification_count(conn: &Connection, recipient: UserId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE to_uuid = ?1;",
        [recipient.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn like_twice_toggles_back_and_changes_length_by_one() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let fan = register(&conn, "fan");
    let post = publish(&conn, owner, "hello");
    let social = social(&conn);

    let first = social.like_unlike(fan, post).unwrap();
    assert!(first.liked);
    assert_eq!(first.likes, vec![fan]);

    let second = social.like_unlike(fan, post).unwrap();
    assert!(!second.liked);
    assert!(second.likes.is_empty());
}

#[test]
fn likes_and_liked_posts_stay_symmetric() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let fan = register(&conn, "fan");
    let other = register(&conn, "other");
    let post = publish(&conn, owner, "hello");
    let social = social(&conn);
    let users = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());

    social.like_unlike(fan, post).unwrap();
    let outcome = social.like_unlike(other, post).unwrap();
    assert_eq!(outcome.likes, vec![fan, other]);
    assert_eq!(users.get_profile(fan).unwrap().liked_posts, vec![post]);
    assert_eq!(users.get_profile(other).unwrap().liked_posts, vec![post]);

    social.like_unlike(fan, post).unwrap();
    assert!(users.get_profile(fan).unwrap().liked_posts.is_empty());
    assert_eq!(users.get_profile(other).unwrap().liked_posts, vec![post]);
}

#[test]
fn like_notifies_owner_once_per_like_and_unlike_keeps_it() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let fan = register(&conn, "fan");
    let post = publish(&conn, owner, "hello");
    let social = social(&conn);

    social.like_unlike(fan, post).unwrap();
    social.like_unlike(fan, post).unwrap();
    assert_eq!(notification_count(&conn, owner), 1);

    let records = NotificationService::new(SqliteNotificationRepository::try_new(&conn).unwrap())
        .fetch_and_mark_read(owner)
        .unwrap();
    assert_eq!(records[0].kind, NotificationKind::Like);
    assert_eq!(records[0].from.id, fan);
}

#[test]
fn self_like_does_not_notify_owner() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let post = publish(&conn, owner, "my own post");
    let social = social(&conn);

    let outcome = social.like_unlike(owner, post).unwrap();
    assert_eq!(outcome.likes, vec![owner]);
    assert_eq!(notification_count(&conn, owner), 0);
}

#[test]
fn like_missing_post_or_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let post = publish(&conn, owner, "hello");
    let social = social(&conn);

    let missing_post = Uuid::new_v4();
    let err = social.like_unlike(owner, missing_post).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Post(id)) if id == missing_post));

    let ghost = Uuid::new_v4();
    let err = social.like_unlike(ghost, post).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::User(id)) if id == ghost));
    assert_eq!(notification_count(&conn, owner), 0);
}

#[test]
fn comment_appends_one_entry_and_preserves_order() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let fan = register(&conn, "fan");
    let post = publish(&conn, owner, "hello");
    let social = social(&conn);

    let first = social.comment(fan, post, "first!").unwrap();
    assert_eq!(first.len(), 1);

    let second = social.comment(owner, post, "  thanks  ").unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0], first[0]);
    assert_eq!(second[1].author, owner);
    assert_eq!(second[1].text, "thanks");
    assert_eq!(second[0].author_profile.id, fan);
    assert_eq!(second[0].author_profile.username, "fan");
    assert_eq!(second[1].author_profile.full_name, "OWNER");

    let third = social.comment(fan, post, "first!").unwrap();
    assert_eq!(third.len(), 3);
    assert_eq!(third[2].text, "first!");
}

#[test]
fn empty_comment_is_rejected_without_state_change() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let post = publish(&conn, owner, "hello");
    let social = social(&conn);

    let err = social.comment(owner, post, "   ").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidOperation(InvalidOperation::InvalidPost(
            PostValidationError::EmptyComment
        ))
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn comment_on_missing_post_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "owner");
    let missing = Uuid::new_v4();

    let err = social(&conn).comment(owner, missing, "hi").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Post(id)) if id == missing));
}

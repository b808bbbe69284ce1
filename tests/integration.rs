use std::sync::Arc;

use chatter::core::db::{seed_demo_data, DEMO_PASSWORD};
use chatter::{
    Config, CoreError, ErrorKind, ManualClock, NotificationType, SocialApp, Timestamp,
};

fn test_app() -> (SocialApp, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Timestamp::new(2025, 1, 1, 8, 0, 0), 1));
    let app = SocialApp::with_clock(Config::lightweight(), Box::new(clock.clone()));
    (app, clock)
}

#[test]
fn test_full_user_flow() {
    let (mut app, _clock) = test_app();

    // 1. Register
    let alice = app.register("alice", "password1", "hi there").unwrap();
    let bobby = app.register("bobby", "password2", "").unwrap();
    assert_eq!(alice, 1001);

    // 2. Login
    let user = app.login("alice", "password1").unwrap();
    assert_eq!(user.id, alice);
    assert_eq!(user.bio, "hi there");

    // 3. Create post
    let post_id = app.create_post(alice, "Test post from integration test!").unwrap();
    let post = app.find_post(post_id).unwrap();
    assert_eq!(post.content, "Test post from integration test!");
    assert_eq!(post.author_id, alice);

    // 4. Edit post
    app.edit_post(post_id, alice, "Updated content from integration test!").unwrap();
    assert_eq!(app.find_post(post_id).unwrap().content, "Updated content from integration test!");

    // 5. Follow and read the feed
    app.follow(bobby, alice).unwrap();
    let feed = app.feed_for(bobby).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, post_id);

    // 6. Interact and check the author's inbox
    app.like_post(post_id, bobby).unwrap();
    app.comment_on_post(post_id, bobby, "nice").unwrap();
    let kinds: Vec<_> = app.notifications_for(alice).iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationType::Comment, NotificationType::Like, NotificationType::Follow]
    );
    assert_eq!(app.unread_count(alice), 3);
}

#[test]
fn test_registration_and_login_scenario() {
    let (mut app, _clock) = test_app();

    assert_eq!(app.register("alice", "password1", "").unwrap(), 1001);

    let err = app.register("alice", "password2", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);

    assert_eq!(app.login("alice", "password1").unwrap().id, 1001);
    assert_eq!(app.login("alice", "wrong").unwrap_err(), CoreError::WrongPassword);
}

#[test]
fn test_login_invalid_credentials() {
    let (mut app, _clock) = test_app();
    app.register("someone", "password1", "").unwrap();

    let err = app.login("nonexistent_user", "wrongpass").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = app.login("someone", "wrongpass").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_post_content_validation() {
    let (mut app, _clock) = test_app();
    let id = app.register("validator", "password1", "").unwrap();

    assert_eq!(app.create_post(id, "").unwrap_err(), CoreError::EmptyContent);
    let err = app.create_post(id, &"a".repeat(281)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    assert!(app.content().is_empty());
}

#[test]
fn test_create_post_requires_account() {
    let (mut app, _clock) = test_app();
    assert_eq!(
        app.create_post(4242, "Test post without an account").unwrap_err(),
        CoreError::UserNotFound(4242)
    );
}

#[test]
fn test_ownership_is_enforced() {
    let (mut app, _clock) = test_app();
    let owner = app.register("owner", "password1", "").unwrap();
    let other = app.register("other", "password1", "").unwrap();
    let post_id = app.create_post(owner, "mine").unwrap();

    assert_eq!(app.edit_post(post_id, other, "yours").unwrap_err(), CoreError::NotOwner);
    assert_eq!(app.delete_post(post_id, other).unwrap_err(), CoreError::NotOwner);
    assert_eq!(app.find_post(post_id).unwrap().content, "mine");

    app.comment_on_post(post_id, other, "hello").unwrap();
    let deleted = app.delete_post(post_id, owner).unwrap();
    assert_eq!(deleted.comments.len(), 1);
    assert!(app.find_post(post_id).is_none());
}

#[test]
fn test_self_like_is_rejected() {
    let (mut app, _clock) = test_app();
    let author = app.register("author", "password1", "").unwrap();
    let post_id = app.create_post(author, "hello").unwrap();

    assert_eq!(app.like_post(post_id, author).unwrap_err(), CoreError::SelfLike);
    assert_eq!(app.find_post(post_id).unwrap().like_count, 0);
    assert!(app.notifications_for(author).is_empty());
}

#[test]
fn test_feed_keeps_twenty_most_recent() {
    let (mut app, clock) = test_app();
    let reader = app.register("reader", "password1", "").unwrap();

    let mut authors = Vec::new();
    for i in 0..25 {
        let id = app.register(&format!("author{:02}", i), "password1", "").unwrap();
        app.follow(reader, id).unwrap();
        authors.push(id);
    }
    // post out of registration order so the feed has to sort by time
    let mut expected = Vec::new();
    for (i, author) in authors.iter().enumerate().rev() {
        clock.set(Timestamp::new(2025, 2, 1, 10, i as i32, 0));
        let post_id = app.create_post(*author, "hello").unwrap();
        expected.push((i, post_id));
    }
    expected.sort_by(|a, b| b.0.cmp(&a.0));
    let expected: Vec<_> = expected.into_iter().take(20).map(|(_, id)| id).collect();

    let feed: Vec<_> = app.feed_for(reader).unwrap().iter().map(|p| p.id).collect();
    assert_eq!(feed.len(), 20);
    assert_eq!(feed, expected);
}

#[test]
fn test_feed_is_empty_without_followings() {
    let (mut app, _clock) = test_app();
    let loner = app.register("loner", "password1", "").unwrap();
    let other = app.register("other", "password1", "").unwrap();
    app.create_post(other, "anyone?").unwrap();
    assert!(app.feed_for(loner).unwrap().is_empty());
}

#[test]
fn test_notification_priority_scenario() {
    let (mut app, clock) = test_app();
    let target = app.register("target", "password1", "").unwrap();
    let fan = app.register("fan", "password1", "").unwrap();
    let post_id = app.create_post(target, "hello").unwrap();

    clock.set(Timestamp::new(2025, 3, 1, 10, 0, 0));
    app.follow(fan, target).unwrap();
    clock.set(Timestamp::new(2025, 3, 1, 11, 0, 0));
    app.like_post(post_id, fan).unwrap();
    clock.set(Timestamp::new(2025, 3, 1, 9, 0, 0));
    app.comment_on_post(post_id, fan, "first!").unwrap();

    let seen: Vec<_> = app
        .notifications_for(target)
        .iter()
        .map(|n| (n.kind, n.created_at.hour))
        .collect();
    assert_eq!(
        seen,
        vec![
            (NotificationType::Comment, 9),
            (NotificationType::Like, 11),
            (NotificationType::Follow, 10),
        ]
    );

    // peeking twice changes nothing
    assert_eq!(app.notifications_for(target), app.notifications_for(target));

    let top = app.read_next_notification(target).unwrap();
    assert_eq!(top.kind, NotificationType::Comment);
    assert!(top.is_read);
    assert_eq!(app.notifications_for(target).len(), 2);

    app.clear_notifications(target);
    assert_eq!(app.read_next_notification(target).unwrap_err().kind(), ErrorKind::Empty);
}

#[test]
fn test_full_inbox_does_not_block_actions() {
    let clock = Arc::new(ManualClock::new(Timestamp::new(2025, 1, 1, 0, 0, 0), 1));
    let config = Config { notification_capacity: 1, ..Config::lightweight() };
    let mut app = SocialApp::with_clock(config, Box::new(clock));

    let star = app.register("star", "password1", "").unwrap();
    let a = app.register("fan_a", "password1", "").unwrap();
    let b = app.register("fan_b", "password1", "").unwrap();

    app.follow(a, star).unwrap();
    app.follow(b, star).unwrap();
    assert!(app.is_following(b, star));
    assert_eq!(app.notifications_for(star).len(), 1);
}

#[test]
fn test_unbounded_capacities_do_not_preallocate() {
    let clock = Arc::new(ManualClock::new(Timestamp::new(2025, 1, 1, 0, 0, 0), 1));
    let config = Config {
        notification_capacity: usize::MAX,
        history_capacity: usize::MAX,
        ..Config::lightweight()
    };
    let mut app = SocialApp::with_clock(config, Box::new(clock));

    let a = app.register("fan_a", "password1", "").unwrap();
    let b = app.register("star", "password1", "").unwrap();
    app.follow(a, b).unwrap();
    app.visit_profile(a, b).unwrap();
    assert_eq!(app.notifications_for(b).len(), 1);
    assert_eq!(app.history_for(a).len(), 1);
}

#[test]
fn test_own_comments_do_not_notify() {
    let (mut app, _clock) = test_app();
    let author = app.register("author", "password1", "").unwrap();
    let post_id = app.create_post(author, "hello").unwrap();
    app.comment_on_post(post_id, author, "replying to myself").unwrap();
    assert!(app.notifications_for(author).is_empty());
}

#[test]
fn test_history_scenario() {
    let (mut app, _clock) = test_app();
    let viewer = app.register("viewer", "password1", "").unwrap();
    let u1 = app.register("user_one", "password1", "").unwrap();
    let u2 = app.register("user_two", "password1", "").unwrap();
    let post_id = app.create_post(u2, "A sunset photo\nwith a caption").unwrap();

    app.visit_profile(viewer, u1).unwrap();
    app.visit_profile(viewer, u1).unwrap();
    assert_eq!(app.history_for(viewer).len(), 1);
    app.visit_profile(viewer, u2).unwrap();
    assert_eq!(app.history_for(viewer).len(), 2);

    app.visit_post(viewer, post_id).unwrap();
    let history = app.history_for(viewer);
    let top = &history[0];
    assert_eq!(top.post_title.as_deref(), Some("A sunset photo"));
    assert_eq!(top.display_username, "user_two");

    assert_eq!(app.go_back(viewer).unwrap().target_id, post_id.to_string());
    assert_eq!(app.go_back(viewer).unwrap().target_id, u2.to_string());
    app.clear_history(viewer);
    assert_eq!(app.go_back(viewer).unwrap_err(), CoreError::HistoryEmpty);
}

#[test]
fn test_delete_account_keeps_posts_and_ids() {
    let (mut app, _clock) = test_app();
    let alice = app.register("alice", "password1", "").unwrap();
    let bobby = app.register("bobby", "password1", "").unwrap();
    app.follow(bobby, alice).unwrap();
    let post_id = app.create_post(alice, "still here").unwrap();

    app.delete_account(alice).unwrap();
    assert!(!app.is_following(bobby, alice));
    assert!(app.notifications_for(alice).is_empty());
    assert_eq!(app.find_post(post_id).unwrap().author_id, alice);
    assert_eq!(app.register("carol", "password1", "").unwrap(), bobby + 1);
}

#[test]
fn test_seed_is_idempotent() {
    let (mut app, _clock) = test_app();
    seed_demo_data(&mut app).unwrap();
    let users = app.users().len();
    let posts = app.content().len();

    seed_demo_data(&mut app).unwrap();
    assert_eq!(app.users().len(), users);
    assert_eq!(app.content().len(), posts);

    let tester = app.login("tester", DEMO_PASSWORD).unwrap().id;
    assert!(!app.feed_for(tester).unwrap().is_empty());
    let alice = app.users().find_by_username("alice").unwrap().id;
    assert!(!app.notifications_for(alice).is_empty());
}

use std::fs;
use std::sync::Arc;

use chatter::core::storage::{load_snapshot, save_snapshot, Snapshot, SNAPSHOT_VERSION};
use chatter::{Config, CoreError, ManualClock, NotificationType, SocialApp, Timestamp};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Timestamp::new(2025, 5, 1, 12, 0, 0), 1))
}

fn populated_app() -> SocialApp {
    let mut app = SocialApp::with_clock(Config::lightweight(), Box::new(clock()));
    let alice = app.register("alice", "password1", "hello").unwrap();
    let bobby = app.register("bobby", "password2", "").unwrap();
    app.follow(bobby, alice).unwrap();
    let first = app.create_post(alice, "first").unwrap();
    app.create_post(alice, "second").unwrap();
    app.like_post(first, bobby).unwrap();
    app.comment_on_post(first, bobby, "nice one").unwrap();
    app
}

#[test]
fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");
    let app = populated_app();
    save_snapshot(&app, &path).unwrap();

    let loaded = load_snapshot(&path, Config::lightweight(), Box::new(clock())).unwrap();
    assert_eq!(Snapshot::capture(&loaded), Snapshot::capture(&app));

    // credentials survive
    assert_eq!(loaded.login("alice", "password1").unwrap().id, 1001);
    assert!(loaded.login("alice", "password2").is_err());

    let posts: Vec<_> = loaded.content().posts().map(|p| p.content.as_str()).collect();
    assert_eq!(posts, vec!["second", "first"]);
    assert!(loaded.is_following(1002, 1001));

    let kinds: Vec<_> = loaded.notifications_for(1001).iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationType::Comment, NotificationType::Like, NotificationType::Follow]
    );
}

#[test]
fn test_missing_file_gives_empty_app() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let app = load_snapshot(&path, Config::lightweight(), Box::new(clock())).unwrap();
    assert!(app.users().is_empty());
    assert!(app.content().is_empty());
    assert!(!path.exists());
}

#[test]
fn test_counters_resume_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");
    save_snapshot(&populated_app(), &path).unwrap();

    let mut loaded = load_snapshot(&path, Config::lightweight(), Box::new(clock())).unwrap();
    assert_eq!(loaded.register("carol", "password3", "").unwrap(), 1003);
    let post_id = loaded.create_post(1003, "third").unwrap();
    assert_eq!(post_id, 1003);
    assert_eq!(loaded.content().posts().next().unwrap().id, post_id);

    // a new notification gets an id past the restored ones
    loaded.follow(1003, 1001).unwrap();
    let ids: Vec<_> = loaded.notifications_for(1001).iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), 4);
    let newest = ids.iter().max().unwrap();
    assert_eq!(ids.iter().filter(|id| *id == newest).count(), 1);
}

#[test]
fn test_one_sided_edges_are_repaired_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");

    let mut snapshot = Snapshot::capture(&populated_app());
    // drop bobby from alice's followers, keep alice in bobby's followings
    snapshot.users[0].followers.clear();
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let loaded = load_snapshot(&path, Config::lightweight(), Box::new(clock())).unwrap();
    assert!(loaded.is_following(1002, 1001));
    assert_eq!(loaded.users().find_by_id(1001).unwrap().followers, vec![1002]);
}

#[test]
fn test_unknown_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");

    let mut snapshot = Snapshot::capture(&populated_app());
    snapshot.version = SNAPSHOT_VERSION + 1;
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    assert!(load_snapshot(&path, Config::lightweight(), Box::new(clock())).is_err());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(load_snapshot(&path, Config::lightweight(), Box::new(clock())).is_err());
}

#[test]
fn test_exhausted_ids_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");

    let mut snapshot = Snapshot::capture(&populated_app());
    snapshot.users[0].id = u32::MAX;
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
    let err = load_snapshot(&path, Config::lightweight(), Box::new(clock())).unwrap_err();
    assert!(format!("{:#}", err).contains("restoring users"));

    let mut snapshot = Snapshot::capture(&populated_app());
    snapshot.posts[0].id = u32::MAX;
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
    assert!(load_snapshot(&path, Config::lightweight(), Box::new(clock())).is_err());

    let mut snapshot = Snapshot::capture(&populated_app());
    for items in snapshot.inboxes.values_mut() {
        for n in items.iter_mut() {
            n.id = u32::MAX;
        }
    }
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
    assert!(load_snapshot(&path, Config::lightweight(), Box::new(clock())).is_err());
}

#[test]
fn test_maxed_like_count_is_an_error_not_a_wrap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatter.json");

    let mut snapshot = Snapshot::capture(&populated_app());
    snapshot.posts[1].like_count = u32::MAX;
    let post_id = snapshot.posts[1].id;
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let mut loaded = load_snapshot(&path, Config::lightweight(), Box::new(clock())).unwrap();
    assert_eq!(loaded.like_post(post_id, 1002).unwrap_err(), CoreError::TooManyLikes);
    assert_eq!(loaded.find_post(post_id).unwrap().like_count, u32::MAX);
}

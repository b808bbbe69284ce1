use tracing::info;

use crate::app::SocialApp;
use crate::core::errors::Result;
use crate::models::models::UserId;

pub const DEMO_PASSWORD: &str = "password";

const DEMO_USERS: [(&str, &str); 3] = [
    ("tester", "Test user bio"),
    ("alice", "Hello, I'm Alice!"),
    ("bobby", "Bob's corner of the internet"),
];

fn find_or_register(app: &mut SocialApp, username: &str, bio: &str) -> Result<(UserId, bool)> {
    if let Some(u) = app.users().find_by_username(username) {
        return Ok((u.id, false));
    }
    Ok((app.register(username, DEMO_PASSWORD, bio)?, true))
}

/// Creates the demo accounts, their posts and a little activity between them.
/// Running it again only fills in whatever is missing.
pub fn seed_demo_data(app: &mut SocialApp) -> Result<()> {
    let mut ids = Vec::with_capacity(DEMO_USERS.len());
    let mut created = 0;
    for (username, bio) in DEMO_USERS {
        let (id, fresh) = find_or_register(app, username, bio)?;
        ids.push((id, fresh));
        if fresh {
            created += 1;
        }
    }
    if created == 0 {
        return Ok(());
    }

    let (tester, tester_new) = ids[0];
    let (alice, alice_new) = ids[1];
    let (bobby, bobby_new) = ids[2];

    if tester_new {
        app.create_post(tester, "This is my first post on chatter!")?;
    }
    let mut alice_post = None;
    if alice_new {
        app.create_post(alice, "Welcome to my board! Excited to share thoughts here.")?;
        alice_post = Some(app.create_post(alice, "Just finished an amazing project. Feeling productive today!")?);
    }
    if bobby_new {
        app.create_post(
            bobby,
            "Hey everyone! Just joined chatter, looking forward to connecting with you all.",
        )?;
    }

    for (follower, target) in [(tester, bobby), (tester, alice), (bobby, alice)] {
        if !app.is_following(follower, target) {
            app.follow(follower, target)?;
        }
    }

    if let Some(post_id) = alice_post {
        app.like_post(post_id, bobby)?;
        app.comment_on_post(post_id, tester, "Congrats, what was it?")?;
    }

    info!(created, "seeded demo data");
    Ok(())
}

pub fn reset_data(app: &mut SocialApp) {
    app.reset();
}

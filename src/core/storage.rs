//! JSON snapshot of everything worth keeping between runs: accounts (with
//! follow sets and credential hashes), posts with their comments, and
//! notification inboxes. Browsing history is session state and is not saved.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::SocialApp;
use crate::config::Config;
use crate::core::helpers::Clock;
use crate::follow::reconcile_follow_graph;
use crate::models::models::{Notification, Post, User, UserId};
use crate::notifications::NotificationQueue;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub users: Vec<User>,
    /// Newest first.
    pub posts: Vec<Post>,
    #[serde(default)]
    pub inboxes: BTreeMap<UserId, Vec<Notification>>,
}

impl Snapshot {
    pub fn capture(app: &SocialApp) -> Self {
        Snapshot {
            version: SNAPSHOT_VERSION,
            users: app.users.list_all().cloned().collect(),
            posts: app.posts.posts().cloned().collect(),
            inboxes: app
                .inboxes
                .iter()
                .filter(|(_, q)| !q.is_empty())
                .map(|(id, q)| (*id, q.peek_all_ordered_by_priority()))
                .collect(),
        }
    }

    /// Rebuilds an app through the bulk-load paths, so id counters end up one
    /// past the largest stored id and follow edges are made symmetric.
    pub fn restore(self, config: Config, clock: Box<dyn Clock>) -> anyhow::Result<SocialApp> {
        if self.version != SNAPSHOT_VERSION {
            bail!("unsupported snapshot version {}", self.version);
        }

        let mut app = SocialApp::with_clock(config, clock);
        app.users.bulk_load(self.users).context("restoring users")?;
        reconcile_follow_graph(&mut app.users);
        app.posts.bulk_load(self.posts).context("restoring posts")?;

        let capacity = app.config().notification_capacity;
        for (user_id, items) in self.inboxes {
            if !app.users.contains(user_id) {
                continue;
            }
            let mut queue = NotificationQueue::new(capacity);
            queue
                .restore(items)
                .with_context(|| format!("restoring notifications for user {}", user_id))?;
            app.inboxes.insert(user_id, queue);
        }
        Ok(app)
    }
}

/// Writes to a sibling temp file first and renames it into place.
pub fn save_snapshot(app: &SocialApp, path: &Path) -> anyhow::Result<()> {
    let snapshot = Snapshot::capture(app);
    let tmp = path.with_extension("json.tmp");

    {
        let file = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &snapshot).context("encoding snapshot")?;
        writer.flush().context("flushing snapshot")?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;

    info!(
        path = %path.display(),
        users = snapshot.users.len(),
        posts = snapshot.posts.len(),
        "saved snapshot"
    );
    Ok(())
}

/// A missing file is not an error: it yields an empty app.
pub fn load_snapshot(path: &Path, config: Config, clock: Box<dyn Clock>) -> anyhow::Result<SocialApp> {
    if !path.exists() {
        info!(path = %path.display(), "no snapshot yet, starting empty");
        return Ok(SocialApp::with_clock(config, clock));
    }

    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;

    let (users, posts) = (snapshot.users.len(), snapshot.posts.len());
    let app = snapshot.restore(config, clock)?;
    info!(path = %path.display(), users, posts, "loaded snapshot");
    Ok(app)
}

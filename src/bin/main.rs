//! Console driver for the chatter store.
//!
//! Each invocation loads the snapshot, performs one action and saves it again.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chatter::core::db::{reset_data, seed_demo_data};
use chatter::core::storage::{load_snapshot, save_snapshot};
use chatter::{Config, Post, PostId, SocialApp, SystemClock, UserId};

#[derive(Parser)]
#[command(name = "chatter", version, about = "Toy social network backed by a JSON snapshot")]
struct Cli {
    /// Snapshot file (defaults to CHATTER_DATA_FILE or chatter.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Credentials {
    #[arg(short, long)]
    user: String,
    #[arg(short, long)]
    password: String,
}

#[derive(Subcommand)]
enum Command {
    /// Create the demo accounts and posts
    Seed,
    /// Remove all data
    Reset,
    Register {
        username: String,
        password: String,
        #[arg(long, default_value = "")]
        bio: String,
    },
    /// Check credentials
    Login(Credentials),
    /// List all accounts
    Users,
    /// Find accounts whose username contains the term, ignoring case
    Search { term: String },
    /// Show an account and its posts
    Profile { username: String },
    Post {
        #[command(flatten)]
        auth: Credentials,
        content: String,
    },
    Edit {
        #[command(flatten)]
        auth: Credentials,
        post_id: PostId,
        content: String,
    },
    Delete {
        #[command(flatten)]
        auth: Credentials,
        post_id: PostId,
    },
    Like {
        #[command(flatten)]
        auth: Credentials,
        post_id: PostId,
    },
    Unlike {
        #[command(flatten)]
        auth: Credentials,
        post_id: PostId,
    },
    Comment {
        #[command(flatten)]
        auth: Credentials,
        post_id: PostId,
        content: String,
    },
    /// Show a post with its comments
    Show { post_id: PostId },
    Follow {
        #[command(flatten)]
        auth: Credentials,
        target: String,
    },
    Unfollow {
        #[command(flatten)]
        auth: Credentials,
        target: String,
    },
    /// Newest posts from the accounts you follow
    Feed(Credentials),
    /// List notifications in priority order
    Notifications(Credentials),
    /// Consume the most urgent notification
    Read(Credentials),
}

fn login(app: &SocialApp, auth: &Credentials) -> anyhow::Result<UserId> {
    let user = app
        .login(&auth.user, &auth.password)
        .with_context(|| format!("login as '{}' failed", auth.user))?;
    Ok(user.id)
}

fn resolve(app: &SocialApp, username: &str) -> anyhow::Result<UserId> {
    app.users()
        .find_by_username(username)
        .map(|u| u.id)
        .ok_or_else(|| anyhow::anyhow!("no account named '{}'", username))
}

fn author_name(app: &SocialApp, id: UserId) -> String {
    app.users()
        .find_by_id(id)
        .map(|u| u.username.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

fn print_post(app: &SocialApp, post: &Post) {
    println!(
        "[{}] {} @ {} | {} likes, {} comments",
        post.id,
        author_name(app, post.author_id),
        post.created_at,
        post.like_count,
        post.comment_count()
    );
    println!("    {}", post.content);
}

/// Returns whether the snapshot needs saving.
fn run(app: &mut SocialApp, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Seed => {
            seed_demo_data(app)?;
            println!("Demo data ready (password for every demo account: 'password')");
        }
        Command::Reset => {
            reset_data(app);
            println!("All data removed");
        }
        Command::Register { username, password, bio } => {
            let id = app.register(&username, &password, &bio)?;
            println!("Registered '{}' with id {}", username, id);
        }
        Command::Login(auth) => {
            let id = login(app, &auth)?;
            let user = app.users().find_by_id(id).context("account vanished")?;
            println!(
                "Welcome back, {} (id {}). Following {}, followers {}, {} unread notifications",
                user.username,
                user.id,
                user.following_count(),
                user.follower_count(),
                app.unread_count(id)
            );
            return Ok(false);
        }
        Command::Users => {
            for user in app.users().list_all() {
                println!("{:>6}  {:<20} {}", user.id, user.username, user.bio);
            }
            return Ok(false);
        }
        Command::Search { term } => {
            let mut found = 0;
            for user in app.users().search(&term) {
                println!("{:>6}  {:<20} {}", user.id, user.username, user.bio);
                found += 1;
            }
            if found == 0 {
                println!("No users match '{}'", term);
            }
            return Ok(false);
        }
        Command::Profile { username } => {
            let id = resolve(app, &username)?;
            let user = app.users().find_by_id(id).context("account vanished")?;
            println!(
                "{} (id {}) | following {}, followers {}",
                user.username,
                user.id,
                user.following_count(),
                user.follower_count()
            );
            if !user.bio.is_empty() {
                println!("    {}", user.bio);
            }
            for post in app.content().posts_by(id) {
                print_post(app, post);
            }
            return Ok(false);
        }
        Command::Post { auth, content } => {
            let id = login(app, &auth)?;
            let post_id = app.create_post(id, &content)?;
            println!("Post created with id {}", post_id);
        }
        Command::Edit { auth, post_id, content } => {
            let id = login(app, &auth)?;
            app.edit_post(post_id, id, &content)?;
            println!("Post {} updated", post_id);
        }
        Command::Delete { auth, post_id } => {
            let id = login(app, &auth)?;
            app.delete_post(post_id, id)?;
            println!("Post {} deleted", post_id);
        }
        Command::Like { auth, post_id } => {
            let id = login(app, &auth)?;
            let likes = app.like_post(post_id, id)?;
            println!("Liked post {} ({} likes)", post_id, likes);
        }
        Command::Unlike { auth, post_id } => {
            let id = login(app, &auth)?;
            let likes = app.unlike_post(post_id, id)?;
            println!("Unliked post {} ({} likes)", post_id, likes);
        }
        Command::Comment { auth, post_id, content } => {
            let id = login(app, &auth)?;
            app.comment_on_post(post_id, id, &content)?;
            println!("Comment added to post {}", post_id);
        }
        Command::Show { post_id } => {
            let post = app
                .find_post(post_id)
                .with_context(|| format!("post {} not found", post_id))?;
            print_post(app, post);
            for comment in &post.comments {
                println!("      {}: {}", author_name(app, comment.author_id), comment.content);
            }
            return Ok(false);
        }
        Command::Follow { auth, target } => {
            let id = login(app, &auth)?;
            let target_id = resolve(app, &target)?;
            app.follow(id, target_id)?;
            println!("Now following {}", target);
        }
        Command::Unfollow { auth, target } => {
            let id = login(app, &auth)?;
            let target_id = resolve(app, &target)?;
            app.unfollow(id, target_id)?;
            println!("Unfollowed {}", target);
        }
        Command::Feed(auth) => {
            let id = login(app, &auth)?;
            let feed = app.feed_for(id)?;
            if feed.is_empty() {
                println!("Your feed is empty. Follow users to see their posts!");
            }
            for post in &feed {
                print_post(app, post);
            }
            return Ok(false);
        }
        Command::Notifications(auth) => {
            let id = login(app, &auth)?;
            let items = app.notifications_for(id);
            if items.is_empty() {
                println!("No notifications");
            }
            for n in items {
                let state = if n.is_read { "READ" } else { "UNREAD" };
                println!("[{}] {} - {} [{}]", n.kind.label(), n.message, n.created_at, state);
            }
            return Ok(false);
        }
        Command::Read(auth) => {
            let id = login(app, &auth)?;
            let n = app.read_next_notification(id)?;
            println!("[{}] {} - {}", n.kind.label(), n.message, n.created_at);
        }
    }
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "chatter=info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.data {
        config.data_file = path;
    }
    let path = config.data_file.clone();

    let mut app = load_snapshot(&path, config, Box::new(SystemClock))?;
    if run(&mut app, cli.command)? {
        save_snapshot(&app, &path)?;
    }
    Ok(())
}

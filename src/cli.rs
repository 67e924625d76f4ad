//! Command handlers for the CLI surface.
//!
//! Thin CRUD glue over [`storage::Database`]; the only command with real
//! machinery behind it is `poll`, which hands off to [`poller::Poller`].

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use url::Url;

use crate::config::Config;
use crate::poller::Poller;
use crate::storage::{Database, StorageError, User};

/// Shared state for all command handlers.
pub struct App {
    pub db: Database,
    pub config: Config,
    pub config_path: PathBuf,
}

impl App {
    // ========================================================================
    // User Commands
    // ========================================================================

    pub async fn register(&mut self, name: &str) -> Result<()> {
        match self.db.create_user(name, Utc::now().timestamp()).await {
            Ok(user) => {
                self.config
                    .set_user(&user.name, &self.config_path)
                    .context("unable to update the configuration")?;
                println!("Successfully registered {}.", user.name);
                Ok(())
            }
            Err(StorageError::Duplicate) => bail!("the user {:?} is already registered", name),
            Err(e) => Err(e).context("unable to register the user"),
        }
    }

    pub async fn login(&mut self, name: &str) -> Result<()> {
        let user = self
            .db
            .user_by_name(name)
            .await?
            .with_context(|| format!("no registered user named {:?}", name))?;

        self.config
            .set_user(&user.name, &self.config_path)
            .context("unable to update the configuration")?;
        println!("The current user is set to {:?}.", user.name);
        Ok(())
    }

    pub async fn users(&self) -> Result<()> {
        let users = self.db.all_users().await?;
        if users.is_empty() {
            println!("There are no registered users.");
            return Ok(());
        }

        println!("Registered users:\n");
        for user in users {
            if self.config.current_user.as_deref() == Some(user.name.as_str()) {
                println!("- {} (current)", user.name);
            } else {
                println!("- {}", user.name);
            }
        }
        Ok(())
    }

    pub async fn reset(&self) -> Result<()> {
        self.db
            .delete_all_users()
            .await
            .context("unable to delete the users")?;
        println!("Successfully removed all users.");
        Ok(())
    }

    // ========================================================================
    // Feed Commands
    // ========================================================================

    pub async fn add_feed(&self, name: &str, url: &str) -> Result<()> {
        validate_feed_url(url)?;
        let user = self.current_user().await?;
        let now = Utc::now().timestamp();

        let feed = match self.db.create_feed(name, url, user.id, now).await {
            Ok(feed) => feed,
            Err(StorageError::Duplicate) => bail!("a feed with this URL is already registered"),
            Err(e) => return Err(e).context("unable to add the feed"),
        };
        println!("Successfully added the feed {:?}.", feed.name);

        // The creator follows their own feed.
        self.db
            .create_follow(user.id, feed.id, now)
            .await
            .context("unable to create the follow record")?;
        println!("You are now following {:?}.", feed.name);
        Ok(())
    }

    pub async fn feeds(&self) -> Result<()> {
        let feeds = self.db.all_feeds().await?;
        if feeds.is_empty() {
            println!("There are no registered feeds.");
            return Ok(());
        }

        println!("Feeds:\n");
        for feed in feeds {
            println!(
                "- Name: {}\n  URL: {}\n  Created by: {}",
                feed.name, feed.url, feed.creator
            );
        }
        Ok(())
    }

    pub async fn follow(&self, url: &str) -> Result<()> {
        let user = self.current_user().await?;
        let feed = self
            .db
            .feed_by_url(url)
            .await?
            .with_context(|| format!("no registered feed with URL {:?}", url))?;

        match self
            .db
            .create_follow(user.id, feed.id, Utc::now().timestamp())
            .await
        {
            Ok(()) => {
                println!("You are now following {:?}.", feed.name);
                Ok(())
            }
            Err(StorageError::Duplicate) => bail!("you are already following this feed"),
            Err(e) => Err(e).context("unable to create the follow record"),
        }
    }

    pub async fn unfollow(&self, url: &str) -> Result<()> {
        let user = self.current_user().await?;
        let feed = self
            .db
            .feed_by_url(url)
            .await?
            .with_context(|| format!("no registered feed with URL {:?}", url))?;

        self.db
            .delete_follow(user.id, feed.id)
            .await
            .context("unable to delete the follow record")?;
        println!("You have unfollowed {:?}.", feed.name);
        Ok(())
    }

    pub async fn following(&self) -> Result<()> {
        let user = self.current_user().await?;
        let names = self.db.follows_for_user(user.id).await?;
        if names.is_empty() {
            println!("You are not following any feeds.");
            return Ok(());
        }

        println!("You are following:\n");
        for name in names {
            println!("- {}", name);
        }
        Ok(())
    }

    // ========================================================================
    // Post Commands
    // ========================================================================

    pub async fn browse(&self, limit: i64) -> Result<()> {
        let user = self.current_user().await?;
        let posts = self
            .db
            .posts_for_user(user.id, limit)
            .await
            .context("unable to get the posts")?;

        if posts.is_empty() {
            println!("No posts yet. Run `graze poll <interval>` to start crawling.");
            return Ok(());
        }

        println!("Posts:\n");
        for post in posts {
            println!(
                "- Title: {}\n  URL: {}\n  Published at: {}",
                post.title, post.url, post.published_at
            );
        }
        Ok(())
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Run the poll loop until Ctrl-C. Blocks forever in normal operation;
    /// per-cycle errors go to the log, not to the caller.
    pub async fn poll(&self, interval: &str) -> Result<()> {
        let poller = Poller::new(self.db.clone(), reqwest::Client::new(), interval)?;
        println!("Fetching feeds every {:?}.", poller.interval());

        let (stop_tx, stop_rx) = mpsc::channel(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = stop_tx.send(()).await;
            }
        });

        poller.run(stop_rx).await;
        Ok(())
    }

    /// Resolve the logged-in user for commands that need one.
    async fn current_user(&self) -> Result<User> {
        let name = self
            .config
            .current_user
            .as_deref()
            .context("no user is logged in; run `graze login <name>` first")?;
        self.db
            .user_by_name(name)
            .await?
            .with_context(|| format!("the configured user {:?} is not registered", name))
    }
}

/// Reject URLs that cannot be feed sources before touching storage.
fn validate_feed_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw).with_context(|| format!("invalid feed URL {:?}", raw))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("unsupported URL scheme {:?} (only http/https)", other),
    }
}

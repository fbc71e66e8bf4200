//! Built-in gator commands.

use std::io::Write;

use futures::future::BoxFuture;
use tracing::info;

use super::{middleware_logged_in, Command, Commands, Handler, State};
use crate::config::parse_duration;
use crate::db::{NewUser, User, UserRepository};
use crate::feed::{FeedFollowRepository, FeedRepository, NewFeed};
use crate::rss::{validate_url, PostRepository, ScrapeOutcome, Scraper};
use crate::{GatorError, Result};

/// Registry with every built-in command.
pub fn default_commands() -> Commands {
    let mut commands = Commands::new();
    commands.register("login", Handler::Plain(handler_login));
    commands.register("register", Handler::Plain(handler_register));
    commands.register("reset", Handler::Plain(handler_reset));
    commands.register("users", Handler::Plain(handler_users));
    commands.register("agg", Handler::Plain(handler_agg));
    commands.register("scrape", Handler::Plain(handler_scrape));
    commands.register("feeds", Handler::Plain(handler_feeds));
    commands.register("addfeed", middleware_logged_in(handler_add_feed));
    commands.register("follow", middleware_logged_in(handler_follow));
    commands.register("following", middleware_logged_in(handler_following));
    commands.register("unfollow", middleware_logged_in(handler_unfollow));
    commands.register("browse", middleware_logged_in(handler_browse));
    commands
}

fn handler_login(state: &mut State, cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let name = cmd.arg(0, "login <name>")?;

        let user = UserRepository::new(state.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("user {name}")))?;

        state.settings.set_user(&user.name)?;
        info!(user = %user.name, "logged in");
        writeln!(state.out(), "User set to {}", user.name)?;
        Ok(())
    })
}

fn handler_register(state: &mut State, cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let name = cmd.arg(0, "register <name>")?;

        let user = match UserRepository::new(state.db.pool())
            .create(&NewUser::new(name))
            .await
        {
            Ok(user) => user,
            Err(GatorError::Duplicate(_)) => {
                return Err(GatorError::Duplicate(format!("user {name} already exists")));
            }
            Err(e) => return Err(e),
        };

        state.settings.set_user(&user.name)?;
        info!(user = %user.name, id = %user.id, "user registered");
        writeln!(state.out(), "User created: {}", user.name)?;
        writeln!(state.out(), "  ID: {}", user.id)?;
        Ok(())
    })
}

fn handler_reset(state: &mut State, _cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        state.db.reset().await?;
        writeln!(state.out(), "Database reset")?;
        Ok(())
    })
}

fn handler_users(state: &mut State, _cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let names = UserRepository::new(state.db.pool()).list_names().await?;
        let current = state.settings.current_user_name.clone();

        for name in names {
            if current.as_deref() == Some(name.as_str()) {
                writeln!(state.out(), "* {name} (current)")?;
            } else {
                writeln!(state.out(), "* {name}")?;
            }
        }
        Ok(())
    })
}

fn handler_agg(state: &mut State, cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let mut scraper = Scraper::new(state.db.clone(), &state.config.scraper)?;
        if let Some(raw) = cmd.opt_arg(0) {
            scraper = scraper.with_interval(parse_duration(raw)?);
        }

        writeln!(
            state.out(),
            "Collecting feeds every {:?} (Ctrl-C to stop)",
            scraper.interval()
        )?;

        let handle = scraper.spawn();
        let signal = tokio::signal::ctrl_c().await;
        handle.stop().await?;
        signal?;

        writeln!(state.out(), "Stopped collecting feeds")?;
        Ok(())
    })
}

fn handler_scrape(state: &mut State, _cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let scraper = Scraper::new(state.db.clone(), &state.config.scraper)?;

        match scraper.scrape_once().await? {
            ScrapeOutcome::Idle => writeln!(state.out(), "No feeds to scrape")?,
            ScrapeOutcome::Ingested { feed, report } => writeln!(
                state.out(),
                "Scraped {}: {} new, {} already stored, {} failed",
                feed.name,
                report.inserted,
                report.duplicates,
                report.failed
            )?,
        }
        Ok(())
    })
}

fn handler_feeds(state: &mut State, _cmd: Command) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let feeds = FeedRepository::new(state.db.pool())
            .list_with_creator()
            .await?;

        if feeds.is_empty() {
            writeln!(state.out(), "No feeds registered")?;
            return Ok(());
        }

        for entry in feeds {
            let out = state.out();
            writeln!(out, "* {}", entry.feed.name)?;
            writeln!(out, "  URL: {}", entry.feed.url)?;
            writeln!(out, "  Created by: {}", entry.user_name)?;
        }
        Ok(())
    })
}

fn handler_add_feed(state: &mut State, cmd: Command, user: User) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let usage = "addfeed <name> <url>";
        let name = cmd.arg(0, usage)?;
        let url = cmd.arg(1, usage)?;
        validate_url(url)?;

        let pool = state.db.pool();
        let feed = match FeedRepository::new(pool)
            .create(&NewFeed::new(name, url, user.id))
            .await
        {
            Ok(feed) => feed,
            Err(GatorError::Duplicate(_)) => {
                return Err(GatorError::Duplicate(format!("feed {url} already exists")));
            }
            Err(e) => return Err(e),
        };
        FeedFollowRepository::new(pool)
            .create(user.id, feed.id)
            .await?;

        info!(feed = %feed.name, url = %feed.url, user = %user.name, "feed added");
        let out = state.out();
        writeln!(out, "Feed added: {}", feed.name)?;
        writeln!(out, "  ID: {}", feed.id)?;
        writeln!(out, "  URL: {}", feed.url)?;
        writeln!(out, "  Followed by: {}", user.name)?;
        Ok(())
    })
}

fn handler_follow(state: &mut State, cmd: Command, user: User) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let url = cmd.arg(0, "follow <url>")?;
        let pool = state.db.pool();

        let feed = FeedRepository::new(pool)
            .get_by_url(url)
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("feed {url}")))?;

        let details = match FeedFollowRepository::new(pool).create(user.id, feed.id).await {
            Ok(details) => details,
            Err(GatorError::Duplicate(_)) => {
                return Err(GatorError::Duplicate(format!(
                    "{} already follows {}",
                    user.name, feed.name
                )));
            }
            Err(e) => return Err(e),
        };

        writeln!(
            state.out(),
            "{} now follows {}",
            details.user_name,
            details.feed_name
        )?;
        Ok(())
    })
}

fn handler_following(state: &mut State, _cmd: Command, user: User) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let names = FeedFollowRepository::new(state.db.pool())
            .list_feed_names_for_user(user.id)
            .await?;

        if names.is_empty() {
            writeln!(state.out(), "{} is not following any feeds", user.name)?;
            return Ok(());
        }

        for name in names {
            writeln!(state.out(), "* {name}")?;
        }
        Ok(())
    })
}

fn handler_unfollow(state: &mut State, cmd: Command, user: User) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let url = cmd.arg(0, "unfollow <url>")?;
        let pool = state.db.pool();

        let feed = FeedRepository::new(pool)
            .get_by_url(url)
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("feed {url}")))?;

        if !FeedFollowRepository::new(pool)
            .delete(user.id, feed.id)
            .await?
        {
            return Err(GatorError::NotFound(format!(
                "follow of {} by {}",
                feed.name, user.name
            )));
        }

        writeln!(state.out(), "{} unfollowed {}", user.name, feed.name)?;
        Ok(())
    })
}

/// Characters of a description shown by `browse`.
const PREVIEW_CHARS: usize = 100;

fn preview(description: &str) -> String {
    match description.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &description[..cut]),
        None => description.to_string(),
    }
}

/// Parse the optional `browse` limit.
fn parse_limit(raw: Option<&str>, default: i64) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(GatorError::Validation(format!(
            "limit must be a positive integer, got {raw:?}"
        ))),
    }
}

fn handler_browse(state: &mut State, cmd: Command, user: User) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let limit = parse_limit(cmd.opt_arg(0), state.config.browse.default_limit)?;

        let posts = PostRepository::new(state.db.pool())
            .list_for_user(user.id, limit)
            .await?;

        if posts.is_empty() {
            writeln!(state.out(), "No posts yet")?;
            return Ok(());
        }

        let out = state.out();
        for entry in posts {
            let post = entry.post;
            let published = post
                .published_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown date".to_string());

            writeln!(
                out,
                "{} from {}",
                post.title.as_deref().unwrap_or("(untitled)"),
                entry.feed_name
            )?;
            writeln!(out, "  Published: {published}")?;
            writeln!(out, "  Link: {}", post.url)?;
            if let Some(description) = &post.description {
                writeln!(out, "  {}", preview(description))?;
            }
            writeln!(out)?;
        }
        Ok(())
    })
}

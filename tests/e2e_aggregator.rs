//! End-to-end tests driving gator through its command registry.

mod common;

use common::{mount_feed, three_item_feed, TestApp, TWO_ITEM_FEED};
use gator::{FeedRepository, GatorError, PostRepository, Settings};
use wiremock::MockServer;

#[tokio::test]
async fn test_register_addfeed_scrape_browse() {
    let server = MockServer::start().await;
    let url = mount_feed(&server, "/feed.xml", TWO_ITEM_FEED).await;
    let mut app = TestApp::new().await;

    app.run("register", &["alice"]).await.unwrap();
    let saved = Settings::read_from(app.state.settings.path()).unwrap();
    assert_eq!(saved.current_user_name.as_deref(), Some("alice"));

    app.run("addfeed", &["Example", url.as_str()]).await.unwrap();

    // Adding a feed follows it
    let following = app.run("following", &[]).await.unwrap();
    assert_eq!(following, "* Example\n");

    let scraped = app.run("scrape", &[]).await.unwrap();
    assert_eq!(scraped, "Scraped Example: 2 new, 0 already stored, 0 failed\n");

    let feed = FeedRepository::new(app.db().pool())
        .get_by_url(&url)
        .await
        .unwrap()
        .unwrap();
    let count = PostRepository::new(app.db().pool())
        .count_by_feed(feed.id)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let browsed = app.run("browse", &[]).await.unwrap();
    let second = browsed.find("Second from Example").unwrap();
    let first = browsed.find("First from Example").unwrap();
    assert!(second < first, "newest post should come first:\n{browsed}");
    assert!(browsed.contains("Published: 2024-10-21 08:00"));
    assert!(browsed.contains("Link: https://example.com/posts/2"));
    assert!(browsed.contains("The second post"));
}

#[tokio::test]
async fn test_browse_respects_limit() {
    let server = MockServer::start().await;
    let url = mount_feed(&server, "/feed.xml", TWO_ITEM_FEED).await;
    let mut app = TestApp::new().await;

    app.run("register", &["alice"]).await.unwrap();
    app.run("addfeed", &["Example", url.as_str()]).await.unwrap();
    app.run("scrape", &[]).await.unwrap();

    let browsed = app.run("browse", &["1"]).await.unwrap();
    assert!(browsed.contains("Second from Example"));
    assert!(!browsed.contains("First from Example"));
}

#[tokio::test]
async fn test_browse_defaults_to_two_newest_posts() {
    let server = MockServer::start().await;
    let url = mount_feed(&server, "/feed.xml", &three_item_feed()).await;
    let mut app = TestApp::new().await;

    app.run("register", &["alice"]).await.unwrap();
    app.run("addfeed", &["Example", url.as_str()]).await.unwrap();
    app.run("scrape", &[]).await.unwrap();

    let browsed = app.run("browse", &[]).await.unwrap();
    assert_eq!(browsed.matches(" from Example\n").count(), 2);
    assert!(browsed.contains("Third from Example"));
    assert!(browsed.contains("Second from Example"));
    assert!(!browsed.contains("First from Example"));

    // Long descriptions are cut to a preview
    let preview = format!("  {}...\n", "x".repeat(100));
    assert!(browsed.contains(&preview), "{browsed}");
    assert!(!browsed.contains(&"x".repeat(101)));
}

#[tokio::test]
async fn test_browse_only_shows_followed_feeds() {
    let server = MockServer::start().await;
    let url = mount_feed(&server, "/feed.xml", TWO_ITEM_FEED).await;
    let mut app = TestApp::new().await;

    app.run("register", &["alice"]).await.unwrap();
    app.run("addfeed", &["Example", url.as_str()]).await.unwrap();
    app.run("scrape", &[]).await.unwrap();

    app.run("register", &["bob"]).await.unwrap();
    assert_eq!(app.run("browse", &[]).await.unwrap(), "No posts yet\n");

    app.run("follow", &[url.as_str()]).await.unwrap();
    let browsed = app.run("browse", &[]).await.unwrap();
    assert!(browsed.contains("Second from Example"));
}

#[tokio::test]
async fn test_rescrape_is_idempotent() {
    let server = MockServer::start().await;
    let url = mount_feed(&server, "/feed.xml", TWO_ITEM_FEED).await;
    let mut app = TestApp::new().await;

    app.run("register", &["alice"]).await.unwrap();
    app.run("addfeed", &["Example", url.as_str()]).await.unwrap();

    app.run("scrape", &[]).await.unwrap();
    let second = app.run("scrape", &[]).await.unwrap();
    assert_eq!(second, "Scraped Example: 0 new, 2 already stored, 0 failed\n");

    let total = PostRepository::new(app.db().pool()).count().await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_user_commands_require_login() {
    let mut app = TestApp::new().await;

    for (name, args) in [
        ("addfeed", vec!["Example", "https://example.com/feed"]),
        ("follow", vec!["https://example.com/feed"]),
        ("following", vec![]),
        ("unfollow", vec!["https://example.com/feed"]),
        ("browse", vec![]),
    ] {
        let result = app.run(name, &args).await;
        assert!(
            matches!(result, Err(GatorError::NotLoggedIn)),
            "{name} should require login"
        );
    }
}

#[tokio::test]
async fn test_unknown_command() {
    let mut app = TestApp::new().await;
    let result = app.run("frobnicate", &[]).await;
    assert!(matches!(result, Err(GatorError::UnknownCommand(_))));
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let server = MockServer::start().await;
    let url = mount_feed(&server, "/feed.xml", TWO_ITEM_FEED).await;
    let mut app = TestApp::new().await;

    app.run("register", &["alice"]).await.unwrap();
    app.run("addfeed", &["Example", url.as_str()]).await.unwrap();
    app.run("scrape", &[]).await.unwrap();

    app.run("reset", &[]).await.unwrap();

    assert_eq!(app.run("users", &[]).await.unwrap(), "");
    assert_eq!(app.run("feeds", &[]).await.unwrap(), "No feeds registered\n");
    let total = PostRepository::new(app.db().pool()).count().await.unwrap();
    assert_eq!(total, 0);
}

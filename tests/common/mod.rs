//! Test helpers for gator integration tests.
//!
//! Provides an in-memory application harness and feed fixtures served
//! through wiremock.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gator::{default_commands, Command, Commands, Config, Database, Settings, State};

/// Default timeout for waiting on background work.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// RSS document with two dated items, "Second" being the newer.
pub const TWO_ITEM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com/</link>
    <description>Example feed</description>
    <item>
      <title>First</title>
      <link>https://example.com/posts/1</link>
      <description>The first post</description>
      <pubDate>Mon, 21 Oct 2024 07:28:00 GMT</pubDate>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/posts/2</link>
      <description>The second post</description>
      <pubDate>Mon, 21 Oct 2024 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

/// RSS document with three dated items. "Third" is the newest and carries
/// a 150 character description.
pub fn three_item_feed() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com/</link>
    <description>Example feed</description>
    <item>
      <title>First</title>
      <link>https://example.com/posts/1</link>
      <pubDate>Mon, 21 Oct 2024 07:28:00 GMT</pubDate>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/posts/2</link>
      <pubDate>Mon, 21 Oct 2024 08:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Third</title>
      <link>https://example.com/posts/3</link>
      <description>{}</description>
      <pubDate>Mon, 21 Oct 2024 09:15:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#,
        "x".repeat(150)
    )
}

/// Serve `body` as an RSS document at `route` and return its full URL.
pub async fn mount_feed(server: &MockServer, route: &str, body: &str) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(body),
        )
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

/// Answer every request at `route` with `status` and return its full URL.
pub async fn mount_status(server: &MockServer, route: &str, status: u16) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

/// Command output captured in memory.
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// Drain everything written so far.
    pub fn take(&self) -> String {
        let mut buf = self.0.lock().unwrap();
        String::from_utf8(std::mem::take(&mut *buf)).unwrap()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Application wired to an in-memory database and a temporary settings file.
pub struct TestApp {
    pub dir: TempDir,
    pub state: State,
    pub commands: Commands,
    output: CapturedOutput,
}

impl TestApp {
    /// Create an app with default configuration.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Create an app with the given configuration.
    pub async fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join(".gatorconfig.json");
        let settings = Settings::new("sqlite::memory:", &settings_path);
        settings.write().unwrap();

        let db = Database::open_in_memory().await.unwrap();
        let output = CapturedOutput::default();
        let state = State::new(settings, db, config).with_output(output.clone());

        Self {
            dir,
            state,
            commands: default_commands(),
            output,
        }
    }

    /// Run a command and return what it printed.
    pub async fn run(&mut self, name: &str, args: &[&str]) -> gator::Result<String> {
        let cmd = Command::new(name, args.iter().map(|a| a.to_string()).collect());
        self.commands.run(&mut self.state, cmd).await?;
        Ok(self.output.take())
    }

    /// Database handle.
    pub fn db(&self) -> &Database {
        &self.state.db
    }
}

/// Poll `check` until it returns true or `DEFAULT_TIMEOUT` elapses.
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + DEFAULT_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

//! Feed registry for gator.
//!
//! Registered feeds and the follow relation between users and feeds.

pub mod repository;
pub mod types;

pub use repository::{FeedFollowRepository, FeedRepository};
pub use types::{Feed, FeedFollow, FeedFollowDetails, FeedWithCreator, NewFeed};

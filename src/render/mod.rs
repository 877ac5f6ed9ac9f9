//! Turns a [`Post`] into what the display shows.
//!
//! Everything here is derived at render time and never persisted: image URLs,
//! cleaned body text, hashtags and the relative timestamp.

mod markup;
mod time;

use chrono::{DateTime, Utc};

use crate::feed::Post;
use crate::util::strip_control_chars;

pub use markup::{clean_text, decode_entities, extract_hashtags, extract_images, remove_hashtags};
pub use time::format_relative_time;

/// Display fragment for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub title: String,
    /// Cleaned text with hashtag runs removed.
    pub body: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub time_label: String,
    pub published_at: Option<DateTime<Utc>>,
    pub link: String,
}

impl PostView {
    /// Nothing to show besides metadata.
    pub fn is_blank(&self) -> bool {
        self.body.is_empty() && self.title.trim().is_empty()
    }
}

/// Render `post` as seen at `now`.
///
/// The body comes from the description; posts with an empty description fall
/// back to their title so title-only entries still show text.
pub fn render_post(post: &Post, now: DateTime<Utc>) -> PostView {
    let title = strip_control_chars(&decode_entities(&post.title)).into_owned();

    let mut text = strip_control_chars(&clean_text(&post.description)).into_owned();
    if text.is_empty() {
        text = title.trim().to_string();
    }

    PostView {
        body: remove_hashtags(&text),
        tags: extract_hashtags(&text),
        images: extract_images(&post.description),
        time_label: format_relative_time(post.published_at, now),
        published_at: post.published_at,
        link: post.link.clone(),
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn renders_full_post() {
        let post = Post {
            title: "Morning".to_string(),
            description: r#"<p>Hello #life and #growth</p><img src="https://img/a.jpg">"#
                .to_string(),
            published_at: Some(now() - Duration::minutes(5)),
            link: "https://m.okjike.com/originalPosts/1".to_string(),
        };

        let view = render_post(&post, now());
        assert_eq!(view.title, "Morning");
        assert_eq!(view.body, "Hello  and");
        assert_eq!(view.tags, vec!["life", "growth"]);
        assert_eq!(view.images, vec!["https://img/a.jpg"]);
        assert_eq!(view.time_label, "5 minutes ago");
        assert_eq!(view.link, "https://m.okjike.com/originalPosts/1");
    }

    #[test]
    fn empty_description_falls_back_to_title() {
        let post = Post {
            title: "Just a title #金句".to_string(),
            description: String::new(),
            published_at: None,
            link: String::new(),
        };

        let view = render_post(&post, now());
        assert_eq!(view.body, "Just a title");
        assert_eq!(view.tags, vec!["金句"]);
        assert_eq!(view.time_label, "");
        assert!(!view.is_blank());
    }

    #[test]
    fn control_sequences_never_reach_the_terminal() {
        let post = Post {
            title: "t\x1b[2Jitle".to_string(),
            description: "<p>bo\x1b]0;pwned\x07dy</p>".to_string(),
            published_at: None,
            link: String::new(),
        };

        let view = render_post(&post, now());
        assert_eq!(view.title, "title");
        assert_eq!(view.body, "body");
    }

    #[test]
    fn image_only_post_is_blank() {
        let post = Post {
            title: String::new(),
            description: r#"<img src="https://img/only.jpg">"#.to_string(),
            published_at: None,
            link: String::new(),
        };

        let view = render_post(&post, now());
        assert!(view.is_blank());
        assert_eq!(view.images.len(), 1);
    }
}

use feed_rs::parser;
use thiserror::Error;

use super::post::Post;

/// The feed document could not be parsed as RSS, Atom or JSON Feed.
#[derive(Debug, Error)]
#[error("Malformed feed: {0}")]
pub struct ParseError(String);

/// Parse raw feed bytes into posts, preserving the order entries appear in.
///
/// Structural errors fail the whole document; entries are never skipped.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Post>, ParseError> {
    let feed = parser::parse(bytes).map_err(|e| ParseError(e.to_string()))?;

    let posts = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let published_at = entry.published.or(entry.updated);
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            let title = entry.title.map(|t| t.content).unwrap_or_default();

            Post {
                title,
                description,
                published_at,
                link,
            }
        })
        .collect();

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rss_with_items(items: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
<title>Someone on Jike</title>
<link>https://web.okjike.com/u/someone</link>
<description>posts</description>
{}
</channel></rss>"#,
            items.join("\n")
        )
    }

    fn item(n: usize) -> String {
        format!(
            "<item><title>Post {n}</title><description><![CDATA[<p>Body {n} #tag{n}</p>]]></description>\
             <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate><link>https://example.com/{n}</link>\
             <guid>https://example.com/{n}</guid></item>"
        )
    }

    #[test]
    fn parses_rss_fields() {
        let xml = rss_with_items(&[item(1)]);
        let posts = parse_feed(xml.as_bytes()).unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Post 1");
        assert!(posts[0].description.contains("<p>Body 1 #tag1</p>"));
        assert_eq!(posts[0].link, "https://example.com/1");
        assert_eq!(
            posts[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let xml = rss_with_items(&["<item></item>".to_string()]);
        let posts = parse_feed(xml.as_bytes()).unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "");
        assert_eq!(posts[0].description, "");
        assert_eq!(posts[0].link, "");
        assert_eq!(posts[0].published_at, None);
    }

    #[test]
    fn parses_atom_entries() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom</title>
  <id>urn:feed</id>
  <updated>2024-02-01T10:00:00Z</updated>
  <entry>
    <title>Only entry</title>
    <id>urn:entry:1</id>
    <link href="https://example.com/atom/1"/>
    <updated>2024-02-01T10:00:00Z</updated>
    <summary>short</summary>
  </entry>
</feed>"#;
        let posts = parse_feed(atom.as_bytes()).unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].link, "https://example.com/atom/1");
        assert_eq!(posts[0].description, "short");
        assert_eq!(
            posts[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(parse_feed(b"<not valid xml").is_err());
        assert!(parse_feed(b"plain text, not a feed").is_err());
    }

    #[test]
    fn empty_channel_yields_no_posts() {
        let xml = rss_with_items(&[]);
        assert!(parse_feed(xml.as_bytes()).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn n_entries_yield_n_posts_in_order(n in 0usize..25) {
            let items: Vec<String> = (0..n).map(item).collect();
            let xml = rss_with_items(&items);
            let posts = parse_feed(xml.as_bytes()).unwrap();

            prop_assert_eq!(posts.len(), n);
            for (i, post) in posts.iter().enumerate() {
                prop_assert_eq!(&post.title, &format!("Post {i}"));
            }
        }
    }
}

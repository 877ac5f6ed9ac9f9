//! Classifies rendered posts into quote categories by their hashtags.
//!
//! Categories come from a tag→category map; posts without a mapped tag land
//! in the default category. An optional tag allow-list restricts which posts
//! are shown at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::feed::Post;
use crate::render::{render_post, PostView};

/// A rendered post together with its category key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub view: PostView,
    pub category: String,
}

/// Which quotes are listed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(key) => quote.category == *key,
        }
    }
}

/// Display name for a category key.
pub fn category_label(key: &str) -> &str {
    match key {
        "growth" => "成长思考",
        "life" => "生活哲思",
        _ => "摘录",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    only_tags: Vec<String>,
    default_category: String,
    tag_categories: BTreeMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new(), "life".to_string(), default_tag_categories())
    }
}

/// Tag mapping used when the config does not provide one.
pub fn default_tag_categories() -> BTreeMap<String, String> {
    [("成长思考", "growth"), ("生活哲思", "life"), ("金句", "growth")]
        .into_iter()
        .map(|(tag, cat)| (tag.to_string(), cat.to_string()))
        .collect()
}

impl Catalog {
    pub fn new(
        only_tags: Vec<String>,
        default_category: String,
        tag_categories: BTreeMap<String, String>,
    ) -> Self {
        Self {
            only_tags,
            default_category,
            tag_categories,
        }
    }

    /// Category of the first tag with a mapping, else the default category.
    pub fn classify(&self, tags: &[String]) -> String {
        tags.iter()
            .find_map(|tag| self.tag_categories.get(tag))
            .unwrap_or(&self.default_category)
            .clone()
    }

    /// Whether a rendered post should be listed.
    ///
    /// Posts with nothing to show are dropped; with an allow-list configured
    /// only posts carrying one of its tags are kept.
    pub fn admit(&self, view: &PostView) -> bool {
        if view.is_blank() && view.images.is_empty() {
            return false;
        }
        self.only_tags.is_empty() || view.tags.iter().any(|t| self.only_tags.contains(t))
    }

    /// Render, filter and classify `posts`, keeping feed order.
    pub fn build(&self, posts: &[Post], now: DateTime<Utc>) -> Vec<Quote> {
        posts
            .iter()
            .map(|post| render_post(post, now))
            .filter(|view| self.admit(view))
            .map(|view| {
                let category = self.classify(&view.tags);
                Quote { view, category }
            })
            .collect()
    }

    /// Filters in cycling order: all, then each known category once.
    pub fn filters(&self) -> Vec<CategoryFilter> {
        let mut keys: Vec<&String> = self.tag_categories.values().collect();
        keys.push(&self.default_category);
        keys.sort();
        keys.dedup();

        std::iter::once(CategoryFilter::All)
            .chain(keys.into_iter().map(|k| CategoryFilter::Category(k.clone())))
            .collect()
    }

    /// The filter after `current` in [`Catalog::filters`] order, wrapping.
    pub fn next_filter(&self, current: &CategoryFilter) -> CategoryFilter {
        let filters = self.filters();
        let pos = filters.iter().position(|f| f == current).unwrap_or(0);
        filters[(pos + 1) % filters.len()].clone()
    }
}

/// Uniformly pick one quote; `None` when there are none.
pub fn pick_random<'a, R: Rng + ?Sized>(quotes: &'a [Quote], rng: &mut R) -> Option<&'a Quote> {
    quotes.choose(rng)
}

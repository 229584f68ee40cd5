//! Splitting long translations into reply threads
//!
//! A translation that fits a single post is published as `text permalink`.
//! Longer text becomes a thread: the root post carries the start of the text
//! and the permalink, every following post starts with the reply prefix and
//! answers the post before it.
//!
//! Lengths are counted in characters (Unicode scalar values), not bytes, so
//! CJK text gets the same budget as ASCII.

use crate::config::ThreadSettings;
use crate::error::{RelayError, RelayResult};

/// Character budget of a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLimits {
    max_post_length: usize,
    reserved_link_length: usize,
    extra_margin: usize,
    reply_prefix: String,
}

impl ThreadLimits {
    /// Fails when the limits leave no room for text in the root post or in
    /// a continuation post.
    pub fn new(
        max_post_length: usize,
        reserved_link_length: usize,
        extra_margin: usize,
        reply_prefix: impl Into<String>,
    ) -> RelayResult<Self> {
        let limits = Self {
            max_post_length,
            reserved_link_length,
            extra_margin,
            reply_prefix: reply_prefix.into(),
        };
        if limits.root_budget() < 1 {
            return Err(RelayError::Chunking(format!(
                "no room for text in the first post: max {} - link {} - margin {}",
                max_post_length, reserved_link_length, extra_margin
            )));
        }
        if limits.continuation_budget() < 2 {
            return Err(RelayError::Chunking(format!(
                "reply prefix '{}' leaves no room in a {} character post",
                limits.reply_prefix, max_post_length
            )));
        }
        Ok(limits)
    }

    pub fn from_settings(
        settings: &ThreadSettings,
        reply_prefix: impl Into<String>,
    ) -> RelayResult<Self> {
        Self::new(
            settings.max_post_length,
            settings.reserved_link_length,
            settings.extra_margin,
            reply_prefix,
        )
    }

    /// Text shorter than this fits a single post next to the permalink
    fn single_budget(&self) -> usize {
        self.max_post_length.saturating_sub(self.reserved_link_length)
    }

    fn root_budget(&self) -> usize {
        self.single_budget().saturating_sub(self.extra_margin)
    }

    fn continuation_budget(&self) -> usize {
        self.max_post_length.saturating_sub(self.reply_prefix.chars().count())
    }

    pub fn reply_prefix(&self) -> &str {
        &self.reply_prefix
    }
}

/// One publishable post of a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub body: String,
    /// Index of the fragment this one answers; `None` for the thread root
    pub reply_to: Option<usize>,
    pub is_last: bool,
}

impl Fragment {
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}

/// Split `text` into an ordered reply chain
///
/// Fragments must be published in order: each reply needs the id returned
/// for the fragment it points at.
pub fn chunk(text: &str, permalink: &str, limits: &ThreadLimits) -> Vec<Fragment> {
    let chars: Vec<char> = text.chars().collect();

    if chars.len() < limits.single_budget() {
        return vec![Fragment {
            body: format!("{} {}", text, permalink),
            reply_to: None,
            is_last: true,
        }];
    }

    let first = limits.root_budget();
    let mut rest = &chars[first..];
    let mut fragments = vec![Fragment {
        body: format!("{} {}", collect(&chars[..first]), permalink),
        reply_to: None,
        is_last: rest.is_empty(),
    }];

    let budget = limits.continuation_budget();
    let step = budget - 1;
    while !rest.is_empty() {
        let previous = fragments.len() - 1;
        if rest.len() < budget {
            fragments.push(Fragment {
                body: format!("{}{}", limits.reply_prefix, collect(rest)),
                reply_to: Some(previous),
                is_last: true,
            });
            break;
        }
        fragments.push(Fragment {
            body: format!("{}{}", limits.reply_prefix, collect(&rest[..step])),
            reply_to: Some(previous),
            is_last: false,
        });
        rest = &rest[step..];
    }
    fragments
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

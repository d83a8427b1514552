//! # classify
//!
//! Decides whether a chat line was relayed by a bridge bot and, if so, who
//! really wrote it.
//!
//! [`Classifier::classify`] is pure: the sender is first checked against the
//! [`BotMatcher`], then the zero-width-cleaned text is run through the
//! [`FormatRule`] table in priority order and the first hit wins.

pub mod config;
mod error;
mod matcher;
pub mod rules;
pub mod text;

pub use config::{ClassifierConfig, MatcherEntry, RankOptions, RuleToggles, ShoutboxOptions};
pub use error::ClassifierError;
pub use matcher::BotMatcher;
pub use rules::FormatRule;

use rules::{BracketNickRule, ChatboxPrefixRule, DiscordRelayRule, SbPrefixRule, ShoutboxRelayRule};
use text::strip_zero_width;

/// The input a rule sees. `text` is already free of zero-width characters;
/// `html` is the content's markup as the host rendered it, untouched. Rules
/// match on `text`: prefixes are always stripped in text characters.
#[derive(Clone, Copy, Debug)]
pub struct Message<'a> {
    pub text: &'a str,
    pub html: &'a str,
    pub sender: &'a str,
    pub channel: &'a str,
}

/// Rewrite directive for a bridged message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub display_name: String,
    /// Literal prefix to remove from the content, in cleaned characters.
    /// `None` means the content is left alone.
    pub strip_prefix: Option<String>,
    /// Free-form metadata for styling.
    pub tag: String,
}

impl Classification {
    pub fn strips_content(&self) -> bool {
        self.strip_prefix.as_deref().is_some_and(|p| !p.is_empty())
    }
}

pub struct Classifier {
    matcher: BotMatcher,
    rules: Vec<Box<dyn FormatRule>>,
}

impl Classifier {
    pub fn new(matcher: BotMatcher, rules: Vec<Box<dyn FormatRule>>) -> Self {
        Self { matcher, rules }
    }

    /// Build the standard rule table, honoring the per-rule toggles.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let matcher = BotMatcher::new(&config.matchers)?;
        let toggles = config.rules;
        let mut rules: Vec<Box<dyn FormatRule>> = Vec::new();
        if toggles.sb_prefix {
            rules.push(Box::new(SbPrefixRule {
                tag: config.metadata.clone(),
            }));
        }
        if toggles.chatbox_prefix {
            rules.push(Box::new(ChatboxPrefixRule {
                tag: config.metadata.clone(),
            }));
        }
        if toggles.discord_relay {
            rules.push(Box::new(DiscordRelayRule { rank: config.rank }));
        }
        if toggles.shoutbox_relay {
            rules.push(Box::new(ShoutboxRelayRule {
                options: config.shoutbox.clone(),
                tag: config.metadata.clone(),
            }));
        }
        if toggles.bracket_nick {
            rules.push(Box::new(BracketNickRule {
                tag: config.metadata.clone(),
            }));
        }
        Ok(Self::new(matcher, rules))
    }

    pub fn is_bot(&self, sender: &str) -> bool {
        self.matcher.matches(sender)
    }

    /// Classify a line whose markup is not at hand; rules see `text` as
    /// its markup too.
    pub fn classify(&self, text: &str, sender: &str, channel: &str) -> Option<Classification> {
        self.classify_with_markup(text, text, sender, channel)
    }

    pub fn classify_with_markup(
        &self,
        text: &str,
        html: &str,
        sender: &str,
        channel: &str,
    ) -> Option<Classification> {
        if sender.is_empty() || !self.matcher.matches(sender) {
            return None;
        }
        let cleaned = strip_zero_width(text);
        let msg = Message {
            text: &cleaned,
            html,
            sender,
            channel,
        };
        self.rules.iter().find_map(|rule| {
            let hit = rule.apply(&msg)?;
            log::trace!(target: "classify", "{} matched line from {sender:?}", rule.name());
            Some(hit)
        })
    }
}

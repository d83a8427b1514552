//! Relay format rules.
//!
//! Each rule inspects one message and either claims it or passes. Rules hold
//! only immutable configuration, so the order they are tried in is the only
//! thing that decides which one wins.
//!
//! Conventions for prefix-style rules: the pattern is anchored at the start
//! and the *last* capture group marks where stripping stops. The literal
//! prefix to strip is whatever precedes that group in the full match. Rules
//! that find the body some other way can use
//! [`prefix_before_message`](crate::text::prefix_before_message).

use crate::config::{RankOptions, ShoutboxOptions};
use crate::text::prefix_before_body;
use crate::{Classification, Message};
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub trait FormatRule {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn apply(&self, msg: &Message<'_>) -> Option<Classification>;
}

static SB_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[SB\]\s+([^:]+):\s*(.*)$").expect("valid SB pattern"));
static CHATBOX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[Chatbox\]\s+([^:]+)").expect("valid Chatbox pattern"));
static DISCORD_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^»([^«]+)«\s*(.*)$").expect("valid quoted relay pattern"));
static DISCORD_SPACED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^»(\S+(?:\s+\([^)]+\))?)\s+(.*)$").expect("valid spaced relay pattern")
});
static TRAILING_RANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\s+\(([^)]+)\)$").expect("valid rank pattern"));
static BRACKET_NICK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]+)\](?::\s*|\s+)(.*)$").expect("valid bracket pattern")
});

/// Prefix to strip for a prefix-style match: full match minus the last group.
pub fn matched_prefix(caps: &Captures<'_>) -> String {
    let full = caps.get(0).map_or("", |m| m.as_str());
    let body = caps.get(caps.len() - 1).map_or("", |m| m.as_str());
    prefix_before_body(full, body).to_string()
}

fn prefix_rewrite(caps: &Captures<'_>, tag: &str) -> Classification {
    Classification {
        display_name: caps[1].to_string(),
        strip_prefix: Some(matched_prefix(caps)),
        tag: tag.to_string(),
    }
}

/// `[SB] Nickname: message`
pub struct SbPrefixRule {
    pub tag: String,
}

impl FormatRule for SbPrefixRule {
    fn name(&self) -> &'static str {
        "sb-prefix"
    }

    fn apply(&self, msg: &Message<'_>) -> Option<Classification> {
        let caps = SB_PREFIX.captures(msg.text)?;
        Some(prefix_rewrite(&caps, &self.tag))
    }
}

/// `[Chatbox] Nickname: message`. The nick is everything up to the first
/// colon, or the whole line when there is none; only the `[Chatbox] ` tag is
/// stripped.
pub struct ChatboxPrefixRule {
    pub tag: String,
}

impl FormatRule for ChatboxPrefixRule {
    fn name(&self) -> &'static str {
        "chatbox-prefix"
    }

    fn apply(&self, msg: &Message<'_>) -> Option<Classification> {
        let caps = CHATBOX_PREFIX.captures(msg.text)?;
        Some(prefix_rewrite(&caps, &self.tag))
    }
}

/// `»Nickname« message`, `»Nickname (Rank)« message` or `»Nickname message`.
pub struct DiscordRelayRule {
    pub rank: RankOptions,
}

impl DiscordRelayRule {
    fn split_rank<'a>(&self, raw: &'a str) -> (&'a str, String) {
        if !self.rank.remove_rank || !raw.ends_with(')') {
            return (raw.trim(), String::new());
        }
        let Some(caps) = TRAILING_RANK.captures(raw) else {
            return (raw.trim(), String::new());
        };
        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        let rank = &caps[2];
        let tag = if self.rank.abbreviate_rank {
            abbreviate_rank(rank, self.rank.force_abbreviate)
        } else {
            rank.to_string()
        };
        (name, tag)
    }
}

/// `White Walkers` -> `WW`. Ranks with a single capital stay whole unless
/// `force` is set; ranks without capitals collapse to the empty string.
pub fn abbreviate_rank(rank: &str, force: bool) -> String {
    let caps: String = rank.chars().filter(char::is_ascii_uppercase).collect();
    if caps.is_empty() {
        return String::new();
    }
    if !force && caps.chars().count() == 1 {
        return rank.to_string();
    }
    caps
}

impl FormatRule for DiscordRelayRule {
    fn name(&self) -> &'static str {
        "discord-relay"
    }

    fn apply(&self, msg: &Message<'_>) -> Option<Classification> {
        let caps = DISCORD_QUOTED
            .captures(msg.text)
            .or_else(|| DISCORD_SPACED.captures(msg.text))?;
        let (name, tag) = self.split_rank(caps.get(1).map_or("", |m| m.as_str()));
        Some(Classification {
            display_name: name.to_string(),
            strip_prefix: Some(matched_prefix(&caps)),
            tag,
        })
    }
}

/// Shoutbox users relayed under their own nick plus a suffix, e.g.
/// `carol-web`. Scoped to channels with the configured prefix; only the name
/// is rewritten.
pub struct ShoutboxRelayRule {
    pub options: ShoutboxOptions,
    pub tag: String,
}

impl FormatRule for ShoutboxRelayRule {
    fn name(&self) -> &'static str {
        "shoutbox-relay"
    }

    fn apply(&self, msg: &Message<'_>) -> Option<Classification> {
        if !msg.channel.starts_with(&self.options.channel_prefix) {
            return None;
        }
        let name = msg.sender.strip_suffix(self.options.sender_suffix.as_str())?;
        Some(Classification {
            display_name: name.to_string(),
            strip_prefix: None,
            tag: self.tag.clone(),
        })
    }
}

/// `[Nickname] message` or `[Nickname]: message`. The most general shape, so
/// it belongs last.
pub struct BracketNickRule {
    pub tag: String,
}

impl FormatRule for BracketNickRule {
    fn name(&self) -> &'static str {
        "bracket-nick"
    }

    fn apply(&self, msg: &Message<'_>) -> Option<Classification> {
        let caps = BRACKET_NICK.captures(msg.text)?;
        Some(prefix_rewrite(&caps, &self.tag))
    }
}

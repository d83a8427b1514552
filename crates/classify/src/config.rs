use serde::Deserialize;

/// One entry of the bot identity list: an exact nick (including its mode
/// prefix such as `@` or `&`) or a regular expression tested anywhere in the
/// nick.
///
/// In TOML: `matchers = ["Chatbot", { pattern = ".+?-web" }]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MatcherEntry {
    Exact(String),
    Pattern { pattern: String },
}

impl MatcherEntry {
    pub fn exact(nick: &str) -> Self {
        MatcherEntry::Exact(nick.to_string())
    }

    pub fn pattern(pattern: &str) -> Self {
        MatcherEntry::Pattern {
            pattern: pattern.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub matchers: Vec<MatcherEntry>,
    /// Tag attached to results of rules that carry no metadata of their own.
    pub metadata: String,
    pub rules: RuleToggles,
    pub rank: RankOptions,
    pub shoutbox: ShoutboxOptions,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            matchers: vec![
                MatcherEntry::exact("Chatbot"),
                MatcherEntry::exact("&darkpeers"),
                MatcherEntry::exact("&ULCX"),
                MatcherEntry::exact("%ULCX"),
                MatcherEntry::exact("@Willie"),
                MatcherEntry::exact("@WALL-E"),
                MatcherEntry::exact("Bot"),
                MatcherEntry::exact("+Mellos"),
                MatcherEntry::pattern(".+?-web"),
            ],
            metadata: "SB".to_string(),
            rules: RuleToggles::default(),
            rank: RankOptions::default(),
            shoutbox: ShoutboxOptions::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleToggles {
    pub sb_prefix: bool,
    pub chatbox_prefix: bool,
    pub discord_relay: bool,
    pub shoutbox_relay: bool,
    pub bracket_nick: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            sb_prefix: true,
            chatbox_prefix: true,
            discord_relay: true,
            shoutbox_relay: true,
            bracket_nick: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    /// Split a trailing `(Rank)` out of the relayed name into the tag.
    pub remove_rank: bool,
    /// Shorten the rank to its capital letters. Needs `remove_rank`.
    pub abbreviate_rank: bool,
    /// Abbreviate even single-capital ranks.
    pub force_abbreviate: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            remove_rank: true,
            abbreviate_rank: true,
            force_abbreviate: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShoutboxOptions {
    pub channel_prefix: String,
    pub sender_suffix: String,
}

impl Default for ShoutboxOptions {
    fn default() -> Self {
        Self {
            channel_prefix: "#huno".to_string(),
            sender_suffix: "-web".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ClassifierConfig = toml::from_str(
            r#"
            matchers = ["Relay", { pattern = "^bridge-\\d+$" }]

            [rank]
            force_abbreviate = true
            "#,
        )
        .unwrap();
        assert_eq!(
            config.matchers,
            vec![MatcherEntry::exact("Relay"), MatcherEntry::pattern("^bridge-\\d+$")]
        );
        assert_eq!(config.metadata, "SB");
        assert!(config.rank.force_abbreviate);
        assert!(config.rank.remove_rank);
        assert!(config.rules.bracket_nick);
        assert_eq!(config.shoutbox.channel_prefix, "#huno");
    }
}

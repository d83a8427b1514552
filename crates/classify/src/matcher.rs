use crate::config::MatcherEntry;
use crate::error::ClassifierError;
use regex::Regex;

#[derive(Clone, Debug)]
enum BotRule {
    Exact(String),
    Pattern(Regex),
}

/// Ordered set of sender rules identifying relay bots. Immutable once built.
#[derive(Clone, Debug)]
pub struct BotMatcher {
    rules: Vec<BotRule>,
}

impl BotMatcher {
    pub fn new(entries: &[MatcherEntry]) -> Result<Self, ClassifierError> {
        let rules = entries
            .iter()
            .map(|entry| match entry {
                MatcherEntry::Exact(nick) => Ok(BotRule::Exact(nick.clone())),
                MatcherEntry::Pattern { pattern } => Regex::new(pattern)
                    .map(BotRule::Pattern)
                    .map_err(|source| ClassifierError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn matches(&self, sender: &str) -> bool {
        self.rules.iter().any(|rule| match rule {
            BotRule::Exact(nick) => nick == sender,
            BotRule::Pattern(re) => re.is_match(sender),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_compare_whole_nick_including_mode() {
        let m = BotMatcher::new(&[MatcherEntry::exact("&ULCX")]).unwrap();
        assert!(m.matches("&ULCX"));
        assert!(!m.matches("ULCX"));
        assert!(!m.matches("&ULCX2"));
    }

    #[test]
    fn pattern_entries_are_unanchored() {
        let m = BotMatcher::new(&[MatcherEntry::pattern(".+?-web")]).unwrap();
        assert!(m.matches("carol-web"));
        assert!(m.matches("carol-website"));
        assert!(!m.matches("-web"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = BotMatcher::new(&[MatcherEntry::pattern("(")]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidPattern { ref pattern, .. } if pattern == "("));
    }
}

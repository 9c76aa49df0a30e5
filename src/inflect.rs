//! Naming helpers: pluralization for collection accessors, case conversion
//! for class and accessor names.

/// Suffix condition of a pluralization rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Ending {
    /// A `y` preceded by a consonant.
    ConsonantThenY,
    /// Any of the given literal suffixes.
    AnyOf(Vec<String>),
    /// Matches every word.
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Drop the last character, then append.
    DropLastThenAppend(String),
    Append(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PluralRule {
    pub ending: Ending,
    pub transform: Transform,
}

/// Ordered rule table, first match wins. The table is a plain value so tests
/// can build alternates.
#[derive(Debug, Clone, PartialEq)]
pub struct Pluralizer {
    rules: Vec<PluralRule>,
}

impl Default for Pluralizer {
    fn default() -> Self {
        let any_of = |suffixes: &[&str]| {
            Ending::AnyOf(suffixes.iter().map(|s| s.to_string()).collect())
        };
        Self {
            rules: vec![
                PluralRule {
                    ending: Ending::ConsonantThenY,
                    transform: Transform::DropLastThenAppend("ies".into()),
                },
                PluralRule {
                    ending: any_of(&["s", "x", "z", "ch", "sh"]),
                    transform: Transform::Append("es".into()),
                },
                PluralRule {
                    ending: any_of(&["o"]),
                    transform: Transform::Append("es".into()),
                },
                PluralRule {
                    ending: Ending::Any,
                    transform: Transform::Append("s".into()),
                },
            ],
        }
    }
}

impl Pluralizer {
    pub fn new(rules: Vec<PluralRule>) -> Self {
        Self { rules }
    }

    pub fn pluralize(&self, word: &str) -> String {
        for rule in &self.rules {
            if rule.ending.matches(word) {
                return rule.transform.apply(word);
            }
        }
        word.to_string()
    }
}

impl Ending {
    fn matches(&self, word: &str) -> bool {
        match self {
            Ending::ConsonantThenY => {
                let mut chars = word.chars().rev();
                let last = chars.next();
                let before = chars.next();
                last == Some('y')
                    && before.is_some_and(|c| c.is_alphabetic() && !"aeiou".contains(c))
            }
            Ending::AnyOf(suffixes) => suffixes.iter().any(|s| word.ends_with(s.as_str())),
            Ending::Any => true,
        }
    }
}

impl Transform {
    fn apply(&self, word: &str) -> String {
        match self {
            Transform::DropLastThenAppend(suffix) => {
                let mut out: String = word.to_string();
                out.pop();
                out.push_str(suffix);
                out
            }
            Transform::Append(suffix) => format!("{word}{suffix}"),
        }
    }
}

/// `HeroPower` / `hero power` -> `hero_power`
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else if c == ' ' || c == '-' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// `hero_power` -> `HeroPower`
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split(['_', ' ', '-']) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pluralize_rule_table() {
        let p = Pluralizer::default();
        assert_eq!(p.pluralize("hero"), "heroes");
        assert_eq!(p.pluralize("category"), "categories");
        assert_eq!(p.pluralize("team"), "teams");
        assert_eq!(p.pluralize("box"), "boxes");
    }

    #[test]
    fn test_pluralize_more_endings() {
        let p = Pluralizer::default();
        assert_eq!(p.pluralize("boss"), "bosses");
        assert_eq!(p.pluralize("match"), "matches");
        assert_eq!(p.pluralize("dish"), "dishes");
        assert_eq!(p.pluralize("quiz"), "quizes");
        assert_eq!(p.pluralize("day"), "days");
    }

    #[test]
    fn test_vowel_y_is_not_consonant_y() {
        let p = Pluralizer::default();
        assert_eq!(p.pluralize("key"), "keys");
    }

    #[test]
    fn test_custom_rule_table() {
        let p = Pluralizer::new(vec![PluralRule {
            ending: Ending::Any,
            transform: Transform::Append("z".into()),
        }]);
        assert_eq!(p.pluralize("hero"), "heroz");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("team"), "team");
        assert_eq!(snake_case("HeroPower"), "hero_power");
        assert_eq!(snake_case("hero_power"), "hero_power");
        assert_eq!(snake_case("user accounts"), "user_accounts");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("team"), "Team");
        assert_eq!(pascal_case("hero_power"), "HeroPower");
        assert_eq!(pascal_case("user accounts"), "UserAccounts");
    }

    proptest! {
        #[test]
        fn test_pluralize_always_extends(word in "[a-z]{1,12}") {
            let p = Pluralizer::default();
            let plural = p.pluralize(&word);
            prop_assert!(plural.ends_with('s'));
            prop_assert!(plural.len() > word.len());
        }
    }
}

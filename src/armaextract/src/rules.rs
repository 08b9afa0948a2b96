//! Archive exclusion by declared prefix
//!
//! A rule excludes an archive when the rule text occurs anywhere inside the
//! archive's declared prefix. Matching is containment, not prefix comparison:
//! `data` excludes both `data\ui` and `mymod\data`.

use std::fmt;

/// Dubbing audio subtree
pub const DUBBING_PATTERN: &str = "a3\\dubbing";

/// Visual layer data of every built-in map
pub const MAP_LAYER_PATTERNS: [&str; 5] = [
    "a3\\map_altis\\data\\layers",
    "a3\\map_malden\\data\\layers",
    "a3\\map_stratis\\data\\layers",
    "a3\\map_tanoabuka\\data\\layers",
    "a3\\map_vr\\data\\layers",
];

/// Missions subtree
pub const MISSIONS_PATTERN: &str = "a3\\missions";

/// A substring pattern in archive-internal separator convention
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IgnoreRule(String);

impl IgnoreRule {
    /// `None` for an empty pattern, which would match every prefix
    pub fn new(pattern: impl Into<String>) -> Option<Self> {
        let pattern = pattern.into();
        (!pattern.is_empty()).then_some(Self(pattern))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the rule occurs as a contiguous substring of `prefix`
    pub fn contained_in(&self, prefix: &str) -> bool {
        prefix.contains(self.0.as_str())
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in rule groups that can be switched on alongside user patterns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggles {
    pub dubbing: bool,
    pub map_layers: bool,
    pub missions: bool,
}

impl Toggles {
    /// Patterns contributed by the enabled toggles
    pub fn patterns(self) -> Vec<&'static str> {
        let mut patterns = Vec::new();
        if self.dubbing {
            patterns.push(DUBBING_PATTERN);
        }
        if self.map_layers {
            patterns.extend(MAP_LAYER_PATTERNS);
        }
        if self.missions {
            patterns.push(MISSIONS_PATTERN);
        }
        patterns
    }
}

/// The effective exclusion policy of one run. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Union of user patterns and toggle patterns. Empty patterns are dropped.
    pub fn build<I, S>(patterns: I, toggles: Toggles) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = patterns
            .into_iter()
            .map(Into::into)
            .chain(toggles.patterns().into_iter().map(String::from))
            .filter_map(IgnoreRule::new)
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IgnoreRule> {
        self.rules.iter()
    }

    /// First rule contained in `prefix`
    pub fn matching(&self, prefix: &str) -> Option<&IgnoreRule> {
        self.rules.iter().find(|rule| rule.contained_in(prefix))
    }

    /// An absent or empty prefix is always excluded; otherwise excluded if
    /// any rule is contained in it.
    pub fn should_exclude(&self, prefix: Option<&str>) -> bool {
        match prefix {
            None | Some("") => true,
            Some(prefix) => self.matching(prefix).is_some(),
        }
    }
}

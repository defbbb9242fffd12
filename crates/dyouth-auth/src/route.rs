//! Route classification.
//!
//! A [`RouteTable`] is an ordered list of [`RouteRule`]s. Classifying a
//! path walks the table and returns the class of the first matching rule;
//! a path that matches nothing is [`RouteClass::AuthRequired`].
//!
//! # Pattern Forms
//!
//! | Text | Pattern | Matches |
//! |------|---------|---------|
//! | `/login` | `Exact("/login")` | `/login` only |
//! | `/family/*` | `Prefix("/family")` | `/family`, `/family/42` (not `/familysomething`) |
//! | `/_next/` | `Prefix("/_next/")` | anything under `/_next/` |
//!
//! Prefixes are always segment-bounded. A prefix rule never matches a
//! longer sibling segment.

use crate::GateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access tier attached to a path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Reachable by anyone, signed in or not.
    Public,
    /// Requires a valid session.
    AuthRequired,
    /// Requires a valid session and a complete profile.
    ProfileRequired,
}

impl RouteClass {
    /// Returns the snake_case name used in config files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::AuthRequired => "auth_required",
            Self::ProfileRequired => "profile_required",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path pattern: either an exact path or an explicitly marked prefix.
///
/// # Example
///
/// ```
/// use dyouth_auth::RoutePattern;
///
/// let family: RoutePattern = "/family/*".parse().unwrap();
/// assert!(family.matches("/family"));
/// assert!(family.matches("/family/7"));
/// assert!(!family.matches("/familysomething"));
///
/// let login: RoutePattern = "/login".parse().unwrap();
/// assert!(login.matches("/login"));
/// assert!(!login.matches("/login/extra"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoutePattern {
    /// Matches the path exactly.
    Exact(String),
    /// Matches the path and everything below it.
    Prefix(String),
}

impl RoutePattern {
    /// Creates an exact pattern.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidPattern`] if `path` does not start with `/`.
    pub fn exact(path: impl Into<String>) -> Result<Self, GateError> {
        let path = path.into();
        check_absolute(&path)?;
        Ok(Self::Exact(normalize_path(&path)))
    }

    /// Creates a segment-bounded prefix pattern.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidPattern`] if `path` does not start with `/`.
    pub fn prefix(path: impl Into<String>) -> Result<Self, GateError> {
        let path = path.into();
        check_absolute(&path)?;
        if path.ends_with('/') {
            Ok(Self::Prefix(path))
        } else {
            Ok(Self::Prefix(normalize_path(&path)))
        }
    }

    /// Returns `true` if the (already normalized) path matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(p) if p.ends_with('/') => path.starts_with(p.as_str()),
            Self::Prefix(p) => {
                path == p
                    || path
                        .strip_prefix(p.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

impl std::str::FromStr for RoutePattern {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(base) = s.strip_suffix("/*") {
            let base = if base.is_empty() { "/" } else { base };
            Self::prefix(base)
        } else if s.len() > 1 && s.ends_with('/') {
            Self::prefix(s)
        } else {
            Self::exact(s)
        }
    }
}

impl TryFrom<String> for RoutePattern {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoutePattern> for String {
    fn from(pattern: RoutePattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => f.write_str(p),
            Self::Prefix(p) if p == "/" => f.write_str("/*"),
            Self::Prefix(p) if p.ends_with('/') => f.write_str(p),
            Self::Prefix(p) => write!(f, "{p}/*"),
        }
    }
}

/// A single `(pattern, class)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path pattern.
    pub pattern: RoutePattern,
    /// Class assigned when the pattern matches.
    pub class: RouteClass,
}

impl RouteRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(pattern: RoutePattern, class: RouteClass) -> Self {
        Self { pattern, class }
    }
}

/// Ordered, immutable route table.
///
/// First match wins. Unmatched paths are [`RouteClass::AuthRequired`].
///
/// # Example
///
/// ```
/// use dyouth_auth::{RouteClass, RouteTable};
///
/// let table = RouteTable::builder()
///     .public("/")
///     .public("/login")
///     .auth_required("/setup-profile")
///     .profile_required("/wall")
///     .build()
///     .unwrap();
///
/// assert_eq!(table.classify("/login?next=/wall"), RouteClass::Public);
/// assert_eq!(table.classify("/wall"), RouteClass::ProfileRequired);
/// assert_eq!(table.classify("/unknown"), RouteClass::AuthRequired);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Creates a table from rules in priority order.
    #[must_use]
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The table used by the D-Youth site when no routes are configured.
    ///
    /// ```text
    /// /                  public
    /// /login             public
    /// /auth/callback     public
    /// /_next/            public   (static assets)
    /// /favicon.ico       public
    /// /logo.png          public
    /// /setup-profile     auth_required
    /// /profile           profile_required
    /// /walls/*           profile_required
    /// /wall              profile_required
    /// /family/*          profile_required
    /// /message/*         profile_required
    /// /send-message      profile_required
    /// ```
    #[must_use]
    pub fn site_default() -> Self {
        let rule = |pattern: RoutePattern, class| RouteRule::new(pattern, class);
        let exact = |p: &str| RoutePattern::Exact(p.to_string());
        let prefix = |p: &str| RoutePattern::Prefix(p.to_string());

        Self::new(vec![
            rule(exact("/"), RouteClass::Public),
            rule(exact("/login"), RouteClass::Public),
            rule(exact("/auth/callback"), RouteClass::Public),
            rule(prefix("/_next/"), RouteClass::Public),
            rule(exact("/favicon.ico"), RouteClass::Public),
            rule(exact("/logo.png"), RouteClass::Public),
            rule(exact("/setup-profile"), RouteClass::AuthRequired),
            rule(exact("/profile"), RouteClass::ProfileRequired),
            rule(prefix("/walls"), RouteClass::ProfileRequired),
            rule(exact("/wall"), RouteClass::ProfileRequired),
            rule(prefix("/family"), RouteClass::ProfileRequired),
            rule(prefix("/message"), RouteClass::ProfileRequired),
            rule(exact("/send-message"), RouteClass::ProfileRequired),
        ])
    }

    /// Classifies a request path.
    ///
    /// The query string and fragment are ignored.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(&path))
            .map_or(RouteClass::AuthRequired, |rule| rule.class)
    }

    /// Returns the rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Returns `true` if the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builder for [`RouteTable`]. Rules keep insertion order.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<(String, RouteClass)>,
}

impl RouteTableBuilder {
    /// Adds a rule from its textual pattern.
    #[must_use]
    pub fn rule(mut self, pattern: impl Into<String>, class: RouteClass) -> Self {
        self.entries.push((pattern.into(), class));
        self
    }

    /// Adds a [`RouteClass::Public`] rule.
    #[must_use]
    pub fn public(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, RouteClass::Public)
    }

    /// Adds a [`RouteClass::AuthRequired`] rule.
    #[must_use]
    pub fn auth_required(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, RouteClass::AuthRequired)
    }

    /// Adds a [`RouteClass::ProfileRequired`] rule.
    #[must_use]
    pub fn profile_required(self, pattern: impl Into<String>) -> Self {
        self.rule(pattern, RouteClass::ProfileRequired)
    }

    /// Parses every pattern and builds the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`GateError::InvalidPattern`] encountered.
    pub fn build(self) -> Result<RouteTable, GateError> {
        let rules = self
            .entries
            .into_iter()
            .map(|(text, class)| Ok(RouteRule::new(text.parse()?, class)))
            .collect::<Result<Vec<_>, GateError>>()?;
        Ok(RouteTable::new(rules))
    }
}

/// Reduces a request path to the form patterns are matched against.
///
/// - query string and fragment removed
/// - empty path becomes `/`
/// - a single trailing slash is removed (except on `/`)
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim();

    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    let path = path.strip_suffix('/').unwrap_or(path);
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn check_absolute(path: &str) -> Result<(), GateError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(GateError::invalid_pattern(path, "pattern must start with '/'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_table() -> RouteTable {
        RouteTable::builder()
            .public("/")
            .public("/login")
            .auth_required("/setup-profile")
            .profile_required("/profile")
            .profile_required("/wall")
            .build()
            .unwrap()
    }

    #[test]
    fn scenario_classes() {
        let table = scenario_table();
        assert_eq!(table.classify("/"), RouteClass::Public);
        assert_eq!(table.classify("/login"), RouteClass::Public);
        assert_eq!(table.classify("/setup-profile"), RouteClass::AuthRequired);
        assert_eq!(table.classify("/profile"), RouteClass::ProfileRequired);
        assert_eq!(table.classify("/wall"), RouteClass::ProfileRequired);
    }

    #[test]
    fn unmatched_defaults_to_auth_required() {
        let table = scenario_table();
        assert_eq!(table.classify("/admin"), RouteClass::AuthRequired);
        assert_eq!(RouteTable::default().classify("/"), RouteClass::AuthRequired);
    }

    #[test]
    fn exact_root_does_not_cover_everything() {
        let table = scenario_table();
        assert_eq!(table.classify("/wallet"), RouteClass::AuthRequired);
    }

    #[test]
    fn prefix_is_segment_bounded() {
        let table = RouteTable::builder()
            .public("/family/*")
            .build()
            .unwrap();
        assert_eq!(table.classify("/family"), RouteClass::Public);
        assert_eq!(table.classify("/family/abc"), RouteClass::Public);
        assert_eq!(table.classify("/familysomething"), RouteClass::AuthRequired);
    }

    #[test]
    fn trailing_slash_prefix_matches_below_only() {
        let pattern: RoutePattern = "/_next/".parse().unwrap();
        assert!(pattern.matches("/_next/static/app.js"));
        assert!(!pattern.matches("/_nextjs"));
    }

    #[test]
    fn first_match_wins_not_longest() {
        let table = RouteTable::builder()
            .public("/walls/*")
            .profile_required("/walls/send")
            .build()
            .unwrap();
        assert_eq!(table.classify("/walls/send"), RouteClass::Public);
    }

    #[test]
    fn query_fragment_and_trailing_slash_ignored() {
        let table = scenario_table();
        assert_eq!(table.classify("/wall?page=2"), RouteClass::ProfileRequired);
        assert_eq!(table.classify("/wall#top"), RouteClass::ProfileRequired);
        assert_eq!(table.classify("/wall/"), RouteClass::ProfileRequired);
        assert_eq!(table.classify(""), RouteClass::Public);
    }

    #[test]
    fn relative_pattern_rejected() {
        let err = RouteTable::builder().public("login").build().unwrap_err();
        assert!(matches!(err, GateError::InvalidPattern { .. }));
    }

    #[test]
    fn pattern_text_round_trip() {
        for text in ["/login", "/family/*", "/_next/", "/"] {
            let pattern: RoutePattern = text.parse().unwrap();
            assert_eq!(pattern.to_string(), text);
        }
    }

    #[test]
    fn site_default_covers_known_pages() {
        let table = RouteTable::site_default();
        assert_eq!(table.classify("/auth/callback"), RouteClass::Public);
        assert_eq!(table.classify("/_next/image"), RouteClass::Public);
        assert_eq!(table.classify("/message/u-42"), RouteClass::ProfileRequired);
        assert_eq!(table.classify("/walls/send"), RouteClass::ProfileRequired);
        assert_eq!(table.classify("/shake"), RouteClass::AuthRequired);
    }

    #[test]
    fn normalize_examples() {
        assert_eq!(normalize_path("wall"), "/wall");
        assert_eq!(normalize_path("/a/b/?x=1"), "/a/b");
        assert_eq!(normalize_path("?x=1"), "/");
    }
}

//! Element locators used for element-scoped capture and masking.
//!
//! A [`Locator`] names one way of finding elements; a [`LocatorSet`] is the
//! ordered group of locators whose matches are hidden before a capture.

use std::fmt;

/// Strategy for locating page elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector (e.g., "header .clock")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Element `id` attribute
    Id(String),
    /// Element `name` attribute
    Name(String),
    /// `data-testid` attribute
    TestId(String),
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a name locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a test id locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Equivalent CSS selector, if one exists
    ///
    /// XPath has no CSS form and returns `None`.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(s) => Some(s.clone()),
            Self::XPath(_) => None,
            Self::Id(id) => Some(format!("[id={id:?}]")),
            Self::Name(name) => Some(format!("[name={name:?}]")),
            Self::TestId(id) => Some(format!("[data-testid={id:?}]")),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Id(s) => write!(f, "id={s}"),
            Self::Name(s) => write!(f, "name={s}"),
            Self::TestId(s) => write!(f, "testid={s}"),
        }
    }
}

/// Ordered collection of locators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorSet {
    locators: Vec<Locator>,
}

impl LocatorSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a locator
    #[must_use]
    pub fn with(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    /// Append a locator in place
    pub fn push(&mut self, locator: Locator) {
        self.locators.push(locator);
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.locators.iter()
    }
}

impl FromIterator<Locator> for LocatorSet {
    fn from_iter<I: IntoIterator<Item = Locator>>(iter: I) -> Self {
        Self {
            locators: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LocatorSet {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_passthrough() {
        assert_eq!(
            Locator::css("button.primary").to_css().as_deref(),
            Some("button.primary")
        );
    }

    #[test]
    fn test_attribute_locators_to_css() {
        assert_eq!(Locator::id("clock").to_css().as_deref(), Some(r#"[id="clock"]"#));
        assert_eq!(Locator::name("q").to_css().as_deref(), Some(r#"[name="q"]"#));
        assert_eq!(
            Locator::test_id("banner").to_css().as_deref(),
            Some(r#"[data-testid="banner"]"#)
        );
    }

    #[test]
    fn test_attribute_values_are_quoted() {
        assert_eq!(
            Locator::id(r#"a"b"#).to_css().as_deref(),
            Some(r#"[id="a\"b"]"#)
        );
    }

    #[test]
    fn test_xpath_has_no_css_form() {
        assert!(Locator::xpath("//div[@id='x']").to_css().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Locator::css("#a").to_string(), "css=#a");
        assert_eq!(Locator::xpath("//p").to_string(), "xpath=//p");
        assert_eq!(Locator::test_id("t").to_string(), "testid=t");
    }

    #[test]
    fn test_set_preserves_order() {
        let set = LocatorSet::new()
            .with(Locator::id("b"))
            .with(Locator::css(".a"))
            .with(Locator::name("c"));
        let collected: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(collected, ["id=b", "css=.a", "name=c"]);
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_set_from_iterator() {
        let mut set: LocatorSet = [Locator::css("x")].into_iter().collect();
        set.push(Locator::css("y"));
        assert_eq!((&set).into_iter().count(), 2);
        assert!(LocatorSet::new().is_empty());
    }
}

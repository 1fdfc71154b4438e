//! `tag[attr]` selectors and attribute extraction from HTML documents.

use std::fmt;
use std::str::FromStr;

use scraper::Html;
use tracing::trace;
use url::Url;

use super::error::CrawlError;

/// An element/attribute pair such as `a[href]` or `img[src]`.
///
/// Pages are parsed as HTML documents, so comments, script bodies and quoted
/// attribute values never produce matches. Both names match case-insensitively.
#[derive(Debug, Clone)]
pub struct Selector {
    tag: String,
    attribute: String,
    css: scraper::Selector,
}

impl Selector {
    /// Parses a `tag[attr]` selector.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidSelector`] if the text is not exactly a tag
    /// name followed by a bracketed attribute name, each made of ASCII
    /// letters, digits or `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use grabber_core::crawl::Selector;
    ///
    /// let selector = Selector::parse("img[src]").unwrap();
    /// assert_eq!(selector.tag(), "img");
    /// assert_eq!(selector.attribute(), "src");
    /// ```
    pub fn parse(text: &str) -> Result<Self, CrawlError> {
        let trimmed = text.trim();
        let Some((tag, rest)) = trimmed.split_once('[') else {
            return Err(CrawlError::invalid_selector(text, "expected tag[attr]"));
        };
        let Some(attribute) = rest.strip_suffix(']') else {
            return Err(CrawlError::invalid_selector(text, "missing closing ']'"));
        };
        if !is_name(tag) {
            return Err(CrawlError::invalid_selector(text, "invalid tag name"));
        }
        if !is_name(attribute) {
            return Err(CrawlError::invalid_selector(text, "invalid attribute name"));
        }

        let tag = tag.to_ascii_lowercase();
        let attribute = attribute.to_ascii_lowercase();
        let css = scraper::Selector::parse(&format!("{tag}[{attribute}]"))
            .map_err(|_| CrawlError::invalid_selector(text, "not a valid CSS selector"))?;

        Ok(Self {
            tag,
            attribute,
            css,
        })
    }

    /// Lowercased element name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Lowercased attribute name.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Returns the attribute values of matching elements, in document order.
    ///
    /// Values are entity-decoded and trimmed; empty values are skipped.
    #[must_use]
    pub fn extract_values(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.css)
            .filter_map(|element| element.value().attr(&self.attribute))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
            .collect()
    }

    /// Extracts attribute values and resolves them against `base`.
    ///
    /// Values that do not resolve, or resolve to anything other than an
    /// `http`/`https` URL, are dropped.
    #[must_use]
    pub fn extract_links(&self, html: &str, base: &Url) -> Vec<Url> {
        self.extract_values(html)
            .into_iter()
            .filter_map(|value| match base.join(&value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
                _ => {
                    trace!(value = %value, "skipping non-http link");
                    None
                }
            })
            .collect()
    }
}

impl FromStr for Selector {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.tag, self.attribute)
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

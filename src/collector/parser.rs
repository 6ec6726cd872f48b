//! Founder extraction from company detail pages
//!
//! # Locating Founder Blocks
//!
//! 1. Elements whose `class` or `id` mentions "founder" are markers. The
//!    outermost markers are expanded: a marker containing two or more inner
//!    markers, a "Founders" heading followed by two or more cards, or two or
//!    more named cards is a section, and those are the blocks; otherwise the
//!    marker is a block.
//! 2. Without markers, a heading whose text mentions founders is located and
//!    the element siblings that follow it inside its container are the blocks.
//!    A heading with no siblings is replaced by its parent, so headings that
//!    sit in their own wrapper still work.
//!
//! # Pages Without a Founder Section
//!
//! - Each professional-network profile link is paired with the nearest name:
//!   its own text, a preceding sibling, or an enclosing element that holds no
//!   other profile link (up to three levels up).
//! - Sentences like "Founded in 2020 by Jane Doe and John Roe" name founders
//!   without profile links.
//!
//! # Reading a Block
//!
//! - **Name:** text of an element classed `name` (or `*founder*name*`), else
//!   the first plausible text run outside links, else the first plausible link
//!   text. Role labels ("Founder & CEO") and link labels ("LinkedIn") are never
//!   names. A block without a name is skipped.
//! - **Profile:** the first link accepted by the [`ProfileMatcher`].
//!
//! Within one page, founders are deduplicated by case-insensitive name. The
//! first occurrence keeps its position and, if it had no profile link, takes
//! the one from the later duplicate.

use crate::records::FounderRecord;
use crate::url::ProfileMatcher;
use regex_lite::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;

/// Tags whose text is never part of a founder's name
const EXCLUDED_TAGS: &[&str] = &["a", "script", "style", "noscript", "button", "svg", "template"];

/// Tags whose text is read as part of the surrounding element's own text
const INLINE_TAGS: &[&str] = &[
    "span", "b", "strong", "em", "i", "small", "u", "mark", "sup", "sub",
];

/// Short texts that label things rather than name people
const LABELS: &[&str] = &[
    "linkedin", "in", "twitter", "x", "github", "website", "email", "ceo", "cto", "coo", "cfo",
    "cpo", "president", "chairman", "team", "about", "bio", "profile", "view profile",
    "see more", "read more", "show more",
];

const MAX_NAME_CHARS: usize = 80;
const MAX_NAME_WORDS: usize = 6;

/// How far above a profile link to look for its owner's name
const LINK_NAME_LEVELS: usize = 3;

/// "Founded by A B" / "Founded in 2020 by A B, C D and E F"
const FOUNDED_BY: &str = r"\b[Ff]ounded\s+(?:in\s+\d{4}\s+)?by\s+([A-Z][a-zA-Z'-]+\s+[A-Z][a-zA-Z'-]+(?:(?:,\s+|,?\s+and\s+)[A-Z][a-zA-Z'-]+\s+[A-Z][a-zA-Z'-]+)*)";

/// Founders found on one page plus what the parser saw along the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFounders {
    /// Founders in page order, deduplicated by name
    pub founders: Vec<FounderRecord>,

    /// Whether any founder section or block marker was present
    pub section_found: bool,

    /// Blocks dropped because no name could be read
    pub skipped_blocks: usize,
}

impl ParsedFounders {
    /// True when the page did not have the expected shape
    ///
    /// No founder was found, and either no founder section exists or one
    /// exists but none of its blocks had a name.
    pub fn is_anomalous(&self) -> bool {
        self.founders.is_empty() && (!self.section_found || self.skipped_blocks > 0)
    }
}

/// Extracts founders from detail pages
#[derive(Debug, Clone, Default)]
pub struct FounderParser {
    profiles: ProfileMatcher,
}

impl FounderParser {
    pub fn new(profiles: ProfileMatcher) -> Self {
        Self { profiles }
    }

    /// Parses one detail page
    ///
    /// Pure function of `html`: the same input always yields the same output.
    pub fn parse(&self, html: &str) -> ParsedFounders {
        let document = Html::parse_document(html);
        let root = document.root_element();
        let mut parsed = ParsedFounders::default();

        let Some(blocks) = find_blocks(root) else {
            tracing::trace!("No founder section, reading profile links and page text");
            let founders = self
                .founders_near_links(root)
                .into_iter()
                .chain(founders_from_text(root));
            for founder in founders {
                push_deduplicated(&mut parsed.founders, founder);
            }
            return parsed;
        };

        parsed.section_found = true;
        for block in blocks {
            let Some(name) = extract_name(block) else {
                tracing::trace!("Skipping founder block without a name");
                parsed.skipped_blocks += 1;
                continue;
            };

            let profile_url = link_hrefs(block).find_map(|href| self.profiles.match_href(href));
            push_deduplicated(&mut parsed.founders, FounderRecord::new(name, profile_url));
        }

        parsed
    }

    /// Pairs every profile link on the page with the name closest to it
    fn founders_near_links(&self, root: ElementRef) -> Vec<FounderRecord> {
        root.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "a")
            .filter_map(|link| {
                let url = self.profiles.match_href(link.value().attr("href")?)?;
                let name = self.name_near_link(link)?;
                Some(FounderRecord::new(name, Some(url)))
            })
            .collect()
    }

    fn name_near_link(&self, link: ElementRef) -> Option<String> {
        if let Some(name) = extract_name(link) {
            return Some(name);
        }

        let mut node = link;
        for _ in 0..LINK_NAME_LEVELS {
            let preceding = node
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|sibling| self.profile_link_count(*sibling) == 0)
                .find_map(extract_name);
            if preceding.is_some() {
                return preceding;
            }

            let parent = node.parent().and_then(ElementRef::wrap)?;
            if self.profile_link_count(parent) > 1 {
                return None;
            }
            if let Some(name) = extract_name(parent) {
                return Some(name);
            }
            node = parent;
        }

        None
    }

    fn profile_link_count(&self, scope: ElementRef) -> usize {
        link_hrefs(scope)
            .filter(|href| self.profiles.match_href(href).is_some())
            .count()
    }
}

/// Parses founders with the given profile matcher
pub fn parse_founder_page(html: &str, profiles: &ProfileMatcher) -> ParsedFounders {
    FounderParser::new(profiles.clone()).parse(html)
}

/// Convenience function returning just the founders, with default profile rules
///
/// # Example
///
/// ```
/// use yc_founders::collector::parse_founders;
///
/// let html = r#"<div class="founder"><span>Jane Doe</span>
///     <a href="https://www.linkedin.com/in/janedoe">LinkedIn</a></div>"#;
/// let founders = parse_founders(html);
/// assert_eq!(founders[0].name, "Jane Doe");
/// ```
pub fn parse_founders(html: &str) -> Vec<FounderRecord> {
    FounderParser::default().parse(html).founders
}

fn push_deduplicated(founders: &mut Vec<FounderRecord>, founder: FounderRecord) {
    let key = founder.name.to_lowercase();
    match founders.iter_mut().find(|f| f.name.to_lowercase() == key) {
        Some(existing) => {
            if existing.profile_url.is_none() {
                existing.profile_url = founder.profile_url;
            }
        }
        None => founders.push(founder),
    }
}

/// Names from "Founded [in YYYY] by A B and C D" sentences in the page text
fn founders_from_text(root: ElementRef) -> Vec<FounderRecord> {
    let Some(pattern) = founded_by_pattern() else {
        return Vec::new();
    };

    let text = visible_text(root);
    pattern
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|names| {
            names
                .as_str()
                .split(',')
                .flat_map(|part| part.split(" and "))
                .map(str::trim)
                .filter(|name| is_plausible_name(name))
                .map(|name| FounderRecord::new(name.to_string(), None))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn founded_by_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(FOUNDED_BY).ok()).as_ref()
}

/// Every `href` below `scope`, in document order
fn link_hrefs<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    scope
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .filter_map(|a| a.value().attr("href"))
}

/* ---------------- Block location ---------------- */

/// Returns the founder blocks, or `None` when the page has no founder section
fn find_blocks(root: ElementRef) -> Option<Vec<ElementRef>> {
    let markers = top_markers(root);
    if !markers.is_empty() {
        return Some(markers.into_iter().flat_map(expand_marker).collect());
    }

    heading_blocks(root)
}

fn expand_marker(marker: ElementRef) -> Vec<ElementRef> {
    let inner = top_markers(marker);
    if inner.len() >= 2 {
        return inner.into_iter().flat_map(expand_marker).collect();
    }

    if let Some(blocks) = heading_blocks(marker).filter(|blocks| blocks.len() >= 2) {
        return blocks;
    }

    named_cards(marker).unwrap_or_else(|| vec![marker])
}

fn is_marker(el: ElementRef) -> bool {
    let element = el.value();
    element
        .classes()
        .chain(element.id())
        .any(|token| token.to_lowercase().contains("founder"))
}

/// Markers below `scope` that have no marker between them and `scope`
fn top_markers(scope: ElementRef) -> Vec<ElementRef> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| is_marker(*el))
        .filter(|el| {
            el.ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|ancestor| *ancestor != scope)
                .all(|ancestor| !is_marker(ancestor))
        })
        .collect()
}

/// Whether an element is a heading announcing the founders
fn is_founder_heading(el: ElementRef) -> bool {
    let text = collapse(el.text()).to_lowercase();
    let tag = el.value().name();

    if matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
        return text.contains("founder") && text.chars().count() <= 60;
    }

    let is_leaf = !el.children().any(|child| child.value().is_element());
    is_leaf && text.ends_with("founders") && text.chars().count() <= 40
}

/// Blocks following the first founder heading below `scope`
fn heading_blocks(scope: ElementRef) -> Option<Vec<ElementRef>> {
    let headings = scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| is_founder_heading(*el));

    let mut found_heading = false;
    for heading in headings {
        found_heading = true;
        let mut anchor = heading;

        loop {
            let siblings: Vec<ElementRef> = anchor
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|sibling| !is_founder_heading(*sibling))
                .collect();

            if !siblings.is_empty() {
                return Some(unwrap_card_list(siblings));
            }

            match anchor.parent().and_then(ElementRef::wrap) {
                Some(parent) if parent != scope => anchor = parent,
                _ => break,
            }
        }
    }

    // A heading with nothing after it is still a (empty) founder section
    found_heading.then(Vec::new)
}

/// Splits a lone wrapper into its children when each child is a named card
fn unwrap_card_list(siblings: Vec<ElementRef>) -> Vec<ElementRef> {
    if let [wrapper] = siblings.as_slice() {
        if let Some(cards) = named_cards(*wrapper) {
            return cards;
        }
    }
    siblings
}

/// The children of `wrapper` when there are two or more and each is a card
///
/// A card is a container element (it has element children of its own) with
/// a readable name. Founder headings and script-like children are ignored.
fn named_cards(wrapper: ElementRef) -> Option<Vec<ElementRef>> {
    let children: Vec<ElementRef> = wrapper
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| !is_founder_heading(*child))
        .filter(|child| {
            !matches!(
                child.value().name(),
                "script" | "style" | "noscript" | "template"
            )
        })
        .collect();

    let is_card = |child: &ElementRef| {
        !INLINE_TAGS.contains(&child.value().name())
            && !EXCLUDED_TAGS.contains(&child.value().name())
            && child.children().any(|node| node.value().is_element())
            && extract_name(*child).is_some()
    };

    (children.len() >= 2 && children.iter().all(is_card)).then_some(children)
}

/* ---------------- Block reading ---------------- */

/// Reads the founder's display name from a block
fn extract_name(block: ElementRef) -> Option<String> {
    let elements = || block.descendants().filter_map(ElementRef::wrap);

    let by_class = elements()
        .filter(|el| el.value().classes().any(is_name_class))
        .map(visible_text);

    let by_own_text = elements()
        .filter(|el| !is_excluded(*el, block))
        .map(own_text);

    let by_link_text = elements()
        .filter(|el| el.value().name() == "a")
        .map(|el| collapse(el.text()));

    by_class
        .chain(by_own_text)
        .chain(by_link_text)
        .find(|candidate| is_plausible_name(candidate))
}

/// `name`, or a class that mentions both founder and name (`founder-name`)
fn is_name_class(class: &str) -> bool {
    let class = class.to_lowercase();
    class == "name" || (class.contains("founder") && class.contains("name"))
}

/// Whether `el` is, or sits inside, an excluded tag below `block`
fn is_excluded(el: ElementRef, block: ElementRef) -> bool {
    std::iter::once(el)
        .chain(
            el.ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|ancestor| *ancestor != block),
        )
        .any(|e| EXCLUDED_TAGS.contains(&e.value().name()))
}

/// Text directly inside `el`, including inline formatting children
fn own_text(el: ElementRef) -> String {
    let mut parts = Vec::new();
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            parts.push(String::from(&**text));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if INLINE_TAGS.contains(&child_el.value().name()) {
                parts.push(visible_text(child_el));
            }
        }
    }
    collapse(parts.iter().map(String::as_str))
}

/// All text below `el`, skipping excluded subtrees inside it
fn visible_text(el: ElementRef) -> String {
    let parts = el.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let parent = node.parent().and_then(ElementRef::wrap)?;
        if parent != el && is_excluded(parent, el) {
            return None;
        }
        Some(&**text)
    });
    collapse(parts)
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_plausible_name(text: &str) -> bool {
    if text.is_empty() || text.chars().count() > MAX_NAME_CHARS {
        return false;
    }

    let words = text.split_whitespace().count();
    if words > MAX_NAME_WORDS || !text.chars().any(char::is_alphabetic) {
        return false;
    }

    let lower = text.to_lowercase();
    if lower.contains("founder") || lower.starts_with("http") || lower.starts_with("www.") {
        return false;
    }

    !LABELS.contains(&lower.as_str())
}

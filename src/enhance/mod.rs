//! Enhance module - Decorate a rendered documentation page
//!
//! Two independent edits run against a page tree, in this order:
//! - menu: rebuild the side navigation from section headings
//! - anchors: prepend a link marker to every heading with an id
//!
//! Both are free functions over [`PageDom`]; the tree is always passed in.

pub mod anchors;
pub mod api;
pub mod menu;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::PageDom;

pub const DEFAULT_SECTION_CLASS: &str = "docs-section";
pub const DEFAULT_SIDENAV_CLASS: &str = "docs-sidenav";
pub const DEFAULT_MARKER_CLASS: &str = "anchor-link";
pub const DEFAULT_GLYPH_CLASS: &str = "glyphicon glyphicon-link";

/// Tags used for the three recognized heading depths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingTags {
    pub top: String,
    pub sub: String,
    pub subsub: String,
}

impl Default for HeadingTags {
    fn default() -> Self {
        Self {
            top: "h1".to_string(),
            sub: "h2".to_string(),
            subsub: "h3".to_string(),
        }
    }
}

impl HeadingTags {
    /// All three depths, top first
    pub fn all(&self) -> [&str; 3] {
        [&self.top, &self.sub, &self.subsub]
    }
}

/// Class names and tags the enhancer recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceConfig {
    /// Marks one documentation section
    pub section_class: String,
    /// Marks the container whose contents become the menu
    pub sidenav_class: String,
    /// Marks an inserted heading anchor
    pub marker_class: String,
    /// Class list of the glyph inside the anchor
    pub glyph_class: String,
    pub headings: HeadingTags,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            section_class: DEFAULT_SECTION_CLASS.to_string(),
            sidenav_class: DEFAULT_SIDENAV_CLASS.to_string(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            glyph_class: DEFAULT_GLYPH_CLASS.to_string(),
            headings: HeadingTags::default(),
        }
    }
}

impl EnhanceConfig {
    /// Reject configurations the queries cannot honor
    pub fn validate(&self) -> Result<()> {
        for (flag, value) in [
            ("section-class", &self.section_class),
            ("sidenav-class", &self.sidenav_class),
            ("marker-class", &self.marker_class),
        ] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                bail!("--{} must be a single class name, got {:?}", flag, value);
            }
        }

        let tags = self.headings.all();
        for tag in tags {
            if !is_heading_tag(tag) {
                bail!("heading tags must be h1..h6, got {:?}", tag);
            }
        }
        if tags[0].eq_ignore_ascii_case(tags[1])
            || tags[0].eq_ignore_ascii_case(tags[2])
            || tags[1].eq_ignore_ascii_case(tags[2])
        {
            bail!("heading tags must be distinct, got {}", tags.join(", "));
        }

        Ok(())
    }
}

fn is_heading_tag(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    matches!(lower.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Which edits to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhanceOptions {
    pub menu: bool,
    pub anchors: bool,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            menu: true,
            anchors: true,
        }
    }
}

/// What enhancing one page did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceReport {
    /// Top-level menu entries assembled
    pub menu_entries: usize,
    /// Nested links below those entries
    pub menu_links: usize,
    /// Whether the side navigation contents were replaced
    pub sidenav_replaced: bool,
    /// Heading anchors inserted
    pub anchors_added: usize,
}

impl EnhanceReport {
    /// One-line summary for result excerpts
    pub fn summary(&self) -> String {
        let menu = if self.sidenav_replaced {
            format!(
                "menu: {} entries, {} links",
                self.menu_entries, self.menu_links
            )
        } else {
            "menu: untouched".to_string()
        };
        format!("{}; anchors added: {}", menu, self.anchors_added)
    }
}

/// Run the enabled edits on one page: the menu first, then the anchors
pub fn enhance_page<D: PageDom>(
    dom: &mut D,
    config: &EnhanceConfig,
    options: EnhanceOptions,
) -> EnhanceReport {
    let mut report = EnhanceReport::default();

    if options.menu {
        let outcome = menu::build_side_menu(dom, config);
        report.menu_entries = outcome.entries.len();
        report.menu_links = outcome.entries.iter().map(|e| e.children.len()).sum();
        report.sidenav_replaced = outcome.replaced;
    }

    if options.anchors {
        report.anchors_added = anchors::add_heading_anchors(dom, config);
    }

    debug!(
        menu_entries = report.menu_entries,
        sidenav_replaced = report.sidenav_replaced,
        anchors_added = report.anchors_added,
        "page enhanced"
    );
    report
}

/// Heading id, when the attribute is present (an empty value still counts)
pub(crate) fn heading_id<D: PageDom>(dom: &D, heading: D::Node) -> Option<String> {
    dom.attr(heading, "id").map(str::to_string)
}

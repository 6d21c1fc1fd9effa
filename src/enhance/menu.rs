//! Side navigation menu
//!
//! Each section contributes one entry: a link to its first top-level heading
//! with an id, plus a nested list linking every sub-level heading with an id.
//! A section without such a top-level heading contributes nothing.
//!
//! The navigation container is only rewritten when at least one entry was
//! assembled, so a hand-written fallback menu survives pages with no sections.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dom::{Markup, PageDom};
use crate::enhance::{heading_id, EnhanceConfig};

/// Class on every generated list
pub const MENU_LIST_CLASS: &str = "nav";

/// A link to one heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLink {
    pub id: String,
    pub label: String,
}

/// A top-level menu entry with its nested links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuLink>,
}

/// Result of [`build_side_menu`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideMenu {
    pub entries: Vec<MenuEntry>,
    /// Whether the navigation container contents were replaced
    pub replaced: bool,
}

/// Heading text with nested markup and anchor markers stripped, whitespace collapsed
pub fn heading_label<D: PageDom>(dom: &D, heading: D::Node, config: &EnhanceConfig) -> String {
    dom.text_without(heading, &config.marker_class)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Assemble the menu without touching the page
pub fn collect_menu<D: PageDom>(dom: &D, config: &EnhanceConfig) -> Vec<MenuEntry> {
    let mut entries = Vec::new();

    for section in dom.elements_with_class(&config.section_class) {
        let top = dom
            .descendants_with_tags(Some(section), &[config.headings.top.as_str()])
            .into_iter()
            .find_map(|h| heading_id(dom, h).map(|id| (h, id)));

        let Some((heading, id)) = top else {
            trace!(?section, "section without an identified top-level heading");
            continue;
        };

        let children = dom
            .descendants_with_tags(Some(section), &[config.headings.sub.as_str()])
            .into_iter()
            .filter_map(|h| {
                heading_id(dom, h).map(|id| MenuLink {
                    id,
                    label: heading_label(dom, h, config),
                })
            })
            .collect();

        entries.push(MenuEntry {
            id,
            label: heading_label(dom, heading, config),
            children,
        });
    }

    entries
}

fn link(id: &str, label: &str) -> Markup {
    Markup::element("a")
        .attr("href", format!("#{}", id))
        .child(Markup::text(label))
}

fn list_items(entries: &[MenuEntry]) -> Vec<Markup> {
    entries
        .iter()
        .map(|entry| {
            let mut item = Markup::element("li").child(link(&entry.id, &entry.label));
            if !entry.children.is_empty() {
                let nested = entry.children.iter().fold(
                    Markup::element("ul").attr("class", MENU_LIST_CLASS),
                    |list, child| list.child(Markup::element("li").child(link(&child.id, &child.label))),
                );
                item = item.child(nested);
            }
            item
        })
        .collect()
}

/// Markup replacing the contents of a container with tag `container_tag`.
///
/// A `ul`/`ol` container receives the list items directly; any other element
/// receives a single `ul` wrapping them.
pub fn render_menu(entries: &[MenuEntry], container_tag: Option<&str>) -> Vec<Markup> {
    let items = list_items(entries);
    match container_tag {
        Some("ul") | Some("ol") => items,
        _ => vec![items.into_iter().fold(
            Markup::element("ul").attr("class", MENU_LIST_CLASS),
            Markup::child,
        )],
    }
}

/// Rebuild the side navigation from the page's sections
pub fn build_side_menu<D: PageDom>(dom: &mut D, config: &EnhanceConfig) -> SideMenu {
    let entries = collect_menu(dom, config);
    if entries.is_empty() {
        debug!("no menu entries; side navigation left untouched");
        return SideMenu::default();
    }

    let Some(container) = dom.elements_with_class(&config.sidenav_class).first().copied() else {
        debug!(
            class = %config.sidenav_class,
            "no side navigation container; menu not written"
        );
        return SideMenu {
            entries,
            replaced: false,
        };
    };

    let content = render_menu(&entries, dom.tag_name(container));
    dom.replace_children(container, &content);

    SideMenu {
        entries,
        replaced: true,
    }
}

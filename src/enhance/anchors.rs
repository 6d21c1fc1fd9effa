//! Heading anchors
//!
//! Every heading at one of the three recognized depths that has an id gets a
//! leading link to itself:
//! `<a class="anchor-link" href="#id" aria-hidden="true"><span class="glyphicon glyphicon-link"></span></a>`
//!
//! The marker doubles as the guard against inserting twice.

use tracing::trace;

use crate::dom::{Markup, PageDom};
use crate::enhance::{heading_id, EnhanceConfig};

/// The marker prepended to a heading with identifier `id`
pub fn anchor_marker(id: &str, config: &EnhanceConfig) -> Markup {
    Markup::element("a")
        .attr("class", config.marker_class.as_str())
        .attr("href", format!("#{}", id))
        .attr("aria-hidden", "true")
        .child(Markup::element("span").attr("class", config.glyph_class.as_str()))
}

/// Prepend a marker to each identified heading lacking one; returns how many were added
pub fn add_heading_anchors<D: PageDom>(dom: &mut D, config: &EnhanceConfig) -> usize {
    let headings = dom.descendants_with_tags(None, &config.headings.all());
    let mut added = 0;

    for heading in headings {
        let Some(id) = heading_id(dom, heading) else {
            continue;
        };
        if dom.has_child_with_class(heading, &config.marker_class) {
            trace!(%id, "heading already anchored");
            continue;
        }
        dom.prepend_child(heading, &anchor_marker(&id, config));
        added += 1;
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn config() -> EnhanceConfig {
        EnhanceConfig::default()
    }

    const MARKER: &str = r##"<a class="anchor-link" href="#intro" aria-hidden="true"><span class="glyphicon glyphicon-link"></span></a>"##;

    #[test]
    fn test_marker_is_first_child() {
        let mut doc = parse(r#"<h1 id="intro">Intro</h1>"#);
        let added = add_heading_anchors(&mut doc, &config());
        assert_eq!(added, 1);
        assert_eq!(doc.to_html(), format!(r#"<h1 id="intro">{}Intro</h1>"#, MARKER));
    }

    #[test]
    fn test_running_twice_inserts_once() {
        let mut doc = parse(r#"<h2 id="intro">Intro</h2>"#);
        assert_eq!(add_heading_anchors(&mut doc, &config()), 1);
        let once = doc.to_html();
        assert_eq!(add_heading_anchors(&mut doc, &config()), 0);
        assert_eq!(doc.to_html(), once);
        assert_eq!(once.matches("anchor-link").count(), 1);
    }

    #[test]
    fn test_already_marked_in_source() {
        let html = format!(r#"<h3 id="intro">{}Intro</h3>"#, MARKER);
        let mut doc = parse(&html);
        assert_eq!(add_heading_anchors(&mut doc, &config()), 0);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_heading_without_id_untouched() {
        let html = r#"<h1>No id</h1><h3 class="x">Also none</h3>"#;
        let mut doc = parse(html);
        assert_eq!(add_heading_anchors(&mut doc, &config()), 0);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_empty_id_still_anchored() {
        let mut doc = parse(r#"<h2 id="">Empty id</h2>"#);
        assert_eq!(add_heading_anchors(&mut doc, &config()), 1);
        assert_eq!(
            doc.to_html(),
            r##"<h2 id=""><a class="anchor-link" href="#" aria-hidden="true"><span class="glyphicon glyphicon-link"></span></a>Empty id</h2>"##
        );
        assert_eq!(add_heading_anchors(&mut doc, &config()), 0);
    }

    #[test]
    fn test_only_three_depths() {
        let mut doc = parse(concat!(
            r#"<h1 id="a">A</h1><h2 id="b">B</h2><h3 id="c">C</h3>"#,
            r#"<h4 id="d">D</h4><p id="e">E</p>"#,
        ));
        assert_eq!(add_heading_anchors(&mut doc, &config()), 3);
        let html = doc.to_html();
        assert!(html.contains(r#"<h4 id="d">D</h4>"#));
        assert!(html.contains(r#"<p id="e">E</p>"#));
    }

    #[test]
    fn test_headings_anywhere_on_page() {
        let mut doc = parse(r#"<header><h1 id="top">Top</h1></header><div class="docs-section"><h2 id="in">In</h2></div>"#);
        assert_eq!(add_heading_anchors(&mut doc, &config()), 2);
    }

    #[test]
    fn test_nested_marker_does_not_count() {
        let mut doc = parse(
            r##"<h1 id="x"><span><a class="anchor-link" href="#x"></a></span>X</h1>"##,
        );
        assert_eq!(add_heading_anchors(&mut doc, &config()), 1);
    }

    #[test]
    fn test_marker_escapes_id() {
        let marker = anchor_marker("a\"b", &config());
        assert_eq!(marker.get_attr("href"), Some("#a\"b"));

        let mut doc = parse(r#"<h1 id='a"b'>Q</h1>"#);
        add_heading_anchors(&mut doc, &config());
        assert!(doc.to_html().contains(r##"href="#a&quot;b""##));
    }

    #[test]
    fn test_custom_classes() {
        let config = EnhanceConfig {
            marker_class: "permalink".into(),
            glyph_class: "icon icon-link".into(),
            ..EnhanceConfig::default()
        };
        let mut doc = parse(r#"<h2 id="s">S</h2>"#);
        add_heading_anchors(&mut doc, &config);
        assert_eq!(
            doc.to_html(),
            r##"<h2 id="s"><a class="permalink" href="#s" aria-hidden="true"><span class="icon icon-link"></span></a>S</h2>"##
        );
    }
}

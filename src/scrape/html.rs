// Small DOM helpers on top of `scraper`: text extraction, class checks and
// the two traversals the detail page needs (document order, siblings).

use scraper::{ElementRef, Html};

/// Text nodes of `element`, each trimmed, empty ones dropped, joined by `sep`.
pub fn joined_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Text of `element` with whitespace runs between text nodes collapsed to a
/// single space.
pub fn normalized_text(element: ElementRef<'_>) -> String {
    joined_text(element, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_tag(element: ElementRef<'_>, name: &str) -> bool {
    element.value().name().eq_ignore_ascii_case(name)
}

/// `<h1>` to `<h6>`.
pub fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(
        element.value().name().to_ascii_lowercase().as_str(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// First `<tag>` element that comes after `anchor` in document order,
/// including elements nested inside it.
pub fn next_in_document<'a>(
    document: &'a Html,
    anchor: ElementRef<'a>,
    tag: &str,
) -> Option<ElementRef<'a>> {
    let anchor_id = (*anchor).id();
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != anchor_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| is_tag(*el, tag))
}

/// Element siblings after `element`, in order. Text and comment nodes are
/// skipped.
pub fn following_siblings<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    (*element).next_siblings().filter_map(ElementRef::wrap)
}

/// Trimmed, non-empty text of the nodes after `element`, stopping at the
/// first sibling element for which `stop` holds.
///
/// A block start tag (`<ul>`, `<div>`, `<p>`) closes an open `<p>`, so content
/// written inside a paragraph can land here as its siblings.
pub fn trailing_text<'a>(
    element: ElementRef<'a>,
    stop: impl Fn(ElementRef<'a>) -> bool,
) -> Vec<&'a str> {
    let mut parts = Vec::new();
    for node in (*element).next_siblings() {
        if let Some(el) = ElementRef::wrap(node) {
            if stop(el) {
                break;
            }
            parts.extend(el.text().map(str::trim).filter(|t| !t.is_empty()));
        } else if let Some(text) = node.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn joined_text_trims_each_node() {
        let doc = Html::parse_fragment("<table><tr><td>  Nurse <b> I </b>\n</td></tr></table>");
        let td = first(&doc, "td");
        assert_eq!(joined_text(td, ""), "NurseI");
        assert_eq!(joined_text(td, " "), "Nurse I");
    }

    #[test]
    fn normalized_text_collapses_inner_runs() {
        let doc = Html::parse_fragment("<p>Date   Posted:\n  01/02/24</p>");
        assert_eq!(normalized_text(first(&doc, "p")), "Date Posted: 01/02/24");
    }

    #[test]
    fn next_in_document_skips_to_later_element() {
        let doc = Html::parse_document(
            "<body><p>before</p><div><h2>Head</h2></div><section><p>after</p></section></body>",
        );
        let h2 = first(&doc, "h2");
        let p = next_in_document(&doc, h2, "p").unwrap();
        assert_eq!(normalized_text(p), "after");
    }

    #[test]
    fn following_siblings_only_yields_elements() {
        let doc = Html::parse_fragment("<div><h3>A</h3> text <p>1</p><!-- c --><p>2</p></div>");
        let h3 = first(&doc, "h3");
        let names: Vec<_> = following_siblings(h3).map(|e| e.value().name().to_string()).collect();
        assert_eq!(names, vec!["p", "p"]);
    }

    #[test]
    fn list_inside_paragraph_ends_up_trailing_it() {
        let doc = Html::parse_document(
            "<div><p class=\"a\">Intro<ul><li>One</li><li>Two</li></ul> tail</p><h3>Next</h3><p>later</p></div>",
        );
        let p = first(&doc, "p.a");
        assert_eq!(normalized_text(p), "Intro");
        assert_eq!(trailing_text(p, is_heading), vec!["One", "Two", "tail"]);
    }
}

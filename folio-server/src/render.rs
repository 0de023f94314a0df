//! Standalone HTML rendering of a document
//!
//! Blocks render in order with a `role-{role}` class hook; empty text blocks
//! and image blocks without a source produce nothing.

use std::fmt::Write;

use folio_core::model::{Document, ImageAlignment, ImageBlock, TextBlock};
use folio_core::Block;

const BASE_CSS: &str = include_str!("render.css");

/// Render a document as a complete HTML page
pub fn render_document(doc: &Document) -> String {
    let title = escape_html(if doc.title.is_empty() {
        "Document"
    } else {
        doc.title.as_str()
    });

    let mut html = String::with_capacity(BASE_CSS.len() + 256 * (doc.blocks.len() + 1));
    html.push_str("<!DOCTYPE html><html lang='en'><head><meta charset='utf-8'/>");
    let _ = write!(html, "<title>{title}</title>");
    let _ = write!(html, "<style>{BASE_CSS}</style>");
    html.push_str("</head><body><div class=\"page\">");

    let _ = write!(html, "<h1 class=\"page-header-title\">{title}</h1>");
    if let Some(description) = doc.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(
            html,
            "<p class=\"page-header-description\">{}</p>",
            escape_html(description)
        );
    }

    for block in &doc.blocks {
        match block {
            Block::Text(text) => render_text(&mut html, text),
            Block::Image(image) => render_image(&mut html, image),
        }
    }

    html.push_str("</div></body></html>");
    html
}

fn role_class(role: &str) -> String {
    if role.is_empty() {
        "role-default".to_string()
    } else {
        format!("role-{}", escape_html(role))
    }
}

fn render_text(html: &mut String, block: &TextBlock) {
    if block.text.is_empty() {
        return;
    }
    let _ = write!(
        html,
        "<div class=\"block {}\"><p>{}</p></div>",
        role_class(&block.role),
        escape_html(&block.text)
    );
}

fn render_image(html: &mut String, block: &ImageBlock) {
    if block.src.is_empty() {
        return;
    }

    let mut classes = format!("block figure {}", role_class(&block.role));
    match block.alignment() {
        ImageAlignment::Left => classes.push_str(" align-left"),
        ImageAlignment::Right => classes.push_str(" align-right"),
        ImageAlignment::Inline | ImageAlignment::Block => {}
    }

    let alt = escape_html(block.alt_text.as_deref().unwrap_or_default());
    let _ = write!(
        html,
        "<figure class=\"{classes}\"><img src=\"{}\" alt=\"{alt}\"/>",
        escape_html(&block.src)
    );
    if !alt.is_empty() {
        let _ = write!(html, "<figcaption>{alt}</figcaption>");
    }
    html.push_str("</figure>");
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(blocks: Vec<Block>) -> Document {
        Document {
            id: "d".into(),
            project_id: "p".into(),
            title: "Maggid Export Test".into(),
            description: Some("Testing block render".into()),
            blocks,
        }
    }

    fn text(role: &str, body: &str) -> Block {
        Block::Text(TextBlock {
            role: role.into(),
            text: body.into(),
        })
    }

    fn image(src: &str, alt: Option<&str>, alignment: Option<ImageAlignment>) -> Block {
        Block::Image(ImageBlock {
            role: "archaeology_fig".into(),
            src: src.into(),
            alt_text: alt.map(Into::into),
            stored_alignment: alignment,
        })
    }

    #[test]
    fn page_has_title_description_and_blocks() {
        let html = render_document(&doc(vec![
            text("haggadah_main_hebrew", "הא לחמא עניא"),
            text("commentary_en", "This section introduces the theme."),
            image("/images/matzah_oven_01.jpg", Some("Ancient matzah oven."), None),
        ]));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Maggid Export Test</title>"));
        assert!(html.contains("<p class=\"page-header-description\">Testing block render</p>"));
        assert!(html.contains(
            "<div class=\"block role-haggadah_main_hebrew\"><p>הא לחמא עניא</p></div>"
        ));
        assert!(html.contains("<figure class=\"block figure role-archaeology_fig\">"));
        assert!(html.contains("<figcaption>Ancient matzah oven.</figcaption>"));
        assert!(html.contains(".figure.align-left"), "stylesheet embedded");
    }

    #[test]
    fn empty_blocks_are_skipped() {
        let html = render_document(&doc(vec![
            text("commentary_en", ""),
            image("", Some("caption"), None),
        ]));
        assert!(!html.contains("class=\"block "));
        assert!(!html.contains("<figcaption>"));
    }

    #[test]
    fn side_alignments_get_a_class() {
        let html = render_document(&doc(vec![
            image("/a.jpg", None, Some(ImageAlignment::Left)),
            image("/b.jpg", Some(""), Some(ImageAlignment::Inline)),
        ]));
        assert!(html.contains("role-archaeology_fig align-left\"><img src=\"/a.jpg\" alt=\"\"/></figure>"));
        assert!(html.contains("<figure class=\"block figure role-archaeology_fig\"><img src=\"/b.jpg\""));
    }

    #[test]
    fn empty_role_uses_default_class() {
        let html = render_document(&doc(vec![text("", "plain")]));
        assert!(html.contains("<div class=\"block role-default\"><p>plain</p></div>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut d = doc(vec![text("x\"><script>", "<b>bold</b> & 'quoted'")]);
        d.title = "A <Seder>".into();
        let html = render_document(&d);

        assert!(html.contains("<title>A &lt;Seder&gt;</title>"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; &#x27;quoted&#x27;"));
        assert!(html.contains("role-x&quot;&gt;&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn untitled_document_falls_back() {
        let mut d = doc(vec![]);
        d.title.clear();
        d.description = None;
        let html = render_document(&d);
        assert!(html.contains("<title>Document</title>"));
        assert!(!html.contains("<p class=\"page-header-description\">"));
    }
}

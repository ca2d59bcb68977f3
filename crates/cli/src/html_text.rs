use scraper::Html;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of an HTML document as a single line.
///
/// Text nodes are split into words and joined with single spaces, so line
/// breaks and indentation from the markup never reach the matcher.
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Plain-text input keeps its spacing, but line breaks become spaces.
pub(crate) fn flatten_lines(text: &str) -> String {
    text.replace('\r', "").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_visible_text_only() {
        let html = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Shop</title>
    <style>p { color: red; }</style>
    <script>var brand = "hidden";</script>
  </head>
  <body>
    <p>Hello &amp;
       <b>World</b></p>
    <!-- not rendered -->
    <noscript>enable js</noscript>
    <template><p>later</p></template>
  </body>
</html>"#;
        assert_eq!(html_to_text(html), "Shop Hello & World");
    }

    #[test]
    fn separates_adjacent_blocks() {
        assert_eq!(html_to_text("<p>one</p><p>two</p>"), "one two");
    }

    #[test]
    fn flatten_lines_drops_line_breaks() {
        assert_eq!(flatten_lines("a\r\nb\nc  d"), "a b c  d");
    }
}

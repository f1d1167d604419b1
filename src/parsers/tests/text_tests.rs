use crate::parsers::html::extract_text;
use crate::parsers::text::{self, TextOptions};

#[test]
fn test_paragraph_split() {
    assert!(text::paragraphs("").is_empty());
    assert_eq!(text::paragraphs("one\ntwo"), vec![vec!["one", "two"]]);
    assert_eq!(
        text::paragraphs("  first  \n\n\n\nsecond\n"),
        vec![vec!["first"], vec!["second"]]
    );
}

#[test]
fn test_normalize_layouts() {
    let input = "Line 1a\n  Line   1b\n\n\nLine 2";

    assert_eq!(
        text::normalize(input, &TextOptions::default()),
        "Line 1a Line 1b Line 2"
    );
    assert_eq!(
        text::normalize(input, &TextOptions::paragraphs()),
        "Line 1a Line 1b\n\nLine 2"
    );

    let both = TextOptions {
        keep_paragraphs: true,
        keep_line_breaks: true,
    };
    assert_eq!(text::normalize(input, &both), "Line 1a\nLine 1b\n\nLine 2");
}

#[test]
fn test_extract_text_from_html() {
    let html = "<html><head><title>Ignored</title></head><body>\
        <h1>Title</h1><p>Hello <b>world</b></p>\
        <script>var x = 1;</script><p>Second</p></body></html>";

    assert_eq!(extract_text(html), "Title\n\nHello world\n\nSecond");
}

#[test]
fn test_extract_text_keeps_inline_words_whole() {
    let html = "<html><body><p>Use <code>Array</code>.map and re<em>act</em>ive state</p>\
        <p>line one<br>line two</p></body></html>";

    assert_eq!(
        extract_text(html),
        "Use Array.map and reactive state\n\nline one line two"
    );
}

#[test]
fn test_extract_text_empty_body() {
    assert_eq!(extract_text("<html><body></body></html>"), "");
}

/// Layout options for normalizing extracted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// Separate paragraphs with exactly one blank line
    pub keep_paragraphs: bool,
    /// Keep single newlines inside a paragraph
    pub keep_line_breaks: bool,
}

impl TextOptions {
    /// Paragraph-preserving layout used for archived text files
    pub fn paragraphs() -> Self {
        Self {
            keep_paragraphs: true,
            keep_line_breaks: false,
        }
    }
}

/// Normalizes text according to `options`
///
/// Lines are trimmed, runs of blank lines become paragraph boundaries and
/// whitespace inside a line collapses to single spaces.
pub fn normalize(text: &str, options: &TextOptions) -> String {
    let line_sep = if options.keep_line_breaks { "\n" } else { " " };
    let para_sep = if options.keep_paragraphs { "\n\n" } else { " " };

    paragraphs(text)
        .iter()
        .map(|lines| {
            lines
                .iter()
                .map(|line| collapse_whitespace(line))
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(line_sep)
        })
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join(para_sep)
}

/// Splits text into paragraphs of trimmed, non-empty lines
pub fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

fn collapse_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

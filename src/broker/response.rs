//! Classification of broker response bodies.
//!
//! The broker answers with small HTML documents: a successful read embeds
//! one comma-delimited record inside `<body>...</body>`, an exhausted file
//! is signalled by a KO title plus a fixed error phrase, and a successful
//! write carries an OK title.

const EMPTY_TITLE_MARKER: &str = "<title>KO</title>";
const EMPTY_LINE_MARKER: &str = "Error : No more line !";
const ADD_OK_MARKER: &str = "<title>OK</title>";

const BODY_OPEN: &str = "<body>";
const BODY_CLOSE: &str = "</body>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReadBody {
    /// Record columns, in file order.
    Record(Vec<String>),
    /// The file has no more lines; a normal end-of-data condition.
    Empty,
    /// 2xx response without the expected record wrapper.
    Unrecognized,
}

pub(crate) fn classify_read_body(body: &str) -> ReadBody {
    if body.contains(EMPTY_TITLE_MARKER) && body.contains(EMPTY_LINE_MARKER) {
        return ReadBody::Empty;
    }
    match extract_body_span(body) {
        Some(inner) => ReadBody::Record(split_record(inner)),
        None => ReadBody::Unrecognized,
    }
}

pub(crate) fn is_add_ok(body: &str) -> bool {
    body.contains(ADD_OK_MARKER)
}

fn extract_body_span(html: &str) -> Option<&str> {
    let start = html.find(BODY_OPEN)?.checked_add(BODY_OPEN.len())?;
    let tail = html.get(start..)?;
    let end = tail.find(BODY_CLOSE)?;
    Some(tail.get(..end)?.trim())
}

fn split_record(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|column| column.trim().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_extracted_and_trimmed() {
        let body = "<html><head></head><body>\n 42, Alice \n</body></html>";
        assert_eq!(
            classify_read_body(body),
            ReadBody::Record(vec!["42".to_owned(), "Alice".to_owned()])
        );
    }

    #[test]
    fn empty_marker_needs_both_fragments() {
        let exhausted = "<html><title>KO</title>Error : No more line !</html>";
        assert_eq!(classify_read_body(exhausted), ReadBody::Empty);
        // A KO title alone is not the empty-file signal.
        let ko_only = "<html><title>KO</title><body>oops</body></html>";
        assert_eq!(
            classify_read_body(ko_only),
            ReadBody::Record(vec!["oops".to_owned()])
        );
    }

    #[test]
    fn missing_wrapper_is_unrecognized() {
        assert_eq!(classify_read_body("plain text"), ReadBody::Unrecognized);
        assert_eq!(classify_read_body("<body>no close"), ReadBody::Unrecognized);
    }

    #[test]
    fn blank_record_yields_one_empty_column() {
        assert_eq!(
            classify_read_body("<body></body>"),
            ReadBody::Record(vec![String::new()])
        );
    }

    #[test]
    fn add_ok_marker() {
        assert!(is_add_ok("<html><title>OK</title></html>"));
        assert!(!is_add_ok("<html><title>KO</title></html>"));
    }
}

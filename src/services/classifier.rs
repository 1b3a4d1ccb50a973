//! Page classification service.
//!
//! Tells record pages apart from the registry's "not found" and error pages.

use std::fmt;

use scraper::Html;

/// Known error texts that mark a page as holding no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMarker {
    /// The identifier is not registered
    NotRegistered,
    /// Generic internal server error page
    InternalServerError,
    /// Generic "file or directory not found" page
    FileNotFound,
}

impl ErrorMarker {
    pub const ALL: [ErrorMarker; 3] = [
        ErrorMarker::NotRegistered,
        ErrorMarker::InternalServerError,
        ErrorMarker::FileNotFound,
    ];

    /// Literal text searched in the page.
    pub fn text(self) -> &'static str {
        match self {
            ErrorMarker::NotRegistered => "Msg: 0017 - RIP não cadastrado.",
            ErrorMarker::InternalServerError => "500 - Internal server error.",
            ErrorMarker::FileNotFound => "404 - File or directory not found.",
        }
    }
}

impl fmt::Display for ErrorMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Result of classifying a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    Valid,
    NotFound(ErrorMarker),
}

/// Stateless page classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageClassifier;

impl PageClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a parsed page.
    pub fn classify(&self, document: &Html) -> PageClass {
        // Joined text, so a marker split by inline tags still counts.
        let text: String = document.root_element().text().collect();

        ErrorMarker::ALL
            .into_iter()
            .find(|marker| text.contains(marker.text()))
            .map_or(PageClass::Valid, PageClass::NotFound)
    }

    /// Classify raw HTML.
    pub fn classify_html(&self, html: &str) -> PageClass {
        self.classify(&Html::parse_document(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_page_is_valid() {
        let html = r#"<html><body><table><tr><td><font>Logradouro:</font></td></tr></table></body></html>"#;
        assert_eq!(PageClassifier::new().classify_html(html), PageClass::Valid);
    }

    #[test]
    fn test_not_registered() {
        let html = r#"<html><body><font color="red">Msg: 0017 - RIP não cadastrado.</font></body></html>"#;
        assert_eq!(
            PageClassifier::new().classify_html(html),
            PageClass::NotFound(ErrorMarker::NotRegistered)
        );
    }

    #[test]
    fn test_server_error_anywhere_in_text() {
        let html = "<html><body><h2>Erro</h2><p>Detalhe: 500 - Internal server error. Tente depois.</p></body></html>";
        assert_eq!(
            PageClassifier::new().classify_html(html),
            PageClass::NotFound(ErrorMarker::InternalServerError)
        );
    }

    #[test]
    fn test_file_not_found_split_across_tags() {
        let html = "<html><body><h1>404 - File or <b>directory</b> not found.</h1></body></html>";
        assert_eq!(
            PageClassifier::new().classify_html(html),
            PageClass::NotFound(ErrorMarker::FileNotFound)
        );
    }

    #[test]
    fn test_marker_wins_over_record_content() {
        let html = r#"<html><body>
            <table><tr><td><font>Logradouro:</font></td></tr></table>
            <font>500 - Internal server error.</font>
            </body></html>"#;
        assert!(matches!(
            PageClassifier::new().classify_html(html),
            PageClass::NotFound(_)
        ));
    }

    #[test]
    fn test_marker_in_attribute_is_ignored() {
        let html = r#"<html><body><img alt="500 - Internal server error."></body></html>"#;
        assert_eq!(PageClassifier::new().classify_html(html), PageClass::Valid);
    }
}

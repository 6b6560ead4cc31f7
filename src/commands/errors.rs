use crate::deeplink::DeepLinkError;
use crate::export::ExportError;
use crate::original::LookupError;
use crate::prism::PrismError;
use crate::scripture::ReferenceError;
use crate::search::MIN_QUERY_CHARS;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Query must be at least {MIN_QUERY_CHARS} characters")]
    QueryTooShort,

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error(transparent)]
    Prism(#[from] PrismError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    DeepLink(#[from] DeepLinkError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// A follow-up suggestion shown under the error, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CommandError::Prism(PrismError::Unreachable(_)) => {
                Some("start the Prism service or point PRISM_BASE_URL at a running instance")
            }
            CommandError::Prism(PrismError::Timeout(_)) => {
                Some("raise PRISM_TIMEOUT_SECS if the service is slow to respond")
            }
            CommandError::Prism(e) if e.is_retriable() => Some("this error is transient; retry shortly"),
            CommandError::Reference(ReferenceError::UnknownBook(_)) => {
                Some("book names follow the corpus, e.g. 'Psalms', 'I Samuel', 'Song of Solomon'")
            }
            CommandError::DocumentNotFound(_) => Some("list ids with `lectio documents --domain <domain>`"),
            _ => None,
        }
    }

    /// The error message followed by its hint, for terminal output.
    pub fn render(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{self}\nhint: {hint}"),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unreachable_prism_has_hint() {
        let err = CommandError::from(PrismError::Unreachable("http://localhost:8100".into()));
        let text = err.render();
        assert!(text.starts_with("Prism service not reachable at http://localhost:8100. Is it running?"));
        assert!(text.contains("hint: start the Prism service"));
    }

    #[test]
    fn retriable_api_errors_say_so() {
        let err = CommandError::from(PrismError::Api {
            code: 503,
            message: "busy".into(),
        });
        assert_eq!(err.hint(), Some("this error is transient; retry shortly"));

        let err = CommandError::from(PrismError::Api {
            code: 422,
            message: "bad".into(),
        });
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn timeout_hint_names_setting() {
        let err = CommandError::from(PrismError::Timeout(Duration::from_secs(30)));
        assert!(err.hint().unwrap().contains("PRISM_TIMEOUT_SECS"));
    }

    #[test]
    fn query_too_short_message() {
        assert_eq!(
            CommandError::QueryTooShort.render(),
            "Query must be at least 3 characters"
        );
    }

    #[test]
    fn unknown_book_has_hint() {
        let err = CommandError::from("Hezekiah 1:1".parse::<crate::scripture::VerseRef>().unwrap_err());
        assert!(err.render().contains("Unknown book: 'Hezekiah'"));
        assert!(err.hint().is_some());
    }
}

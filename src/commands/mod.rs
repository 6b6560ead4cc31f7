mod errors;
mod params;

pub use errors::CommandError;
pub use params::{
    DocumentArgs, DocumentsArgs, OpenArgs, OriginalArgs, PlacesArgs, SearchArgs, WatchArgs,
};

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use clap::ValueEnum;
use reqwest::Client;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::config::Settings;
use crate::deeplink::{DeepLink, ViewMode};
use crate::export::{self, ExportFormat, ExportInput};
use crate::format;
use crate::geography::{GeographyService, PlaceFilter};
use crate::original::{LanguageLookup, MockOriginalTexts};
use crate::prism::PrismClient;
use crate::prism::types::ListParams;
use crate::scripture::{Translation, VerseRef};
use crate::search::{FilterSet, Phase, QueryCoordinator, SearchResult, SearchState, VerseSearch, is_searchable};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_DOCUMENT_PAGE: usize = 200;

/// Command handlers shared by every subcommand.
///
/// Each handler returns the text to print; `main` decides where it goes.
pub struct Lectio {
    settings: Settings,
    prism: PrismClient,
    geography: GeographyService<PrismClient>,
    original: LanguageLookup<MockOriginalTexts>,
}

impl Lectio {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(settings.request_timeout)
            .build()?;
        let prism = PrismClient::new(http, settings.base_url.as_str(), settings.request_timeout);
        Ok(Self {
            geography: GeographyService::new(prism.clone()),
            original: LanguageLookup::new(MockOriginalTexts::default()),
            prism,
            settings,
        })
    }

    #[cfg(test)]
    fn with_original_latency(mut self, latency: Duration) -> Self {
        self.original = LanguageLookup::new(MockOriginalTexts::new(latency));
        self
    }

    fn coordinator(&self, filters: FilterSet) -> QueryCoordinator<PrismClient> {
        QueryCoordinator::new(
            self.prism.clone(),
            filters,
            self.settings.debounce,
            self.settings.request_timeout,
        )
    }

    pub async fn search(&self, args: SearchArgs) -> Result<String, CommandError> {
        if !is_searchable(&args.query) {
            return Err(CommandError::QueryTooShort);
        }
        let query = args.query.trim();
        let filters = args.filters.filter_set();
        info!(query, translations = filters.translations.len(), "cmd:search");

        let results = self
            .prism
            .search_verses(query, &filters.translations, filters.limit)
            .await?;

        let mut output = format::format_results(query, &results);
        if let Some(format) = args.export.export {
            let note = export_results(query, &filters, &results, format, &args.export.out_dir)?;
            output.push_str(&format!("\n\n{note}"));
        }
        Ok(output)
    }

    /// Interactive search: every input line replaces the query and results
    /// are printed once the debounced search settles.
    ///
    /// Lines starting with `:` are commands: `:t <id>` toggles a translation,
    /// `:k <n>` sets the limit, `:s` searches immediately, `:x <format>`
    /// exports the current results, `:q` quits.
    pub async fn watch<R, W>(&self, args: WatchArgs, input: R, mut output: W) -> Result<(), CommandError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let coordinator = self.coordinator(args.filters.filter_set());
        let mut states = coordinator.subscribe();
        let mut lines = input.lines();
        let mut printed: Option<SearchState> = None;

        info!(debounce_ms = self.settings.debounce.as_millis() as u64, "cmd:watch");
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match WatchCommand::parse(&line) {
                        WatchCommand::Quit => break,
                        command => {
                            let note = self.apply_watch_command(&coordinator, command, &args.out_dir).await;
                            if let Some(note) = note {
                                write_block(&mut output, &note).await?;
                            }
                        }
                    }
                }
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = states.borrow_and_update().clone();
                    print_settled(&mut output, state, &mut printed).await?;
                }
            }
        }

        // Input ended: finish whatever the last line started.
        if coordinator.snapshot().debouncing {
            coordinator.submit().await;
        }
        while coordinator.snapshot().in_progress {
            if states.changed().await.is_err() {
                break;
            }
        }
        coordinator.shutdown();
        print_settled(&mut output, coordinator.snapshot(), &mut printed).await?;
        output.flush().await?;
        Ok(())
    }

    async fn apply_watch_command(
        &self,
        coordinator: &QueryCoordinator<PrismClient>,
        command: WatchCommand,
        out_dir: &Path,
    ) -> Option<String> {
        match command {
            WatchCommand::Query(text) => {
                coordinator.set_query(text);
                None
            }
            WatchCommand::Toggle(translation) => {
                let selected = coordinator.toggle_translation(translation);
                Some(format!(
                    "{} {}",
                    translation.full_name(),
                    if selected { "selected" } else { "deselected" }
                ))
            }
            WatchCommand::Limit(limit) => {
                coordinator.set_limit(limit);
                Some(format!("limit {}", coordinator.filters().limit))
            }
            WatchCommand::Submit => {
                coordinator.submit().await;
                None
            }
            WatchCommand::Export(format) => {
                let state = coordinator.snapshot();
                let filters = coordinator.filters();
                match export_results(&state.query, &filters, &state.results, format, out_dir) {
                    Ok(note) => Some(note),
                    Err(e) => Some(e.render()),
                }
            }
            WatchCommand::Invalid(message) => Some(message),
            WatchCommand::Quit => None,
        }
    }

    pub async fn places(&self, args: PlacesArgs) -> Result<String, CommandError> {
        let filter = PlaceFilter {
            place_type: args.place_type,
            confidence: args.confidence,
        };
        info!(place_type = ?filter.place_type, confidence = ?filter.confidence, "cmd:places");
        let places = self.geography.places(&filter).await?;
        Ok(format::format_places(&places, &filter))
    }

    pub async fn original(&self, args: OriginalArgs) -> Result<String, CommandError> {
        let reference: VerseRef = args.reference.parse()?;
        info!(%reference, "cmd:original");
        self.original_text(&reference).await
    }

    async fn original_text(&self, reference: &VerseRef) -> Result<String, CommandError> {
        match self.original.lookup(reference).await? {
            Some(verse) => Ok(format::format_original(reference, &verse)),
            None => Ok(format!(
                "No {} text available for {reference}.",
                reference.book.language().as_str()
            )),
        }
    }

    pub async fn document(&self, args: DocumentArgs) -> Result<String, CommandError> {
        info!(id = %args.id, "cmd:document");
        match self.prism.get_document(&args.id).await? {
            Some(doc) => Ok(format::format_document(&doc)),
            None => Err(CommandError::DocumentNotFound(args.id)),
        }
    }

    pub async fn documents(&self, args: DocumentsArgs) -> Result<String, CommandError> {
        let params = ListParams {
            domain: args.domain.as_deref(),
            limit: Some(args.limit.clamp(1, MAX_DOCUMENT_PAGE)),
            offset: Some(args.offset),
            filters: Vec::new(),
        };
        info!(domain = ?params.domain, limit = ?params.limit, offset = args.offset, "cmd:documents");
        let list = self.prism.list_documents(&params).await?;
        Ok(format::format_document_list(&list, args.offset))
    }

    /// Open a deep link: the original-language view for a passage, or a
    /// search for the linked query (falling back to the passage reference).
    pub async fn open(&self, args: OpenArgs) -> Result<String, CommandError> {
        let link = DeepLink::parse(&args.link)?;
        info!(view = ?link.view, query = ?link.query, "cmd:open");
        let passage = link.passage();

        if link.view == ViewMode::Original
            && let Some(reference) = &passage
        {
            return self.original_text(reference).await;
        }

        let coordinator = self.coordinator(FilterSet::default());
        coordinator.apply_deep_link(&link);
        if link.query.is_none()
            && let Some(reference) = &passage
        {
            coordinator.set_query(reference.to_string());
        }
        if !is_searchable(&coordinator.query()) {
            return Err(CommandError::QueryTooShort);
        }
        coordinator.submit().await;
        coordinator.shutdown();

        let state = coordinator.snapshot();
        if let Some(error) = state.error {
            return Err(CommandError::Search(error));
        }
        let mut output = format::format_results(&state.query, &state.results);
        if let Some(format) = args.export.export {
            let filters = coordinator.filters();
            let note = export_results(&state.query, &filters, &state.results, format, &args.export.out_dir)?;
            output.push_str(&format!("\n\n{note}"));
        }
        Ok(output)
    }
}

fn export_results(
    query: &str,
    filters: &FilterSet,
    results: &[SearchResult],
    format: ExportFormat,
    out_dir: &Path,
) -> Result<String, CommandError> {
    let translations: Vec<Translation> = filters.translations.iter().copied().collect();
    let input = ExportInput {
        query,
        translations: &translations,
        results,
        timestamp: Utc::now(),
    };
    match export::export(format, &input)? {
        Some(file) => {
            let path = file.write_to(out_dir)?;
            Ok(format!("Exported {} result(s) to {}", results.len(), path.display()))
        }
        None => Ok("Nothing to export.".to_string()),
    }
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

/// Print `state` if it is settled and differs from what was last printed.
async fn print_settled<W: AsyncWrite + Unpin>(
    output: &mut W,
    state: SearchState,
    printed: &mut Option<SearchState>,
) -> std::io::Result<()> {
    if state.phase() != Phase::Idle || printed.as_ref() == Some(&state) {
        return Ok(());
    }
    write_block(output, &format::format_state(&state)).await?;
    *printed = Some(state);
    Ok(())
}

#[derive(Debug, PartialEq)]
enum WatchCommand {
    Query(String),
    Toggle(Translation),
    Limit(usize),
    Export(ExportFormat),
    Submit,
    Quit,
    Invalid(String),
}

impl WatchCommand {
    fn parse(line: &str) -> Self {
        let Some(command) = line.trim().strip_prefix(':') else {
            return WatchCommand::Query(line.to_string());
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map(|(n, a)| (n, a.trim()))
            .unwrap_or((command, ""));
        match name {
            "q" | "quit" => WatchCommand::Quit,
            "s" | "search" => WatchCommand::Submit,
            "t" | "translation" => match Translation::from_id(arg) {
                Some(t) => WatchCommand::Toggle(t),
                None => WatchCommand::Invalid(format!("unknown translation '{arg}'")),
            },
            "k" | "limit" => match arg.parse() {
                Ok(n) => WatchCommand::Limit(n),
                Err(_) => WatchCommand::Invalid(format!("invalid limit '{arg}'")),
            },
            "x" | "export" => match ExportFormat::from_str(arg, true) {
                Ok(format) => WatchCommand::Export(format),
                Err(_) => WatchCommand::Invalid(format!("unknown export format '{arg}' (txt, json, csv)")),
            },
            other => {
                warn!(command = other, "unknown watch command");
                WatchCommand::Invalid(format!("unknown command ':{other}'"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::params::{ExportArgs, FilterArgs};
    use super::*;

    #[test]
    fn watch_command_parsing() {
        assert_eq!(WatchCommand::parse("still waters"), WatchCommand::Query("still waters".into()));
        assert_eq!(WatchCommand::parse(":t web"), WatchCommand::Toggle(Translation::Web));
        assert_eq!(WatchCommand::parse(" :k 25 "), WatchCommand::Limit(25));
        assert_eq!(WatchCommand::parse(":x CSV"), WatchCommand::Export(ExportFormat::Csv));
        assert_eq!(WatchCommand::parse(":s"), WatchCommand::Submit);
        assert_eq!(WatchCommand::parse(":q"), WatchCommand::Quit);
        assert!(matches!(WatchCommand::parse(":t niv"), WatchCommand::Invalid(_)));
        assert!(matches!(WatchCommand::parse(":k many"), WatchCommand::Invalid(_)));
        assert!(matches!(WatchCommand::parse(":zz"), WatchCommand::Invalid(_)));
    }

    fn lectio(base_url: &str) -> Lectio {
        let settings = Settings::from_lookup(|name| match name {
            "LECTIO_DEBOUNCE_MS" => Some("50".into()),
            "PRISM_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        })
        .unwrap()
        .with_base_url(base_url)
        .unwrap();
        Lectio::new(settings)
            .unwrap()
            .with_original_latency(Duration::from_millis(1))
    }

    fn filters(translations: &[Translation]) -> FilterArgs {
        FilterArgs {
            translations: translations.to_vec(),
            limit: 10,
        }
    }

    fn no_export() -> ExportArgs {
        ExportArgs {
            export: None,
            out_dir: ".".into(),
        }
    }

    #[tokio::test]
    async fn short_query_is_rejected_before_any_request() {
        let lectio = lectio("http://127.0.0.1:9");
        let err = lectio
            .search(SearchArgs {
                query: " ab ".into(),
                filters: filters(&[Translation::Kjv]),
                export: no_export(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::QueryTooShort));
    }

    #[tokio::test]
    async fn original_lookup_renders_table() {
        let lectio = lectio("http://127.0.0.1:9");
        let out = lectio
            .original(OriginalArgs {
                reference: "Gen 1:1".into(),
            })
            .await
            .unwrap();
        assert!(out.starts_with("# Genesis 1:1 (Hebrew)"));
        assert!(out.contains("H7225"));

        let missing = lectio
            .original(OriginalArgs {
                reference: "Matthew 5:3".into(),
            })
            .await
            .unwrap();
        assert_eq!(missing, "No Greek text available for Matthew 5:3.");
    }

    #[tokio::test]
    async fn open_original_view_skips_search() {
        let lectio = lectio("http://127.0.0.1:9");
        let out = lectio
            .open(OpenArgs {
                link: "lectio://open?book=John&chapter=1&verse=1&view=original".into(),
                export: no_export(),
            })
            .await
            .unwrap();
        assert!(out.starts_with("# John 1:1 (Greek)"));
    }

    mod http_tests {
        use super::*;
        use wiremock::matchers::{body_partial_json, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn hits(book: &str, chapter: u32, verse: u32, text: &str) -> serde_json::Value {
            serde_json::json!({
                "results": [{
                    "document_id": format!("{book}-{chapter}-{verse}"),
                    "content": text,
                    "score": 0.87,
                    "metadata": {"book": book, "chapter": chapter, "verse_start": verse}
                }]
            })
        }

        async fn mount_search(server: &MockServer, query: &str, body: serde_json::Value) {
            Mock::given(method("POST"))
                .and(path("/api/v1/search"))
                .and(body_partial_json(serde_json::json!({"query": query})))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server)
                .await;
        }

        #[tokio::test]
        async fn search_renders_and_exports() {
            let server = MockServer::start().await;
            mount_search(
                &server,
                "shepherd",
                hits("Psalms", 23, 1, "The LORD is my shepherd; I shall not want."),
            )
            .await;

            let dir = std::env::temp_dir().join(format!("lectio-cmd-search-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();

            let lectio = lectio(&server.uri());
            let out = lectio
                .search(SearchArgs {
                    query: "shepherd".into(),
                    filters: filters(&[Translation::Kjv]),
                    export: ExportArgs {
                        export: Some(ExportFormat::Txt),
                        out_dir: dir.clone(),
                    },
                })
                .await
                .unwrap();

            assert!(out.contains("1. Psalms 23:1 (KJV) [87%]"));
            assert!(out.contains("Exported 1 result(s) to"));

            let exported = std::fs::read_dir(&dir)
                .unwrap()
                .map(|e| e.unwrap().path())
                .find(|p| p.extension().is_some_and(|e| e == "txt"))
                .unwrap();
            let name = exported.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("bible_search_shepherd_"));
            let body = std::fs::read_to_string(&exported).unwrap();
            assert!(body.contains("1. Psalms 23:1 (KJV)"));
            assert!(body.contains("Similarity: 87%"));
            std::fs::remove_dir_all(&dir).unwrap();
        }

        #[tokio::test]
        async fn search_reports_unreachable_service() {
            let lectio = lectio("http://127.0.0.1:9");
            let err = lectio
                .search(SearchArgs {
                    query: "shepherd".into(),
                    filters: filters(&[Translation::Kjv]),
                    export: no_export(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, CommandError::Prism(crate::prism::PrismError::Unreachable(_))));
            assert!(err.hint().is_some());
        }

        #[tokio::test]
        async fn places_command_lists_filtered() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/v1/documents"))
                .and(query_param("domain", "geography"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "documents": [
                        {"id": "sinai", "metadata": {"name": "Mount Sinai", "type": "mountain", "confidence": 320}},
                        {"id": "jordan", "metadata": {"name": "Jordan", "type": "river", "confidence": 90}}
                    ],
                    "total": 2
                })))
                .mount(&server)
                .await;

            let lectio = lectio(&server.uri());
            let out = lectio
                .places(PlacesArgs {
                    place_type: Some(crate::geography::PlaceType::Mountain),
                    confidence: None,
                })
                .await
                .unwrap();
            assert!(out.starts_with("Places type=mountain: 1"));
            assert!(out.contains("Mount Sinai (mountain)"));
            assert!(!out.contains("Jordan"));
        }

        #[tokio::test]
        async fn document_not_found_is_error_with_hint() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/v1/documents/missing"))
                .respond_with(ResponseTemplate::new(404))
                .mount(&server)
                .await;

            let lectio = lectio(&server.uri());
            let err = lectio
                .document(DocumentArgs { id: "missing".into() })
                .await
                .unwrap_err();
            assert!(matches!(err, CommandError::DocumentNotFound(ref id) if id == "missing"));
            assert!(err.render().contains("hint:"));
        }

        #[tokio::test]
        async fn documents_command_pages() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/v1/documents"))
                .and(query_param("domain", "bible/kjv"))
                .and(query_param("limit", "2"))
                .and(query_param("offset", "4"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "documents": [
                        {"id": "kjv-1", "title": "Genesis 1:1 (kjv)", "content": "In the beginning"},
                        {"id": "kjv-2", "title": "Genesis 1:2 (kjv)", "content": "And the earth"}
                    ],
                    "total": 31102
                })))
                .expect(1)
                .mount(&server)
                .await;

            let lectio = lectio(&server.uri());
            let out = lectio
                .documents(DocumentsArgs {
                    domain: Some("bible/kjv".into()),
                    limit: 2,
                    offset: 4,
                })
                .await
                .unwrap();
            assert!(out.starts_with("documents 5-6 of 31102"));
            assert!(out.contains("kjv-2 Genesis 1:2 (kjv)"));
        }

        #[tokio::test]
        async fn open_link_searches_with_linked_translations() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/v1/search"))
                .and(body_partial_json(serde_json::json!({"query": "living water", "domain": "bible/web"})))
                .respond_with(ResponseTemplate::new(200).set_body_json(hits("John", 4, 10, "living water")))
                .expect(1)
                .mount(&server)
                .await;

            let lectio = lectio(&server.uri());
            let out = lectio
                .open(OpenArgs {
                    link: "?q=living+water&translations=web".into(),
                    export: no_export(),
                })
                .await
                .unwrap();
            assert!(out.contains("1. John 4:10 (WEB) [87%]"));
        }

        #[tokio::test]
        async fn open_passage_without_query_searches_reference() {
            let server = MockServer::start().await;
            mount_search(&server, "Psalms 23:1", hits("Psalms", 23, 1, "The LORD is my shepherd")).await;

            let lectio = lectio(&server.uri());
            let out = lectio
                .open(OpenArgs {
                    link: "book=Psalm&chapter=23&verse=1&view=reader".into(),
                    export: no_export(),
                })
                .await
                .unwrap();
            assert!(out.starts_with("1 result(s) for \"Psalms 23:1\""));
        }

        #[tokio::test]
        async fn watch_prints_settled_results_for_last_line() {
            let server = MockServer::start().await;
            mount_search(&server, "still waters", hits("Psalms", 23, 2, "beside the still waters")).await;

            let lectio = lectio(&server.uri());
            let input: &[u8] = b"st\nstill\nstill waters\n";
            let mut output = Vec::new();
            lectio
                .watch(
                    WatchArgs {
                        filters: filters(&[Translation::Kjv]),
                        out_dir: ".".into(),
                    },
                    input,
                    &mut output,
                )
                .await
                .unwrap();

            let text = String::from_utf8(output).unwrap();
            assert!(text.contains("Psalms 23:2 (KJV)"), "{text}");
            assert!(text.contains("1 result(s) for \"still waters\""));

            let searched: Vec<String> = server
                .received_requests()
                .await
                .unwrap()
                .iter()
                .map(|r| r.body_json::<serde_json::Value>().unwrap()["query"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(searched, ["still waters"]);
        }

        #[tokio::test]
        async fn watch_toggle_reports_selection() {
            let lectio = lectio("http://127.0.0.1:9");
            let input: &[u8] = b":t web\n:t kjv\n:q\n";
            let mut output = Vec::new();
            lectio
                .watch(
                    WatchArgs {
                        filters: filters(&[Translation::Kjv]),
                        out_dir: ".".into(),
                    },
                    input,
                    &mut output,
                )
                .await
                .unwrap();
            let text = String::from_utf8(output).unwrap();
            assert!(text.contains("World English Bible selected"));
            assert!(text.contains("King James Version deselected"));
        }
    }
}

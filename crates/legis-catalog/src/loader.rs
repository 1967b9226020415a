//! Fetch-and-normalize loader.
//!
//! [`Catalog::load`] retrieves the raw records of an entity type, projects
//! them into suggestions and sorts them by name. Degraded results are not
//! errors: they come back as a [`LoadReport`] carrying diagnostics.
//!
//! Failure policy:
//! - paginated: a failed page stops the loop; pages already fetched are kept
//!   and the failure is recorded as [`LoadDiagnostic::PageFailed`].
//! - paginated: reaching `max_pages` stops the loop with
//!   [`LoadDiagnostic::PageCapReached`].
//! - nested: a failed request is a hard error.
//! - nested: an extraction that does not land on an array yields no records
//!   and [`LoadDiagnostic::NotAnArray`].
//! - any record the projection rejects fails the whole load.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, field, info, instrument, trace, warn, Span};

use legis_core::defaults::{MAX_PAGES, PAGE_ITEMS_FIELD, PAGE_PARAM};
use legis_core::logging::{DURATION_MS, PARTIAL, REQUEST_COUNT, RESULT_COUNT};
use legis_core::{Error, JsonSource, Result, Suggestion};

use crate::collation::sort_suggestions;
use crate::entity::{EntitySpec, EntityType, FetchStrategy};
use crate::path::{Extraction, ItemsLookup};
use crate::selector::{LoadTicket, SelectorSession};

/// Loader limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Maximum number of pages requested from one paginated listing.
    pub max_pages: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
        }
    }
}

/// Why a load returned less than the full listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadDiagnostic {
    /// The listing still had data after `max_pages` pages.
    PageCapReached { max_pages: u32 },
    /// Fetching `page` failed; earlier pages were kept.
    PageFailed { page: u32, message: String },
    /// The nested extraction did not land on an array.
    NotAnArray { path: String, found: String },
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageCapReached { max_pages } => {
                write!(f, "stopped at the safety limit of {} pages", max_pages)
            }
            Self::PageFailed { page, message } => {
                write!(f, "page {} failed: {}", page, message)
            }
            Self::NotAnArray { path, found } => {
                write!(f, "{} resolved to {}, expected an array", path, found)
            }
        }
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub entity_type: EntityType,
    /// Suggestions sorted by name.
    pub suggestions: Vec<Suggestion>,
    /// HTTP requests issued.
    pub requests: u32,
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl LoadReport {
    fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            suggestions: Vec::new(),
            requests: 0,
            diagnostics: Vec::new(),
        }
    }

    /// True when every record of the listing was retrieved.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True when the result was degraded by a diagnostic.
    pub fn is_partial(&self) -> bool {
        !self.is_complete()
    }
}

/// Entry point for loading entity catalogs.
#[derive(Clone)]
pub struct Catalog {
    source: Arc<dyn JsonSource>,
    config: LoaderConfig,
}

impl Catalog {
    /// Create a catalog with default limits.
    pub fn new(source: Arc<dyn JsonSource>) -> Self {
        Self::with_config(source, LoaderConfig::default())
    }

    /// Create a catalog with explicit limits. A page cap of zero is raised
    /// to one: the first page is always requested.
    pub fn with_config(source: Arc<dyn JsonSource>, mut config: LoaderConfig) -> Self {
        if config.max_pages == 0 {
            warn!("max_pages of 0 raised to 1");
            config.max_pages = 1;
        }
        Self { source, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load, project and sort every record of `entity_type` from `base_url`.
    #[instrument(
        skip(self, entity_type, base_url),
        fields(
            subsystem = "catalog",
            component = "loader",
            op = "load",
            entity_type = %entity_type,
            base_url = %base_url,
            result_count = field::Empty,
            request_count = field::Empty,
            partial = field::Empty,
            duration_ms = field::Empty,
        )
    )]
    pub async fn load(&self, entity_type: EntityType, base_url: &str) -> Result<LoadReport> {
        let start = Instant::now();
        let spec = entity_type.spec();
        let mut report = LoadReport::new(entity_type);

        let records = match &spec.strategy {
            FetchStrategy::Paginated => self.fetch_paginated(base_url, &spec, &mut report).await,
            FetchStrategy::Nested(extraction) => {
                self.fetch_nested(base_url, &spec, extraction, &mut report)
                    .await?
            }
        };

        let mut suggestions = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                trace!(index, "Projecting record");
                (spec.project)(record).map_err(|e| match e {
                    Error::Shape(msg) => {
                        Error::Shape(format!("{} record {}: {}", entity_type, index, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sort_suggestions(&mut suggestions);
        report.suggestions = suggestions;

        let elapsed = start.elapsed().as_millis() as u64;
        let span = Span::current();
        span.record(RESULT_COUNT, report.suggestions.len() as u64);
        span.record(REQUEST_COUNT, report.requests);
        span.record(PARTIAL, report.is_partial());
        span.record(DURATION_MS, elapsed);
        info!(
            result_count = report.suggestions.len(),
            requests = report.requests,
            partial = report.is_partial(),
            "Load complete"
        );
        Ok(report)
    }

    /// Request pages 1, 2, ... until one is empty, one fails, or the cap is hit.
    async fn fetch_paginated(
        &self,
        base_url: &str,
        spec: &EntitySpec,
        report: &mut LoadReport,
    ) -> Vec<JsonValue> {
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut params: Vec<(String, String)> = spec
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            params.push((PAGE_PARAM.to_string(), page.to_string()));

            report.requests += 1;
            match self.source.get_json(base_url, spec.endpoint, &params).await {
                Ok(body) => {
                    let items = take_page_items(body);
                    debug!(page, items = items.len(), "Fetched page");
                    if items.is_empty() {
                        break;
                    }
                    records.extend(items);

                    if page >= self.config.max_pages {
                        warn!(
                            endpoint = spec.endpoint,
                            max_pages = self.config.max_pages,
                            "Paginated fetch reached safety limit"
                        );
                        report.diagnostics.push(LoadDiagnostic::PageCapReached {
                            max_pages: self.config.max_pages,
                        });
                        break;
                    }
                    page += 1;
                }
                Err(e) => {
                    warn!(
                        endpoint = spec.endpoint,
                        page,
                        error = %e,
                        "Page fetch failed, keeping earlier pages"
                    );
                    report.diagnostics.push(LoadDiagnostic::PageFailed {
                        page,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }

        records
    }

    /// Single request, records extracted from a nested location.
    async fn fetch_nested(
        &self,
        base_url: &str,
        spec: &EntitySpec,
        extraction: &Extraction,
        report: &mut LoadReport,
    ) -> Result<Vec<JsonValue>> {
        report.requests += 1;
        let body = self.source.get_json(base_url, spec.endpoint, &[]).await?;

        let found = match extraction.lookup(&body) {
            ItemsLookup::Items(items) => return Ok(items.to_vec()),
            ItemsLookup::Missing => "nothing",
            ItemsLookup::NotArray(kind) => kind,
        };

        warn!(
            endpoint = spec.endpoint,
            path = %extraction.describe(),
            found,
            "Nested extraction did not yield an array"
        );
        report.diagnostics.push(LoadDiagnostic::NotAnArray {
            path: extraction.describe(),
            found: found.to_string(),
        });
        Ok(Vec::new())
    }

    /// Start a load for the session's current entity type and base URL and
    /// commit the result. Returns whether the result was committed.
    pub async fn refresh(&self, session: &Mutex<SelectorSession>) -> bool {
        let ticket = session.lock().await.begin_load();
        self.fulfil(session, ticket).await
    }

    /// Run the load a ticket describes and hand the outcome to the session,
    /// which discards it if a newer load has started in the meantime.
    ///
    /// The session lock is not held while the request is in flight.
    pub async fn fulfil(&self, session: &Mutex<SelectorSession>, ticket: LoadTicket) -> bool {
        let outcome = self.load(ticket.entity_type(), ticket.base_url()).await;
        session.lock().await.finish_load(&ticket, outcome)
    }
}

/// Records of one page; an absent or non-array `dados` counts as empty.
fn take_page_items(body: JsonValue) -> Vec<JsonValue> {
    match body {
        JsonValue::Object(mut map) => match map.remove(PAGE_ITEMS_FIELD) {
            Some(JsonValue::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collation::locale_cmp;
    use crate::mock::MockSource;
    use serde_json::json;
    use std::cmp::Ordering;

    const BASE: &str = "https://dadosabertos.camara.leg.br/api/v2";

    fn partido(i: usize) -> JsonValue {
        json!({"id": i, "sigla": format!("P{:03}", i), "nome": format!("Partido {}", i)})
    }

    fn page_of(range: std::ops::Range<usize>) -> JsonValue {
        json!({"dados": range.map(partido).collect::<Vec<_>>()})
    }

    #[tokio::test]
    async fn test_paginated_two_full_pages_then_empty() {
        let source = MockSource::new(|call| {
            Ok(match call.page() {
                Some(1) => page_of(0..100),
                Some(2) => page_of(100..200),
                _ => json!({"dados": []}),
            })
        });
        let catalog = Catalog::new(Arc::new(source.clone()));

        let report = catalog.load(EntityType::Partidos, BASE).await.unwrap();

        assert_eq!(report.suggestions.len(), 200);
        assert_eq!(report.requests, 3);
        assert!(report.is_complete());
        let pages: Vec<_> = source.calls().iter().map(|c| c.page()).collect();
        assert_eq!(pages, [Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_paginated_merges_static_params() {
        let source = MockSource::new(|_| Ok(json!({"dados": []})));
        let catalog = Catalog::new(Arc::new(source.clone()));

        catalog.load(EntityType::Deputados, BASE).await.unwrap();

        let calls = source.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, "/deputados");
        assert_eq!(calls[0].base_url, BASE);
        assert_eq!(calls[0].param("itens"), Some("100"));
        assert_eq!(calls[0].param("ordenarPor"), Some("nome"));
        assert_eq!(calls[0].param("pagina"), Some("1"));
    }

    #[tokio::test]
    async fn test_paginated_stops_at_page_cap() {
        let source = MockSource::new(|call| {
            let page = call.page().unwrap_or(0) as usize;
            Ok(page_of(page * 10..page * 10 + 1))
        });
        let catalog = Catalog::new(Arc::new(source.clone()));

        let report = catalog.load(EntityType::Partidos, BASE).await.unwrap();

        assert_eq!(report.requests, MAX_PAGES);
        assert_eq!(report.suggestions.len(), MAX_PAGES as usize);
        assert_eq!(
            report.diagnostics,
            [LoadDiagnostic::PageCapReached { max_pages: MAX_PAGES }]
        );
        assert!(report.is_partial());
        assert!(source.calls().iter().all(|c| c.page() <= Some(MAX_PAGES)));
    }

    #[tokio::test]
    async fn test_page_cap_is_overridable() {
        let source = MockSource::new(|_| Ok(page_of(0..1)));
        let catalog =
            Catalog::with_config(Arc::new(source.clone()), LoaderConfig { max_pages: 3 });

        let report = catalog.load(EntityType::Partidos, BASE).await.unwrap();

        assert_eq!(report.requests, 3);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_first_page_is_complete_and_empty() {
        let source = MockSource::new(|_| Ok(json!({"links": []})));
        let catalog = Catalog::new(Arc::new(source));

        let report = catalog.load(EntityType::Frentes, BASE).await.unwrap();

        assert!(report.suggestions.is_empty());
        assert_eq!(report.requests, 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_page_failure_keeps_earlier_pages() {
        let source = MockSource::new(|call| match call.page() {
            Some(1) => Ok(page_of(0..100)),
            _ => Err(Error::Transport("connection reset".to_string())),
        });
        let catalog = Catalog::new(Arc::new(source.clone()));

        let report = catalog.load(EntityType::Partidos, BASE).await.unwrap();

        assert_eq!(report.suggestions.len(), 100);
        assert_eq!(report.requests, 2);
        match report.diagnostics.as_slice() {
            [LoadDiagnostic::PageFailed { page, message }] => {
                assert_eq!(*page, 2);
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected diagnostics: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_page_failure_is_empty_partial() {
        let source = MockSource::new(|_| Err(Error::Transport("timeout".to_string())));
        let catalog = Catalog::new(Arc::new(source));

        let report = catalog.load(EntityType::Orgaos, BASE).await.unwrap();

        assert!(report.suggestions.is_empty());
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn test_nested_party_listing() {
        let source = MockSource::new(|_| {
            Ok(json!({"ListaPartidos": {"Partidos": {"Partido": [
                {"Codigo": 1, "Sigla": "X", "Nome": "Xis"}
            ]}}}))
        });
        let catalog = Catalog::new(Arc::new(source.clone()));

        let report = catalog
            .load(EntityType::SenadoPartidos, "https://legis.senado.leg.br/dadosabertos")
            .await
            .unwrap();

        assert_eq!(report.suggestions, [Suggestion::new("1", "X - Xis")]);
        assert_eq!(report.requests, 1);
        let calls = source.calls();
        assert_eq!(calls[0].endpoint, "/composicao/lista/partidos");
        assert!(calls[0].params.is_empty());
    }

    #[tokio::test]
    async fn test_nested_non_array_is_empty_with_diagnostic() {
        // A single-member listing arrives as an object instead of an array.
        let source = MockSource::new(|_| {
            Ok(json!({"ListaBlocoParlamentar": {"Blocos": {"Bloco": {"CodigoBloco": 1}}}}))
        });
        let catalog = Catalog::new(Arc::new(source));

        let report = catalog.load(EntityType::SenadoBlocos, BASE).await.unwrap();

        assert!(report.suggestions.is_empty());
        assert_eq!(
            report.diagnostics,
            [LoadDiagnostic::NotAnArray {
                path: "ListaBlocoParlamentar.Blocos.Bloco".to_string(),
                found: "object".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_nested_missing_path_is_empty() {
        let source = MockSource::new(|_| Ok(json!({"erro": "indisponível"})));
        let catalog = Catalog::new(Arc::new(source));

        let report = catalog
            .load(EntityType::ProposicoesSiglaTipo, BASE)
            .await
            .unwrap();

        assert!(report.suggestions.is_empty());
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn test_nested_transport_failure_is_error() {
        let source = MockSource::new(|_| Err(Error::Transport("503".to_string())));
        let catalog = Catalog::new(Arc::new(source));

        let result = catalog.load(EntityType::SenadoParlamentar, BASE).await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_malformed_record_fails_whole_load() {
        let source = MockSource::new(|call| {
            Ok(match call.page() {
                Some(1) => json!({"dados": [partido(1), {"sigla": "SEM"}, partido(2)]}),
                _ => json!({"dados": []}),
            })
        });
        let catalog = Catalog::new(Arc::new(source));

        let err = catalog.load(EntityType::Partidos, BASE).await.unwrap_err();

        assert!(matches!(err, Error::Shape(_)));
        assert!(err.to_string().contains("partidos record 1"));
    }

    #[tokio::test]
    async fn test_output_sorted_by_locale() {
        let source = MockSource::new(|call| {
            Ok(match call.page() {
                Some(1) => json!({"dados": [
                    {"id": 1, "titulo": "Frente Parlamentar da Saúde"},
                    {"id": 2, "titulo": "frente parlamentar do Agro"},
                    {"id": 3, "titulo": "Ética na Política"},
                    {"id": 4, "titulo": "Educação Já"},
                ]}),
                _ => json!({"dados": []}),
            })
        });
        let catalog = Catalog::new(Arc::new(source));

        let report = catalog.load(EntityType::Frentes, BASE).await.unwrap();

        let names: Vec<_> = report.suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Educação Já",
                "Ética na Política",
                "Frente Parlamentar da Saúde",
                "frente parlamentar do Agro",
            ]
        );
        assert!(report
            .suggestions
            .windows(2)
            .all(|w| locale_cmp(&w[0].name, &w[1].name) != Ordering::Greater));
    }

    #[tokio::test]
    async fn test_zero_page_cap_is_raised_to_one() {
        let source = MockSource::new(|_| Ok(page_of(0..1)));
        let catalog =
            Catalog::with_config(Arc::new(source.clone()), LoaderConfig { max_pages: 0 });
        assert_eq!(catalog.config().max_pages, 1);

        let report = catalog.load(EntityType::Partidos, BASE).await.unwrap();

        assert_eq!(report.requests, 1);
        assert_eq!(
            report.diagnostics,
            [LoadDiagnostic::PageCapReached { max_pages: 1 }]
        );
    }

    #[tokio::test]
    async fn test_slow_superseded_load_does_not_overwrite_session() {
        let slow = Catalog::new(Arc::new(
            MockSource::new(|call| {
                Ok(match call.page() {
                    Some(1) => json!({"dados": [{"id": 1, "nome": "Antigo"}]}),
                    _ => json!({"dados": []}),
                })
            })
            .with_latency_ms(50),
        ));
        let fast = Catalog::new(Arc::new(MockSource::new(|call| {
            Ok(match call.page() {
                Some(1) => json!({"dados": [{"id": 2, "nome": "Novo"}]}),
                _ => json!({"dados": []}),
            })
        })));

        let session = Mutex::new(SelectorSession::new(EntityType::Grupos, BASE));
        let first = session.lock().await.begin_load();
        let second = session.lock().await.begin_load();

        let (first_committed, second_committed) =
            tokio::join!(slow.fulfil(&session, first), fast.fulfil(&session, second));

        assert!(!first_committed);
        assert!(second_committed);
        let session = session.lock().await;
        assert_eq!(session.suggestions(), [Suggestion::new("2", "Novo")]);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_commits_into_session() {
        let catalog = Catalog::new(Arc::new(MockSource::fixed(json!({
            "ListaPartidos": {"Partidos": {"Partido": [{"Codigo": 1, "Sigla": "X", "Nome": "Xis"}]}}
        }))));
        let session = Mutex::new(SelectorSession::new(EntityType::SenadoPartidos, BASE));

        assert!(catalog.refresh(&session).await);
        assert_eq!(session.lock().await.generation(), 1);
        assert_eq!(session.lock().await.suggestions().len(), 1);
    }

    #[test]
    fn test_take_page_items_tolerates_shapes() {
        assert_eq!(take_page_items(json!({"dados": [1]})), vec![json!(1)]);
        assert!(take_page_items(json!({"dados": null})).is_empty());
        assert!(take_page_items(json!({"dados": "x"})).is_empty());
        assert!(take_page_items(json!([1, 2])).is_empty());
    }

    #[test]
    fn test_diagnostic_display() {
        let d = LoadDiagnostic::PageCapReached { max_pages: 20 };
        assert_eq!(d.to_string(), "stopped at the safety limit of 20 pages");
    }

    #[test]
    fn test_diagnostic_serializes_tagged() {
        let d = LoadDiagnostic::PageFailed {
            page: 3,
            message: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"kind": "page_failed", "page": 3, "message": "boom"})
        );
    }
}

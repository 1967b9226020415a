//! Centralized default constants for legis-catalog.
//!
//! Crates reference these instead of repeating literals. Runtime overrides
//! live in `legis_catalog::config::CatalogConfig`.

// =============================================================================
// ENDPOINTS
// =============================================================================

/// Base URL of the Câmara dos Deputados open-data API.
pub const CAMARA_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";

/// Base URL of the Senado Federal open-data API.
pub const SENADO_URL: &str = "https://legis.senado.leg.br/dadosabertos";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("legis-catalog/", env!("CARGO_PKG_VERSION"));

/// Default HTTP request timeout (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// PAGINATION
// =============================================================================

/// Safety cap on the number of pages fetched from one paginated listing.
///
/// With `PAGE_SIZE` items per page this bounds a load at 2000 records.
pub const MAX_PAGES: u32 = 20;

/// Items requested per page from paginated listings.
pub const PAGE_SIZE: &str = "100";

/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "pagina";

/// Field holding the item array of a paginated response.
pub const PAGE_ITEMS_FIELD: &str = "dados";

// =============================================================================
// PICKER LABELS
// =============================================================================

/// Label shown while a load is in flight.
pub const LOADING_LABEL: &str = "Carregando...";

/// Title used when the picker has no placeholder.
pub const PICKER_TITLE: &str = "Selecione um item";

/// Message shown when a search matches nothing.
pub const NO_RESULTS_LABEL: &str = "Nenhum resultado encontrado.";

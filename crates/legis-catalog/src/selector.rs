//! Picker session state.
//!
//! A [`SelectorSession`] holds what a searchable entity picker needs between
//! events: the loaded suggestions, the bound value, the search text and the
//! open/loading flags. Loads are split into [`SelectorSession::begin_load`]
//! and [`SelectorSession::finish_load`] so the caller can await the network
//! without holding the session; every `begin_load` bumps a generation
//! counter and only the newest generation may commit.

use std::borrow::Cow;
use std::fmt;
use tracing::{debug, warn};

use legis_core::defaults::{LOADING_LABEL, NO_RESULTS_LABEL, PICKER_TITLE};
use legis_core::{Result, Suggestion};

use crate::entity::EntityType;
use crate::filter::filter_suggestions;
use crate::loader::LoadReport;

type ChangeCallback = Box<dyn FnMut(&str) + Send>;

/// Handle for one in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    entity_type: EntityType,
    base_url: String,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub struct SelectorSession {
    entity_type: EntityType,
    base_url: String,
    value: String,
    placeholder: String,
    suggestions: Vec<Suggestion>,
    query: String,
    open: bool,
    loading: bool,
    generation: u64,
    on_change: Option<ChangeCallback>,
}

impl SelectorSession {
    /// New closed session with no value and nothing loaded.
    pub fn new(entity_type: EntityType, base_url: impl Into<String>) -> Self {
        Self {
            entity_type,
            base_url: base_url.into(),
            value: String::new(),
            placeholder: PICKER_TITLE.to_string(),
            suggestions: Vec::new(),
            query: String::new(),
            open: false,
            loading: false,
            generation: 0,
            on_change: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Callback invoked with the new value on select and clear.
    pub fn with_on_change<F>(mut self, on_change: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_change = Some(Box::new(on_change));
        self
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Change the entity type. Returns a ticket for the reload it requires,
    /// or `None` if nothing changed.
    pub fn set_entity_type(&mut self, entity_type: EntityType) -> Option<LoadTicket> {
        if self.entity_type == entity_type {
            return None;
        }
        self.entity_type = entity_type;
        Some(self.begin_load())
    }

    /// Change the base URL. Returns a ticket for the reload it requires, or
    /// `None` if nothing changed.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Option<LoadTicket> {
        let base_url = base_url.into();
        if self.base_url == base_url {
            return None;
        }
        self.base_url = base_url;
        Some(self.begin_load())
    }

    /// Replace the bound value without notifying the callback.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Mark a load as in flight and supersede any earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        debug!(
            generation = self.generation,
            entity_type = %self.entity_type,
            "Load started"
        );
        LoadTicket {
            generation: self.generation,
            entity_type: self.entity_type,
            base_url: self.base_url.clone(),
        }
    }

    /// Commit the outcome of the load `ticket` describes. Outcomes of
    /// superseded loads are dropped and `false` is returned. A failed load
    /// leaves the picker empty.
    pub fn finish_load(&mut self, ticket: &LoadTicket, outcome: Result<LoadReport>) -> bool {
        if ticket.generation != self.generation {
            warn!(
                generation = ticket.generation,
                current = self.generation,
                entity_type = %ticket.entity_type,
                "Discarding result of superseded load"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(report) => {
                for diagnostic in &report.diagnostics {
                    warn!(entity_type = %ticket.entity_type, %diagnostic, "Partial load");
                }
                self.suggestions = report.suggestions;
            }
            Err(e) => {
                warn!(
                    entity_type = %ticket.entity_type,
                    error = %e,
                    "Load failed, picker left empty"
                );
                self.suggestions.clear();
            }
        }
        true
    }

    // =========================================================================
    // Picker interaction
    // =========================================================================

    /// Open the picker with an empty search. Refused while loading.
    pub fn open(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.open = true;
        self.query.clear();
        true
    }

    /// Close without selecting.
    pub fn dismiss(&mut self) {
        self.open = false;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Suggestions matching the current search.
    pub fn visible(&self) -> Cow<'_, [Suggestion]> {
        filter_suggestions(&self.suggestions, &self.query)
    }

    /// Message shown in place of the list when the search matches nothing.
    /// `None` while loading or when there is something to show.
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.loading && self.visible().is_empty() {
            Some(NO_RESULTS_LABEL)
        } else {
            None
        }
    }

    /// Bind `suggestion`, notify the callback and close. Returns the new value.
    pub fn select(&mut self, suggestion: &Suggestion) -> String {
        self.value = suggestion.id.clone();
        self.notify();
        self.open = false;
        self.value.clone()
    }

    /// Reset the value to empty and notify the callback. Leaves the picker
    /// closed if it was closed.
    pub fn clear(&mut self) -> String {
        self.value.clear();
        self.notify();
        self.value.clone()
    }

    fn notify(&mut self) {
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&self.value);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Loaded suggestion whose id equals the current value.
    pub fn selected(&self) -> Option<&Suggestion> {
        if self.value.is_empty() {
            return None;
        }
        self.suggestions.iter().find(|s| s.id == self.value)
    }

    /// Text shown on the closed picker.
    pub fn label(&self) -> &str {
        if self.loading {
            LOADING_LABEL
        } else if let Some(selected) = self.selected() {
            selected.name.as_str()
        } else {
            self.placeholder.as_str()
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for SelectorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorSession")
            .field("entity_type", &self.entity_type)
            .field("base_url", &self.base_url)
            .field("value", &self.value)
            .field("suggestions", &self.suggestions.len())
            .field("query", &self.query)
            .field("open", &self.open)
            .field("loading", &self.loading)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

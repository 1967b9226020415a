//! Core data models for legis-catalog.
//!
//! These types are shared across the legis crates and describe what the
//! portal shows: picker suggestions, the two legislative chambers, and the
//! topical data categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::defaults;
use crate::error::Error;

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// A normalized `{id, name}` entry offered by the entity picker.
///
/// `id` round-trips into the owning form; `name` is the human label.
/// Uniqueness of `id` within one entity type is assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// CHAMBERS
// =============================================================================

/// Legislative house publishing a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    /// Câmara dos Deputados.
    Camara,
    /// Senado Federal.
    Senado,
}

impl Chamber {
    /// Public open-data API root for this chamber.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Camara => defaults::CAMARA_URL,
            Self::Senado => defaults::SENADO_URL,
        }
    }

    /// Display name in Portuguese.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Camara => "Câmara dos Deputados",
            Self::Senado => "Senado Federal",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camara => write!(f, "camara"),
            Self::Senado => write!(f, "senado"),
        }
    }
}

impl FromStr for Chamber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "camara" | "câmara" => Ok(Self::Camara),
            "senado" => Ok(Self::Senado),
            _ => Err(Error::Config(format!("unknown chamber: {}", s))),
        }
    }
}

// =============================================================================
// DATA CATEGORIES
// =============================================================================

/// Topical area the portal offers for free-form questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Categories listed in the portal sidebar, in display order.
pub const DATA_CATEGORIES: &[DataCategory] = &[
    DataCategory {
        id: "educacao",
        name: "Educação",
        description: "Dados sobre escolas, matrículas, ENEM, etc.",
    },
    DataCategory {
        id: "saude",
        name: "Saúde",
        description: "Informações sobre hospitais, SUS, doenças, etc.",
    },
    DataCategory {
        id: "seguranca_publica",
        name: "Segurança Pública",
        description: "Estatísticas de criminalidade, policiamento, etc.",
    },
    DataCategory {
        id: "economia",
        name: "Economia",
        description: "Dados de inflação, PIB, emprego, comércio, etc.",
    },
    DataCategory {
        id: "industria",
        name: "Indústria",
        description: "Produção industrial, setores e crescimento.",
    },
    DataCategory {
        id: "meio_ambiente",
        name: "Meio Ambiente",
        description: "Desmatamento, emissões, áreas de conservação.",
    },
];

/// Look up a data category by id.
pub fn data_category(id: &str) -> Option<&'static DataCategory> {
    DATA_CATEGORIES.iter().find(|c| c.id == id)
}

//! Entity types the picker can browse and how each one is fetched.
//!
//! Every category is a variant of [`EntityType`]; [`EntityType::spec`] maps
//! it to the endpoint, static query parameters, fetch strategy and
//! projection. The match is exhaustive, so adding a variant without a spec
//! does not compile.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use legis_core::defaults::PAGE_SIZE;
use legis_core::{Chamber, Error, Result, Suggestion};

use crate::path::Extraction;
use crate::projection::{br_date_field, id_field, nested, text_field, year_field};

/// Projection from one raw record to a suggestion.
pub type Projection = fn(&JsonValue) -> Result<Suggestion>;

/// How the raw records of an entity type are retrieved.
#[derive(Debug, Clone)]
pub enum FetchStrategy {
    /// Page-numbered listing whose records live under `dados`.
    Paginated,
    /// Single response with the records at a nested location.
    Nested(Extraction),
}

/// Fetch and projection description of one entity type.
#[derive(Debug, Clone)]
pub struct EntitySpec {
    pub endpoint: &'static str,
    pub params: &'static [(&'static str, &'static str)],
    pub strategy: FetchStrategy,
    pub project: Projection,
}

impl EntitySpec {
    pub fn is_paginated(&self) -> bool {
        matches!(self.strategy, FetchStrategy::Paginated)
    }
}

/// Legislative-data category offered by the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    // Câmara
    #[serde(rename = "deputados")]
    Deputados,
    #[serde(rename = "partidos")]
    Partidos,
    #[serde(rename = "partidos_sigla")]
    PartidosSigla,
    #[serde(rename = "frentes")]
    Frentes,
    #[serde(rename = "legislaturas")]
    Legislaturas,
    #[serde(rename = "proposicoes")]
    Proposicoes,
    #[serde(rename = "proposicoes_siglaTipo")]
    ProposicoesSiglaTipo,
    #[serde(rename = "orgaos")]
    Orgaos,
    #[serde(rename = "eventos")]
    Eventos,
    #[serde(rename = "blocos")]
    Blocos,
    #[serde(rename = "grupos")]
    Grupos,
    #[serde(rename = "votacoes")]
    Votacoes,
    // Senado
    #[serde(rename = "senado_blocos")]
    SenadoBlocos,
    #[serde(rename = "senado_comissoes_codigo")]
    SenadoComissoesCodigo,
    #[serde(rename = "senado_comissoes_sigla")]
    SenadoComissoesSigla,
    #[serde(rename = "senado_partidos")]
    SenadoPartidos,
    #[serde(rename = "senado_parlamentar")]
    SenadoParlamentar,
}

const ITENS: &[(&str, &str)] = &[("itens", PAGE_SIZE)];
const ITENS_POR_NOME: &[(&str, &str)] = &[("itens", PAGE_SIZE), ("ordenarPor", "nome")];
const ITENS_DESC_ID: &[(&str, &str)] = &[("itens", PAGE_SIZE), ("ordem", "DESC"), ("ordenarPor", "id")];
const ITENS_DESC_INICIO: &[(&str, &str)] = &[
    ("itens", PAGE_SIZE),
    ("ordem", "DESC"),
    ("ordenarPor", "dataHoraInicio"),
];
const ITENS_DESC_REGISTRO: &[(&str, &str)] = &[
    ("itens", PAGE_SIZE),
    ("ordem", "DESC"),
    ("ordenarPor", "dataHoraRegistro"),
];

impl EntityType {
    /// Every entity type, Câmara first.
    pub const ALL: [EntityType; 17] = [
        Self::Deputados,
        Self::Partidos,
        Self::PartidosSigla,
        Self::Frentes,
        Self::Legislaturas,
        Self::Proposicoes,
        Self::ProposicoesSiglaTipo,
        Self::Orgaos,
        Self::Eventos,
        Self::Blocos,
        Self::Grupos,
        Self::Votacoes,
        Self::SenadoBlocos,
        Self::SenadoComissoesCodigo,
        Self::SenadoComissoesSigla,
        Self::SenadoPartidos,
        Self::SenadoParlamentar,
    ];

    /// Wire key used by forms and the CLI.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Deputados => "deputados",
            Self::Partidos => "partidos",
            Self::PartidosSigla => "partidos_sigla",
            Self::Frentes => "frentes",
            Self::Legislaturas => "legislaturas",
            Self::Proposicoes => "proposicoes",
            Self::ProposicoesSiglaTipo => "proposicoes_siglaTipo",
            Self::Orgaos => "orgaos",
            Self::Eventos => "eventos",
            Self::Blocos => "blocos",
            Self::Grupos => "grupos",
            Self::Votacoes => "votacoes",
            Self::SenadoBlocos => "senado_blocos",
            Self::SenadoComissoesCodigo => "senado_comissoes_codigo",
            Self::SenadoComissoesSigla => "senado_comissoes_sigla",
            Self::SenadoPartidos => "senado_partidos",
            Self::SenadoParlamentar => "senado_parlamentar",
        }
    }

    pub fn chamber(&self) -> Chamber {
        match self {
            Self::SenadoBlocos
            | Self::SenadoComissoesCodigo
            | Self::SenadoComissoesSigla
            | Self::SenadoPartidos
            | Self::SenadoParlamentar => Chamber::Senado,
            _ => Chamber::Camara,
        }
    }

    pub fn spec(&self) -> EntitySpec {
        match self {
            Self::Deputados => paginated("/deputados", ITENS_POR_NOME, project_deputado),
            Self::Partidos => paginated("/partidos", ITENS, project_partido),
            Self::PartidosSigla => paginated("/partidos", ITENS, project_partido_sigla),
            Self::Frentes => paginated("/frentes", ITENS, project_frente),
            Self::Legislaturas => paginated("/legislaturas", ITENS_DESC_ID, project_legislatura),
            Self::Proposicoes => paginated("/proposicoes", ITENS_DESC_ID, project_proposicao),
            Self::ProposicoesSiglaTipo => nested_at(
                "/referencias/proposicoes/siglaTipo",
                "dados",
                project_sigla_tipo,
            ),
            Self::Orgaos => paginated("/orgaos", ITENS, project_orgao),
            Self::Eventos => paginated("/eventos", ITENS_DESC_INICIO, project_evento),
            Self::Blocos => paginated("/blocos", ITENS, project_bloco),
            Self::Grupos => paginated("/grupos", ITENS, project_grupo),
            Self::Votacoes => paginated("/votacoes", ITENS_DESC_REGISTRO, project_votacao),
            Self::SenadoBlocos => nested_at(
                "/composicao/lista/blocos",
                "ListaBlocoParlamentar.Blocos.Bloco",
                project_senado_bloco,
            ),
            Self::SenadoComissoesCodigo => nested_at(
                "/comissao/lista/colegiados",
                "ListaColegiados.Colegiados.Colegiado",
                project_senado_comissao_codigo,
            ),
            Self::SenadoComissoesSigla => nested_at(
                "/comissao/lista/colegiados",
                "ListaColegiados.Colegiados.Colegiado",
                project_senado_comissao_sigla,
            ),
            Self::SenadoPartidos => nested_at(
                "/composicao/lista/partidos",
                "ListaPartidos.Partidos.Partido",
                project_senado_partido,
            ),
            Self::SenadoParlamentar => nested_at(
                "/senador/lista/atual",
                "ListaParlamentarEmExercicio.Parlamentares.Parlamentar",
                project_senado_parlamentar,
            ),
        }
    }
}

fn paginated(
    endpoint: &'static str,
    params: &'static [(&'static str, &'static str)],
    project: Projection,
) -> EntitySpec {
    EntitySpec {
        endpoint,
        params,
        strategy: FetchStrategy::Paginated,
        project,
    }
}

fn nested_at(endpoint: &'static str, dotted: &str, project: Projection) -> EntitySpec {
    EntitySpec {
        endpoint,
        params: &[],
        strategy: FetchStrategy::Nested(Extraction::path(dotted)),
        project,
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.key() == s)
            .ok_or_else(|| Error::UnknownEntityType(s.to_string()))
    }
}

// =============================================================================
// CÂMARA PROJECTIONS
// =============================================================================

fn project_deputado(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(
        id_field(r, "id")?,
        format!(
            "{} ({}-{})",
            text_field(r, "nome"),
            text_field(r, "siglaPartido"),
            text_field(r, "siglaUf")
        ),
    ))
}

fn sigla_nome(r: &JsonValue) -> String {
    format!("{} - {}", text_field(r, "sigla"), text_field(r, "nome"))
}

fn project_partido(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "id")?, sigla_nome(r)))
}

fn project_partido_sigla(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "sigla")?, sigla_nome(r)))
}

fn project_frente(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "id")?, text_field(r, "titulo")))
}

fn project_legislatura(r: &JsonValue) -> Result<Suggestion> {
    let id = id_field(r, "id")?;
    let name = format!(
        "Legislatura {} ({}-{})",
        id,
        year_field(r, "dataInicio")?,
        year_field(r, "dataFim")?
    );
    Ok(Suggestion::new(id, name))
}

fn project_proposicao(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(
        id_field(r, "id")?,
        format!(
            "{} {}/{}",
            text_field(r, "siglaTipo"),
            text_field(r, "numero"),
            text_field(r, "ano")
        ),
    ))
}

fn project_sigla_tipo(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "sigla")?, sigla_nome(r)))
}

fn project_orgao(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "id")?, sigla_nome(r)))
}

fn project_evento(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(
        id_field(r, "id")?,
        format!(
            "{} - {}",
            br_date_field(r, "dataHoraInicio")?,
            text_field(r, "descricao")
        ),
    ))
}

fn project_bloco(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(
        id_field(r, "id")?,
        format!(
            "{} (Legislatura {})",
            text_field(r, "nome"),
            text_field(r, "idLegislatura")
        ),
    ))
}

fn project_grupo(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "id")?, text_field(r, "nome")))
}

fn project_votacao(r: &JsonValue) -> Result<Suggestion> {
    let descricao = text_field(r, "descricao");
    let descricao = if descricao.is_empty() {
        "Votação".to_string()
    } else {
        descricao
    };
    Ok(Suggestion::new(
        id_field(r, "id")?,
        format!("{} - {}", text_field(r, "data"), descricao),
    ))
}

// =============================================================================
// SENADO PROJECTIONS
// =============================================================================

fn project_senado_bloco(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(
        id_field(r, "CodigoBloco")?,
        text_field(r, "NomeBloco"),
    ))
}

fn nome_sigla(r: &JsonValue) -> String {
    format!("{} ({})", text_field(r, "Nome"), text_field(r, "Sigla"))
}

fn project_senado_comissao_codigo(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "Codigo")?, nome_sigla(r)))
}

fn project_senado_comissao_sigla(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(id_field(r, "Sigla")?, nome_sigla(r)))
}

fn project_senado_partido(r: &JsonValue) -> Result<Suggestion> {
    Ok(Suggestion::new(
        id_field(r, "Codigo")?,
        format!("{} - {}", text_field(r, "Sigla"), text_field(r, "Nome")),
    ))
}

fn project_senado_parlamentar(r: &JsonValue) -> Result<Suggestion> {
    let ident = nested(r, "IdentificacaoParlamentar")?;
    Ok(Suggestion::new(
        id_field(ident, "CodigoParlamentar")?,
        format!(
            "{} ({}-{})",
            text_field(ident, "NomeCompletoParlamentar"),
            text_field(ident, "SiglaPartidoParlamentar"),
            text_field(ident, "UfParlamentar")
        ),
    ))
}

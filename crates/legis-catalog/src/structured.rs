//! Structured answers to free-form questions about congressional data.
//!
//! An answering service is asked to reply with a JSON object matching
//! [`response_schema`]: a summary, a `dataType` and a `data` object whose
//! `text`, `table` or `chart` member carries the payload. This module builds
//! the request prompt, parses the reply into a [`QueryResult`] and renders
//! it as plain text.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use tracing::debug;

use legis_core::{Error, Result};

/// Presentation chosen by the answering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Text,
    Table,
    Chart,
}

impl DataType {
    pub const ALL: [DataType; 3] = [Self::Text, Self::Table, Self::Chart];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Table => "TABLE",
            Self::Chart => "CHART",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Shape(format!("unknown dataType: {}", s)))
    }
}

/// Table or chart cell: a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral values print without a trailing ".0".
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Bar chart: one bar per data point, labelled by `name_key` and sized by
/// `data_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub data_key: String,
    pub name_key: String,
    pub data: Vec<BTreeMap<String, Cell>>,
}

impl ChartData {
    /// `(label, value)` per data point. Points without a numeric value are
    /// skipped; a missing label renders as empty.
    pub fn bars(&self) -> Vec<(String, f64)> {
        self.data
            .iter()
            .filter_map(|point| {
                let value = point.get(&self.data_key)?.as_number()?;
                let label = point
                    .get(&self.name_key)
                    .map(Cell::to_string)
                    .unwrap_or_default();
                Some((label, value))
            })
            .collect()
    }

    /// Legend text for the value series, e.g. `totalGasto` → `Total Gasto`.
    pub fn series_label(&self) -> String {
        humanize_key(&self.data_key)
    }
}

fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Payload of an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dataType", content = "data", rename_all = "UPPERCASE")]
pub enum Answer {
    Text(String),
    Table(TableData),
    Chart(ChartData),
}

impl Answer {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Text(_) => DataType::Text,
            Self::Table(_) => DataType::Table,
            Self::Chart(_) => DataType::Chart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub summary: String,
    #[serde(flatten)]
    pub answer: Answer,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    summary: String,
    data_type: String,
    data: WireData,
}

#[derive(Deserialize)]
struct WireData {
    text: Option<String>,
    table: Option<TableData>,
    chart: Option<ChartData>,
}

/// Parse a reply into a [`QueryResult`], keeping only the branch named by
/// `dataType`.
pub fn parse_structured_response(raw: &str) -> Result<QueryResult> {
    let wire: WireResponse = serde_json::from_str(raw.trim())?;
    let data_type: DataType = wire.data_type.parse()?;
    debug!(data_type = %data_type, "Parsed structured response");

    let missing = || Error::Shape(format!("dataType is {} but data has no such member", data_type));
    let answer = match data_type {
        DataType::Text => Answer::Text(wire.data.text.ok_or_else(missing)?),
        DataType::Table => Answer::Table(wire.data.table.ok_or_else(missing)?),
        DataType::Chart => Answer::Chart(wire.data.chart.ok_or_else(missing)?),
    };

    Ok(QueryResult {
        summary: wire.summary,
        answer,
    })
}

/// Read a whole reply from `reader` and parse it.
pub fn read_structured_response<R: Read>(mut reader: R) -> Result<QueryResult> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    parse_structured_response(&raw)
}

/// JSON schema the answering service must follow.
pub fn response_schema() -> JsonValue {
    let cell = json!({"oneOf": [{"type": "string"}, {"type": "number"}]});
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "Um resumo conciso e informativo em português dos dados encontrados, explicando o que eles representam."
            },
            "dataType": {
                "type": "string",
                "enum": DataType::ALL.iter().map(DataType::as_str).collect::<Vec<_>>(),
                "description": "O formato mais apropriado para apresentar os dados. Use 'TABLE' para dados estruturados, 'CHART' para dados que podem ser visualizados em um gráfico de barras, e 'TEXT' para respostas descritivas."
            },
            "data": {
                "type": "object",
                "description": "O conteúdo dos dados. A estrutura deste objeto deve corresponder ao valor de 'dataType'.",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "O conteúdo textual da resposta (usado se dataType for 'TEXT').",
                        "nullable": true
                    },
                    "table": {
                        "type": "object",
                        "description": "Os dados da tabela (usado se dataType for 'TABLE').",
                        "properties": {
                            "headers": {"type": "array", "items": {"type": "string"}},
                            "rows": {"type": "array", "items": {"type": "array", "items": cell}}
                        },
                        "nullable": true
                    },
                    "chart": {
                        "type": "object",
                        "description": "Os dados para o gráfico (usado se dataType for 'CHART').",
                        "properties": {
                            "dataKey": {"type": "string", "description": "A chave para os valores numéricos (eixo Y)."},
                            "nameKey": {"type": "string", "description": "A chave para os rótulos (eixo X)."},
                            "data": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "description": "Objeto representando um ponto de dados, com chaves (strings) e valores (strings ou números).",
                                    "additionalProperties": cell
                                }
                            }
                        },
                        "nullable": true
                    }
                }
            }
        },
        "required": ["summary", "dataType", "data"]
    })
}

/// Instruction prompt for `question`.
pub fn build_prompt(question: &str) -> String {
    format!(
        "Você é um especialista em dados abertos do Congresso Nacional do Brasil \
(Câmara dos Deputados e Senado Federal). Sua tarefa é analisar a pergunta do usuário e \
retornar os dados da forma mais clara possível, com foco em projetos de lei, votações, \
despesas de parlamentares, presença, etc.

Pergunta do Usuário: \"{question}\"

Analise a pergunta e busque as informações relevantes. Em seguida, formate sua resposta \
estritamente como um objeto JSON que corresponda ao esquema fornecido. Escolha o 'dataType' \
mais adequado para a resposta:
- Se a resposta for puramente textual, use 'TEXT'.
- Se os dados forem tabulares, como uma lista de deputados e seus partidos, use 'TABLE'.
- Se os dados puderem ser visualizados em um gráfico de barras (comparação entre categorias, \
como gastos por partido), use 'CHART'.

Certifique-se de que os dados retornados no campo 'data' correspondam à estrutura esperada \
para o 'dataType' escolhido.",
        question = question.trim()
    )
}

// =============================================================================
// PLAIN-TEXT RENDERING
// =============================================================================

const BAR_WIDTH: usize = 40;

impl fmt::Display for TableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect();

        let mut widths = vec![0usize; columns];
        for line in std::iter::once(&self.headers).chain(rows.iter()) {
            for (i, text) in line.iter().enumerate() {
                widths[i] = widths[i].max(text.chars().count());
            }
        }

        write_row(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(f, &rule, &widths)?;
        for row in &rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(text.chars().count());
            format!("{}{}", text, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for ChartData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bars = self.bars();
        writeln!(f, "{}", self.series_label())?;

        let label_width = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let peak = bars.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
        for (label, value) in &bars {
            let len = if peak > 0.0 {
                ((value.abs() / peak) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let pad = label_width.saturating_sub(label.chars().count());
            writeln!(
                f,
                "{}{} | {} {}",
                label,
                " ".repeat(pad),
                "#".repeat(len),
                Cell::Number(*value)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        writeln!(f)?;
        match &self.answer {
            Answer::Text(text) => writeln!(f, "{}", text),
            Answer::Table(table) => write!(f, "{}", table),
            Answer::Chart(chart) => write!(f, "{}", chart),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_REPLY: &str = r#"
        {
          "summary": "Gastos por partido em 2024.",
          "dataType": "CHART",
          "data": {
            "text": null,
            "chart": {
              "dataKey": "totalGasto",
              "nameKey": "partido",
              "data": [
                {"partido": "PL", "totalGasto": 1200.5},
                {"partido": "PT", "totalGasto": 2401},
                {"partido": "MDB", "totalGasto": "n/d"}
              ]
            }
          }
        }
    "#;

    #[test]
    fn test_parse_chart_reply() {
        let result = parse_structured_response(CHART_REPLY).unwrap();
        assert_eq!(result.summary, "Gastos por partido em 2024.");
        assert_eq!(result.answer.data_type(), DataType::Chart);

        let Answer::Chart(chart) = result.answer else {
            panic!("expected chart");
        };
        assert_eq!(
            chart.bars(),
            vec![("PL".to_string(), 1200.5), ("PT".to_string(), 2401.0)]
        );
        assert_eq!(chart.series_label(), "Total Gasto");
    }

    #[test]
    fn test_parse_text_reply_ignores_other_branches() {
        let raw = r#"{"summary": "s", "dataType": "TEXT",
            "data": {"text": "O PL 2630/2020 trata de...", "table": {"headers": [], "rows": []}}}"#;
        let result = parse_structured_response(raw).unwrap();
        assert_eq!(
            result.answer,
            Answer::Text("O PL 2630/2020 trata de...".to_string())
        );
    }

    #[test]
    fn test_parse_table_reply_with_mixed_cells() {
        let raw = r#"{"summary": "Deputados", "dataType": "TABLE", "data": {"table": {
            "headers": ["Nome", "Partido", "Votos"],
            "rows": [["Fulana", "PSB", 120345], ["Beltrano", "MDB", 98000.5]]}}}"#;
        let result = parse_structured_response(raw).unwrap();
        let Answer::Table(table) = result.answer else {
            panic!("expected table");
        };
        assert_eq!(table.rows[0][2], Cell::Number(120345.0));
        assert_eq!(table.rows[1][1], Cell::Text("MDB".to_string()));
    }

    #[test]
    fn test_unknown_data_type_is_shape_error() {
        let raw = r#"{"summary": "s", "dataType": "MAP", "data": {}}"#;
        let err = parse_structured_response(raw).unwrap_err();
        assert!(matches!(err, Error::Shape(ref m) if m.contains("MAP")));
    }

    #[test]
    fn test_missing_branch_is_shape_error() {
        let raw = r#"{"summary": "s", "dataType": "TABLE", "data": {"text": "x"}}"#;
        assert!(matches!(
            parse_structured_response(raw),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        assert!(matches!(
            parse_structured_response("não é json"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_read_reply_from_reader() {
        let result = read_structured_response(std::io::Cursor::new(CHART_REPLY)).unwrap();
        assert_eq!(result.answer.data_type(), DataType::Chart);
    }

    #[test]
    fn test_read_failure_is_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
        }
        assert!(matches!(read_structured_response(Broken), Err(Error::Io(_))));
    }

    #[test]
    fn test_read_invalid_utf8_is_io_error() {
        let bytes: &[u8] = &[0x7b, 0xff, 0x7d];
        assert!(matches!(read_structured_response(bytes), Err(Error::Io(_))));
    }

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("totalGasto"), "Total Gasto");
        assert_eq!(humanize_key("valor"), "Valor");
        assert_eq!(humanize_key("numeroDeVotos"), "Numero De Votos");
        assert_eq!(humanize_key(""), "");
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(42.0).to_string(), "42");
        assert_eq!(Cell::Number(1.5).to_string(), "1.5");
        assert_eq!(Cell::Text("PL".into()).to_string(), "PL");
    }

    #[test]
    fn test_schema_lists_data_types() {
        let schema = response_schema();
        assert_eq!(
            schema["properties"]["dataType"]["enum"],
            json!(["TEXT", "TABLE", "CHART"])
        );
        assert_eq!(schema["required"], json!(["summary", "dataType", "data"]));
    }

    #[test]
    fn test_prompt_embeds_question() {
        let prompt = build_prompt("  Quais deputados mais gastaram?  ");
        assert!(prompt.contains("Pergunta do Usuário: \"Quais deputados mais gastaram?\""));
        assert!(prompt.contains("'CHART'"));
    }

    #[test]
    fn test_table_renders_aligned() {
        let table = TableData {
            headers: vec!["Sigla".into(), "Nome".into()],
            rows: vec![
                vec![Cell::Text("PL".into()), Cell::Text("Partido Liberal".into())],
                vec![Cell::Text("MDB".into()), Cell::Number(3.0)],
            ],
        };
        assert_eq!(
            table.to_string(),
            "Sigla | Nome\n----- | ---------------\nPL    | Partido Liberal\nMDB   | 3\n"
        );
    }

    #[test]
    fn test_chart_renders_bars_scaled_to_peak() {
        let chart = ChartData {
            data_key: "votos".into(),
            name_key: "uf".into(),
            data: vec![
                BTreeMap::from([("uf".into(), Cell::Text("SP".into())), ("votos".into(), Cell::Number(40.0))]),
                BTreeMap::from([("uf".into(), Cell::Text("AC".into())), ("votos".into(), Cell::Number(10.0))]),
            ],
        };
        let rendered = chart.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "Votos");
        assert_eq!(lines[1], format!("SP | {} 40", "#".repeat(BAR_WIDTH)));
        assert_eq!(lines[2], format!("AC | {} 10", "#".repeat(BAR_WIDTH / 4)));
    }

    #[test]
    fn test_query_result_serializes_wire_names() {
        let result = QueryResult {
            summary: "s".into(),
            answer: Answer::Text("t".into()),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"summary": "s", "dataType": "TEXT", "data": "t"})
        );
    }
}

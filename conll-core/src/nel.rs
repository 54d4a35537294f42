//! # Índice de Linking (Named Entity Linking)
//!
//! Na variante com linking, cada arquivo CoNLL tem um arquivo paralelo que liga
//! menções a uma Base de Conhecimento (YAGO2 / Wikipedia / Freebase). O arquivo
//! usa o mesmo marcador de documento e uma linha por menção, chaveada pelo
//! índice do primeiro token da menção dentro do documento:
//!
//! ```text
//! -DOCSTART- (1 EU)
//! 0	--NME--
//! 2	Germany	http://en.wikipedia.org/wiki/Germany	11867	/m/0345h
//! ```
//!
//! `--NME--` indica que não há entidade correspondente. Aqui as linhas são
//! apenas indexadas; quem interpreta as colunas é o construtor de spans
//! ([`crate::tagger`]) no momento em que fecha uma menção.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Linha bruta do arquivo de linking, guardada como veio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    /// Número da linha (1-based) no arquivo de linking.
    pub line: usize,
    pub text: String,
}

/// Resultado de uma consulta ao índice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkLookup {
    /// A linha existia e foi removida do índice.
    Consumed(LinkRow),
    /// Nenhuma linha para este índice de token.
    Absent,
}

/// Mapa índice-de-token → linha de linking de um único documento.
///
/// Cada entrada é consumida no máximo uma vez; o que sobra ao final do
/// documento são linhas sem menção correspondente.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkingRecord {
    doc_id: Option<String>,
    rows: BTreeMap<usize, LinkRow>,
}

impl LinkingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identificador do documento, quando o marcador traz `(<docid>)`.
    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    pub fn insert(&mut self, token_index: usize, row: LinkRow) {
        self.rows.insert(token_index, row);
    }

    /// Remove e retorna a linha do token, se existir.
    pub fn take(&mut self, token_index: usize) -> LinkLookup {
        match self.rows.remove(&token_index) {
            Some(row) => LinkLookup::Consumed(row),
            None => LinkLookup::Absent,
        }
    }

    /// Índices ainda não consumidos, em ordem crescente.
    pub fn remaining(&self) -> Vec<usize> {
        self.rows.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ligação de uma menção com a Base de Conhecimento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiLink {
    /// Entidade YAGO2 (ex: "Germany").
    pub target: String,
    /// URL da Wikipedia.
    pub url: String,
    /// ID numérico da página na Wikipedia.
    pub numeric_id: u64,
    /// MID do Freebase (5ª coluna, opcional).
    pub freebase_id: Option<String>,
}

impl WikiLink {
    /// Interpreta uma linha de linking.
    ///
    /// Linhas com menos de 4 colunas (ex: `9 --NME--`) não carregam ligação e
    /// retornam `Ok(None)`. Um ID numérico inválido é erro.
    pub fn from_row(row: &LinkRow) -> Result<Option<Self>> {
        let parts: Vec<&str> = row.text.split_whitespace().collect();
        if parts.len() < 4 {
            return Ok(None);
        }
        let numeric_id = parts[3].parse::<u64>().map_err(|_| Error::Linking {
            line: row.line,
            message: format!("ID numérico inválido '{}'", parts[3]),
        })?;
        Ok(Some(Self {
            target: parts[1].to_string(),
            url: parts[2].to_string(),
            numeric_id,
            freebase_id: parts.get(4).map(|s| s.to_string()),
        }))
    }
}

fn doc_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("regex de docid válida"))
}

/// Extrai `<docid>` de uma linha como `-DOCSTART- (1 EU)`.
pub fn parse_doc_id(line: &str) -> Option<String> {
    doc_id_pattern()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lê o arquivo de linking um documento por vez, em sincronia com o leitor
/// principal.
pub struct LinkingReader<R> {
    lines: std::io::Lines<R>,
    marker: String,
    line_no: usize,
    next_doc_id: Option<String>,
}

impl<R: BufRead> LinkingReader<R> {
    pub fn new(source: R, marker: impl Into<String>) -> Self {
        Self {
            lines: source.lines(),
            marker: marker.into(),
            line_no: 0,
            next_doc_id: None,
        }
    }

    /// Consome linhas até o marcador do *próximo* documento (com o mapa já
    /// não vazio) ou até o fim do arquivo.
    ///
    /// Um marcador encontrado com o mapa ainda vazio é apenas pulado, então um
    /// documento sem nenhuma linha de linking herda as linhas do seguinte.
    pub fn next_document(&mut self) -> Result<LinkingRecord> {
        let mut record = LinkingRecord {
            doc_id: self.next_doc_id.take(),
            rows: BTreeMap::new(),
        };

        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;

            if line.contains(&self.marker) {
                let doc_id = parse_doc_id(&line);
                if !record.is_empty() {
                    self.next_doc_id = doc_id;
                    return Ok(record);
                }
                if doc_id.is_some() {
                    record.doc_id = doc_id;
                }
                continue;
            }

            let trimmed = line.trim();
            let Some(first) = trimmed.split_whitespace().next() else {
                continue;
            };
            let token_index = first.parse::<usize>().map_err(|_| Error::Linking {
                line: self.line_no,
                message: format!("índice de token inválido '{first}'"),
            })?;
            record.insert(
                token_index,
                LinkRow {
                    line: self.line_no,
                    text: trimmed.to_string(),
                },
            );
        }

        Ok(record)
    }
}

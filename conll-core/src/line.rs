//! # Parser de Linhas (formato em colunas)
//!
//! Cada linha de token de um arquivo CoNLL é uma sequência de colunas separadas
//! por espaço em branco. O significado de cada coluna vem de fora, via
//! [`ColumnLayout`]:
//!
//! ```text
//! EU NNP B-NP B-ORG        layout: [word, -, -, entity_label]
//! ^^             ^^^^^
//! word           entity_label
//! ```
//!
//! O layout é validado uma única vez (na inicialização do leitor). O parse por
//! linha não confere o número de colunas: colunas sobrando são ignoradas e
//! colunas faltando ficam ausentes no [`ParsedLine`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Campos que uma coluna pode carregar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// A palavra (token) em si.
    Word,
    /// O rótulo IOB da entidade (ex: "B-ORG", "I-PER", "O").
    EntityLabel,
}

impl Field {
    /// Campos que todo layout precisa declarar.
    pub const REQUIRED: [Field; 2] = [Field::Word, Field::EntityLabel];

    /// Nome do campo como aparece na configuração.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Word => "word",
            Field::EntityLabel => "entity_label",
        }
    }

    /// Tenta parsear a partir do nome (ex: "word" → Some(Word))
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "word" => Some(Field::Word),
            "entity_label" => Some(Field::EntityLabel),
            _ => None,
        }
    }
}

/// Layout validado: uma entrada por coluna, `None` = coluna ignorada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Option<Field>>,
}

impl ColumnLayout {
    /// Valida um layout vindo da configuração.
    ///
    /// Falha se algum nome não for suportado, se houver nome repetido
    /// ou se faltar algum campo de [`Field::REQUIRED`].
    pub fn new<S: AsRef<str>>(columns: &[Option<S>]) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::config("column_layout não fornecido"));
        }

        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(columns.len());
        for column in columns {
            let Some(name) = column else {
                validated.push(None);
                continue;
            };
            let name = name.as_ref();
            let field = Field::from_name(name)
                .ok_or_else(|| Error::config(format!("campo não suportado: '{name}'")))?;
            if !seen.insert(field) {
                return Err(Error::config(format!("campo duplicado: '{name}'")));
            }
            validated.push(Some(field));
        }

        for required in Field::REQUIRED {
            if !seen.contains(&required) {
                return Err(Error::config(format!(
                    "o campo '{}' é obrigatório",
                    required.name()
                )));
            }
        }

        Ok(Self { columns: validated })
    }

    /// Número de colunas declaradas (incluindo as ignoradas).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Posição da coluna que carrega `field`.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.columns.iter().position(|c| *c == Some(field))
    }

    /// Divide a linha por espaço em branco e associa cada parte à sua coluna.
    pub fn parse_line<'a>(&self, line: &'a str) -> ParsedLine<'a> {
        let mut parsed = ParsedLine::default();
        for (column, part) in self.columns.iter().zip(line.split_whitespace()) {
            match column {
                Some(Field::Word) => parsed.word = Some(part),
                Some(Field::EntityLabel) => parsed.entity_label = Some(part),
                None => {}
            }
        }
        parsed
    }
}

/// Campos extraídos de uma linha de token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub word: Option<&'a str>,
    pub entity_label: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(cols: &[Option<&str>]) -> Result<ColumnLayout> {
        ColumnLayout::new(cols)
    }

    #[test]
    fn test_parse_conll03_line() {
        let l = layout(&[Some("word"), None, None, Some("entity_label")]).unwrap();
        let parsed = l.parse_line("EU NNP B-NP B-ORG");
        assert_eq!(parsed.word, Some("EU"));
        assert_eq!(parsed.entity_label, Some("B-ORG"));
    }

    #[test]
    fn test_missing_columns_are_absent() {
        let l = layout(&[Some("word"), None, None, Some("entity_label")]).unwrap();
        let parsed = l.parse_line("EU NNP");
        assert_eq!(parsed.word, Some("EU"));
        assert_eq!(parsed.entity_label, None);
    }

    #[test]
    fn test_extra_columns_are_truncated() {
        let l = layout(&[Some("word"), Some("entity_label")]).unwrap();
        let parsed = l.parse_line("Brasil\tB-LOC\textra\tcolunas");
        assert_eq!(parsed.word, Some("Brasil"));
        assert_eq!(parsed.entity_label, Some("B-LOC"));
    }

    #[test]
    fn test_word_can_be_missing() {
        let l = layout(&[None, Some("entity_label"), Some("word")]).unwrap();
        let parsed = l.parse_line("x O");
        assert_eq!(parsed.word, None);
        assert_eq!(parsed.entity_label, Some("O"));
    }

    #[test]
    fn test_layout_rejects_unsupported_field() {
        let err = layout(&[Some("word"), Some("pos"), Some("entity_label")]).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("pos"));
    }

    #[test]
    fn test_layout_rejects_duplicate_field() {
        let err = layout(&[Some("word"), Some("word"), Some("entity_label")]).unwrap_err();
        assert!(err.to_string().contains("duplicado"));
    }

    #[test]
    fn test_layout_requires_entity_label() {
        let err = layout(&[Some("word"), None]).unwrap_err();
        assert!(err.to_string().contains("entity_label"));
    }

    #[test]
    fn test_layout_rejects_empty() {
        assert!(layout(&[]).unwrap_err().is_config());
    }

    #[test]
    fn test_position() {
        let l = layout(&[Some("word"), None, None, Some("entity_label")]).unwrap();
        assert_eq!(l.position(Field::Word), Some(0));
        assert_eq!(l.position(Field::EntityLabel), Some(3));
        assert_eq!(l.len(), 4);
    }
}

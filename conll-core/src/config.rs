//! # Configuração do Leitor
//!
//! Todas as opções são serializáveis (JSON) e têm valores padrão, então um
//! arquivo de configuração precisa declarar apenas o que muda:
//!
//! ```json
//! {
//!   "document_break_marker": "-DOCSTART-",
//!   "column_layout": ["word", null, null, "entity_label"]
//! }
//! ```
//!
//! A validação acontece uma única vez, em [`ReaderConfig::validate`], antes de
//! qualquer linha ser lida.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::line::ColumnLayout;
use crate::tagger::BoundaryPolicy;

/// Marcador de documento dos arquivos CoNLL-2003.
pub const CONLL03_DOCSTART: &str = "-DOCSTART-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Extensão dos arquivos de dados (ex: ".txt", ".conll").
    pub file_extension: String,
    /// Substring que, presente numa linha, encerra o documento atual.
    pub document_break_marker: Option<String>,
    /// Número de sentenças por documento (0 ou ausente = sem limite).
    pub sentences_per_document: Option<usize>,
    /// Campo de cada coluna; `null` ignora a coluna.
    pub column_layout: Vec<Option<String>>,
    /// Ativa a leitura do arquivo de linking pareado.
    pub entity_linking: bool,
    /// Sufixo do arquivo de linking, trocado pela extensão do arquivo de dados.
    pub linking_suffix: String,
    /// Fronteira das menções; ausente = padrão da variante.
    pub boundary_policy: Option<BoundaryPolicy>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            file_extension: ".txt".to_string(),
            document_break_marker: None,
            sentences_per_document: None,
            column_layout: vec![Some("word".to_string()), Some("entity_label".to_string())],
            entity_linking: false,
            linking_suffix: ".link.tsv".to_string(),
            boundary_policy: None,
        }
    }
}

impl ReaderConfig {
    /// Formato CoNLL-2003: `word POS chunk NER`, documentos separados por `-DOCSTART-`.
    pub fn conll03() -> Self {
        Self {
            document_break_marker: Some(CONLL03_DOCSTART.to_string()),
            column_layout: vec![
                Some("word".to_string()),
                None,
                None,
                Some("entity_label".to_string()),
            ],
            ..Self::default()
        }
    }

    /// CoNLL-2003 com as anotações AIDA de linking (`<arquivo>.link.tsv`).
    pub fn conll03_aida() -> Self {
        Self {
            entity_linking: true,
            ..Self::conll03()
        }
    }

    /// Carrega a configuração de um arquivo JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::config(format!("{}: {e}", path.as_ref().display()))
        })
    }

    /// Marcador efetivo (string vazia conta como ausente).
    pub fn marker(&self) -> Option<&str> {
        self.document_break_marker
            .as_deref()
            .filter(|m| !m.is_empty())
    }

    /// Limite efetivo de sentenças por documento.
    pub fn sentence_limit(&self) -> Option<usize> {
        self.sentences_per_document.filter(|n| *n > 0)
    }

    /// Política de fronteira efetiva: a configurada, ou a padrão da variante.
    pub fn effective_policy(&self) -> BoundaryPolicy {
        self.boundary_policy.unwrap_or(if self.entity_linking {
            BoundaryPolicy::ExactBoundary
        } else {
            BoundaryPolicy::TrimSeparator
        })
    }

    /// Valida a configuração e devolve o layout de colunas pronto para uso.
    pub fn validate(&self) -> Result<ColumnLayout> {
        if self.marker().is_none() && self.sentence_limit().is_none() {
            return Err(Error::config(
                "informe document_break_marker ou um sentences_per_document positivo",
            ));
        }
        if self.entity_linking && self.marker().is_none() {
            return Err(Error::config(
                "entity_linking exige document_break_marker para alinhar o arquivo de linking",
            ));
        }
        ColumnLayout::new(self.column_layout.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_needs_a_document_boundary() {
        let err = ReaderConfig::default().validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_sentence_limit_alone_is_enough() {
        let config = ReaderConfig {
            sentences_per_document: Some(10),
            ..ReaderConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sentences_and_empty_marker_are_absent() {
        let config = ReaderConfig {
            sentences_per_document: Some(0),
            document_break_marker: Some(String::new()),
            ..ReaderConfig::default()
        };
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_linking_requires_marker() {
        let config = ReaderConfig {
            entity_linking: true,
            sentences_per_document: Some(5),
            ..ReaderConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("entity_linking"));
    }

    #[test]
    fn test_presets() {
        let layout = ReaderConfig::conll03().validate().unwrap();
        assert_eq!(layout.len(), 4);
        assert_eq!(ReaderConfig::conll03().effective_policy(), BoundaryPolicy::TrimSeparator);
        assert_eq!(ReaderConfig::conll03_aida().effective_policy(), BoundaryPolicy::ExactBoundary);
    }

    #[test]
    fn test_explicit_policy_wins() {
        let config = ReaderConfig {
            boundary_policy: Some(BoundaryPolicy::ExactBoundary),
            ..ReaderConfig::conll03()
        };
        assert_eq!(config.effective_policy(), BoundaryPolicy::ExactBoundary);
    }

    #[test]
    fn test_json_with_null_columns() {
        let config: ReaderConfig = serde_json::from_str(
            r#"{"document_break_marker": "-DOCSTART-",
                "column_layout": ["word", null, null, "entity_label"],
                "boundary_policy": "exact_boundary"}"#,
        )
        .unwrap();
        assert_eq!(config, ReaderConfig {
            boundary_policy: Some(BoundaryPolicy::ExactBoundary),
            ..ReaderConfig::conll03()
        });
    }

    #[test]
    fn test_json_unsupported_field_fails_validation() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{"sentences_per_document": 2, "column_layout": ["word", "lemma"]}"#)
                .unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("lemma"));
    }
}

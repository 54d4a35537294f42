//! # Erros do Leitor CoNLL
//!
//! Três famílias de falha, todas fatais para o arquivo corrente:
//!
//! | Família        | Quando ocorre                         | Variantes                                    |
//! |----------------|---------------------------------------|----------------------------------------------|
//! | Configuração   | Em `ConllReader::new`, antes da leitura | [`Error::Config`]                          |
//! | Estrutural     | No meio do parse                      | [`Error::MissingWord`], [`Error::UnrecognizedLabel`], [`Error::Linking`] |
//! | Entrada/Saída  | Abertura ou leitura de arquivos       | [`Error::Io`]                                |
//!
//! Avisos de qualidade de dados (ex: arquivo de linking ausente) não são erros:
//! vão para o log via `tracing::warn!` e o processamento continua.

use thiserror::Error;

/// Resultado padrão das operações do leitor.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Configuração inválida (layout de colunas, marcador de documento, etc.).
    #[error("Configuração inválida: {0}")]
    Config(String),

    /// Linha de token sem a coluna `word`.
    #[error("Linha {line}: registro sem o campo 'word'")]
    MissingWord { line: usize },

    /// Rótulo fora do esquema IOB (ex: `E-PER`, `ORG`, `B-`).
    #[error("Linha {line}: rótulo IOB não reconhecido '{label}'")]
    UnrecognizedLabel { line: usize, label: String },

    /// Linha malformada no arquivo de linking.
    #[error("Arquivo de linking, linha {line}: {message}")]
    Linking { line: usize, message: String },

    #[error("Erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Atalho para erros de configuração.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Verdadeiro para erros detectados antes da leitura de qualquer linha.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

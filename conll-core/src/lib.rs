//! # conll-core: Leitor de Corpora CoNLL com Rótulos IOB
//!
//! Este crate lê arquivos no formato em colunas do CoNLL (um token por linha,
//! sentenças separadas por linha em branco) e reconstrói, para cada documento,
//! o texto completo e as anotações derivadas: tokens, sentenças e menções de
//! entidade. Na variante com linking, cada menção também recebe a sua ligação
//! com a Base de Conhecimento, lida de um arquivo paralelo.
//!
//! ## Arquitetura
//!
//! O dado flui em uma única passada, linha a linha:
//!
//! 1.  **Linha bruta** → [`line`]: separa colunas segundo o layout configurado.
//! 2.  **Offsets** ([`offset`]): cada palavra ganha um span `[begin, end)` no texto final.
//! 3.  **Menções** ([`tagger`]): a máquina de estados IOB fecha spans de entidade.
//! 4.  **Linking** ([`nel`]): ao fechar uma menção, consulta o índice do documento.
//! 5.  **Documentos** ([`segmenter`]): detecta fronteiras e entrega cada documento
//!     a um [`AnnotationStore`] (por padrão, [`DocumentPack`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use conll_core::{ConllReader, ReaderConfig};
//!
//! let reader = ConllReader::new(ReaderConfig::conll03()).unwrap();
//! let docs: Vec<_> = reader
//!     .parse("EU NNP B-NP B-ORG\nrejects VBZ B-VP O\n".as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(docs[0].text, "EU rejects");
//! assert_eq!(docs[0].entity_mentions[0].ner_type, "ORG");
//! ```

pub mod config;
pub mod error;
pub mod line;
pub mod nel;
pub mod offset;
pub mod reader;
pub mod segmenter;
pub mod store;
pub mod tagger;

pub use config::ReaderConfig;
pub use error::{Error, Result};
pub use nel::{LinkingRecord, WikiLink};
pub use offset::Span;
pub use reader::ConllReader;
pub use segmenter::DocumentStream;
pub use store::{AnnotationStore, DocumentPack};
pub use tagger::{BoundaryPolicy, EntityMention, IobLabel};

//! # Leitor CoNLL
//!
//! Ponto de entrada da biblioteca. Valida a configuração uma vez e depois abre
//! arquivos (ou qualquer `BufRead`) como sequências preguiçosas de documentos.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use conll_core::{ConllReader, ReaderConfig};
//!
//! let reader = ConllReader::new(ReaderConfig::conll03()).unwrap();
//! let input = "EU NNP B-NP B-ORG\nrejects VBZ B-VP O\n";
//!
//! for doc in reader.parse(input.as_bytes()) {
//!     let doc = doc.unwrap();
//!     for mention in &doc.entity_mentions {
//!         println!("{} ({})", doc.covered_text(&mention.span()).unwrap(), mention.ner_type);
//!     }
//! }
//! ```
//!
//! ## Variante com linking
//!
//! Com `entity_linking = true`, [`ConllReader::read_file`] procura o arquivo
//! pareado `<nome sem extensão><linking_suffix>` (ex: `eng.train.txt` →
//! `eng.train.link.tsv`). Se ele não existir, os documentos saem sem links e um
//! aviso vai para o log.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::line::ColumnLayout;
use crate::nel::LinkingReader;
use crate::segmenter::{DocumentStream, Segmentation};
use crate::store::{AnnotationStore, DocumentPack};

pub struct ConllReader {
    config: ReaderConfig,
    layout: ColumnLayout,
}

impl ConllReader {
    /// Cria o leitor; todos os erros de configuração aparecem aqui.
    pub fn new(config: ReaderConfig) -> Result<Self> {
        let layout = config.validate()?;
        Ok(Self { config, layout })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn segmentation(&self) -> Segmentation {
        Segmentation {
            marker: self.config.marker().map(str::to_string),
            sentence_limit: self.config.sentence_limit(),
            policy: self.config.effective_policy(),
        }
    }

    /// Documentos de uma fonte sem linking.
    pub fn parse<R: BufRead>(&self, source: R) -> DocumentStream<R> {
        self.parse_into(source, None)
    }

    /// Documentos de uma fonte com o seu arquivo de linking.
    pub fn parse_linked<R: BufRead>(&self, source: R, links: R) -> Result<DocumentStream<R>> {
        let marker = self.config.marker().ok_or_else(|| {
            Error::config("o arquivo de linking só pode ser alinhado com document_break_marker")
        })?;
        Ok(self.parse_into(source, Some(LinkingReader::new(links, marker))))
    }

    /// Como [`ConllReader::parse`], mas entregando as anotações a outro
    /// [`AnnotationStore`].
    pub fn parse_into<R: BufRead, S: AnnotationStore + Default>(
        &self,
        source: R,
        links: Option<LinkingReader<R>>,
    ) -> DocumentStream<R, S> {
        DocumentStream::new(source, self.layout.clone(), self.segmentation(), links)
    }

    /// Caminho do arquivo de linking pareado com `path`.
    pub fn linking_path(&self, path: &Path) -> PathBuf {
        let mut linked = path.with_extension("").into_os_string();
        linked.push(&self.config.linking_suffix);
        PathBuf::from(linked)
    }

    /// Abre um arquivo de dados (e o de linking, se a variante pedir).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<DocumentStream<BufReader<File>>> {
        let path = path.as_ref();
        let source = BufReader::new(File::open(path)?);

        if !self.config.entity_linking {
            return Ok(self.parse(source));
        }

        let link_path = self.linking_path(path);
        match File::open(&link_path) {
            Ok(file) => self.parse_linked(source, BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    file = %path.display(),
                    linking = %link_path.display(),
                    "arquivo de linking não encontrado; documentos sairão sem links"
                );
                Ok(self.parse(source))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Arquivos de dados sob `dir` (recursivo, ordenados por nome).
    pub fn collect(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        info!("Lendo arquivos '{}' de {}", self.config.file_extension, dir.display());

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !name.ends_with(&self.config.file_extension) {
                continue;
            }
            if self.config.entity_linking && name.ends_with(&self.config.linking_suffix) {
                continue;
            }
            files.push(entry.into_path());
        }
        Ok(files)
    }

    /// Todos os documentos de todos os arquivos de `dir`, arquivo por arquivo.
    ///
    /// Um erro fatal interrompe apenas o arquivo em que ocorreu.
    pub fn read_dataset(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<impl Iterator<Item = Result<DocumentPack>> + '_> {
        let files = self.collect(dir)?;
        Ok(files.into_iter().flat_map(move |path| {
            let docs: Box<dyn Iterator<Item = Result<DocumentPack>>> = match self.read_file(&path) {
                Ok(stream) => Box::new(stream),
                Err(e) => Box::new(std::iter::once(Err(e))),
            };
            docs
        }))
    }

    /// Chave de cache de um arquivo: o nome, sem diretórios.
    pub fn cache_key(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

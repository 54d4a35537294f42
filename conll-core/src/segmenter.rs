//! # Segmentador de Documentos
//!
//! Percorre o arquivo CoNLL linha a linha e entrega documentos completos, um
//! por vez, como um iterador preguiçoso.
//!
//! ## Fronteiras
//!
//! | Linha                         | Efeito                                                   |
//! |-------------------------------|----------------------------------------------------------|
//! | contém o marcador             | fecha o documento (se houver palavras)                   |
//! | em branco                     | fecha a sentença (se houver tokens desde a última)       |
//! | começa com `#`                | ignorada                                                 |
//! | qualquer outra                | token: offset, token, rótulo IOB → construtor de menções |
//! | fim do arquivo                | fecha sentença e documento pendentes                     |
//!
//! Com `sentences_per_document`, o documento também fecha logo após a n-ésima
//! sentença.
//!
//! Todo o estado de um documento (buffer, span aberto, mapa de linking,
//! contadores) vive em um `DocumentContext`, criado no primeiro token e
//! descartado quando o documento é entregue.

use std::io::BufRead;

use tracing::debug;

use crate::error::{Error, Result};
use crate::line::ColumnLayout;
use crate::nel::{LinkingReader, LinkingRecord};
use crate::offset::DocumentBuffer;
use crate::store::{AnnotationStore, DocumentPack};
use crate::tagger::{BoundaryPolicy, IobLabel, SpanBuilder};

/// Regras de fronteira de documento e de menção.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub marker: Option<String>,
    pub sentence_limit: Option<usize>,
    pub policy: BoundaryPolicy,
}

/// Estado de um único documento em construção.
struct DocumentContext<S> {
    store: S,
    buffer: DocumentBuffer,
    spans: SpanBuilder,
    links: Option<LinkingRecord>,
    sentence_begin: usize,
    has_rows: bool,
    sentences: usize,
    mentions: usize,
}

impl<S: AnnotationStore + Default> DocumentContext<S> {
    fn new(policy: BoundaryPolicy, links: Option<LinkingRecord>) -> Self {
        Self {
            store: S::default(),
            buffer: DocumentBuffer::new(),
            spans: SpanBuilder::new(policy),
            links,
            sentence_begin: 0,
            has_rows: false,
            sentences: 0,
            mentions: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn add_token(&mut self, word: &str, label: Option<&IobLabel>) -> Result<()> {
        let token_index = self.buffer.word_count();
        let span = self.buffer.push(word);
        self.store.create_token(span.begin, span.end);

        if let Some(closed) = self.spans.observe(label, span.begin, token_index, false) {
            let mention = closed.into_mention(self.links.as_mut())?;
            self.store.create_entity_mention(mention);
            self.mentions += 1;
        }

        self.has_rows = true;
        Ok(())
    }

    /// Fecha a sentença corrente; retorna `false` se não havia tokens nela.
    fn close_sentence(&mut self) -> bool {
        if !self.has_rows {
            return false;
        }
        let end = self.buffer.text_len();
        self.store.create_sentence(self.sentence_begin, end);
        self.sentence_begin = self.buffer.cursor();
        self.has_rows = false;
        self.sentences += 1;
        true
    }

    /// Fecha tudo o que estiver aberto e entrega o documento.
    fn finalize(mut self) -> Result<Option<S>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.close_sentence();

        let text_len = self.buffer.text_len();
        if let Some(closed) = self.spans.finish(text_len) {
            let mention = closed.into_mention(self.links.as_mut())?;
            self.store.create_entity_mention(mention);
            self.mentions += 1;
        }

        if let Some(links) = self.links {
            if let Some(doc_id) = links.doc_id() {
                self.store.set_name(doc_id.to_string());
            }
            let unmatched = links.remaining();
            if !unmatched.is_empty() {
                debug!(?unmatched, "linhas de linking sem menção correspondente");
                self.store.set_unmatched_links(unmatched);
            }
        }

        debug!(
            words = self.buffer.word_count(),
            sentences = self.sentences,
            mentions = self.mentions,
            "documento finalizado"
        );

        let text = self.buffer.into_text();
        let len = text.len();
        self.store.set_document_text(text);
        self.store.create_document(0, len);
        Ok(Some(self.store))
    }
}

/// Sequência preguiçosa de documentos de um arquivo CoNLL.
///
/// Um erro fatal é entregue uma única vez; depois o iterador termina.
pub struct DocumentStream<R, S = DocumentPack> {
    lines: std::io::Lines<R>,
    line_no: usize,
    layout: ColumnLayout,
    segmentation: Segmentation,
    linking: Option<LinkingReader<R>>,
    context: Option<DocumentContext<S>>,
    done: bool,
}

impl<R: BufRead, S: AnnotationStore + Default> DocumentStream<R, S> {
    pub fn new(
        source: R,
        layout: ColumnLayout,
        segmentation: Segmentation,
        linking: Option<LinkingReader<R>>,
    ) -> Self {
        Self {
            lines: source.lines(),
            line_no: 0,
            layout,
            segmentation,
            linking,
            context: None,
            done: false,
        }
    }

    /// Lê até completar o próximo documento.
    fn advance(&mut self) -> Result<Option<S>> {
        while let Some(line) = self.lines.next() {
            let line = line?;
            self.line_no += 1;
            if let Some(doc) = self.process_line(&line)? {
                return Ok(Some(doc));
            }
        }
        self.finish_document()
    }

    fn process_line(&mut self, line: &str) -> Result<Option<S>> {
        let line = line.trim();

        if line.is_empty() {
            let limit_reached = match self.context.as_mut() {
                Some(ctx) => {
                    ctx.close_sentence()
                        && self
                            .segmentation
                            .sentence_limit
                            .is_some_and(|n| ctx.sentences >= n)
                }
                None => false,
            };
            return if limit_reached {
                self.finish_document()
            } else {
                Ok(None)
            };
        }

        if self
            .segmentation
            .marker
            .as_deref()
            .is_some_and(|m| line.contains(m))
        {
            // Marcador sem palavras acumuladas: nada a emitir.
            return self.finish_document();
        }

        if line.starts_with('#') {
            return Ok(None);
        }

        let parsed = self.layout.parse_line(line);
        let word = parsed.word.ok_or(Error::MissingWord { line: self.line_no })?;
        let label = parsed
            .entity_label
            .map(|l| {
                IobLabel::parse(l).ok_or_else(|| Error::UnrecognizedLabel {
                    line: self.line_no,
                    label: l.to_string(),
                })
            })
            .transpose()?;

        self.context_mut()?.add_token(word, label.as_ref())?;
        Ok(None)
    }

    /// Contexto do documento atual, criado (e com o linking carregado) no
    /// primeiro token.
    fn context_mut(&mut self) -> Result<&mut DocumentContext<S>> {
        let ctx = match self.context.take() {
            Some(ctx) => ctx,
            None => {
                let links = match self.linking.as_mut() {
                    Some(reader) => Some(reader.next_document()?),
                    None => None,
                };
                DocumentContext::new(self.segmentation.policy, links)
            }
        };
        Ok(self.context.insert(ctx))
    }

    fn finish_document(&mut self) -> Result<Option<S>> {
        match self.context.take() {
            Some(ctx) if !ctx.is_empty() => ctx.finalize(),
            Some(ctx) => {
                self.context = Some(ctx);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl<R: BufRead, S: AnnotationStore + Default> Iterator for DocumentStream<R, S> {
    type Item = Result<S>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(doc)) => Some(Ok(doc)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

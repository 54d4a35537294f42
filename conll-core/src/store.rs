//! # Armazenamento de Anotações
//!
//! O leitor não guarda documentos: ele apenas anuncia spans para um
//! [`AnnotationStore`]. O contrato é mínimo (criar token, sentença, documento,
//! menção e definir o texto) para que qualquer motor de armazenamento possa
//! recebê-los. [`DocumentPack`] é a implementação em memória usada por padrão.

use serde::{Deserialize, Serialize};

use crate::offset::Span;
use crate::tagger::EntityMention;

/// Destino das anotações de um documento.
pub trait AnnotationStore {
    fn create_token(&mut self, begin: usize, end: usize);
    fn create_sentence(&mut self, begin: usize, end: usize);
    fn create_document(&mut self, begin: usize, end: usize);
    fn create_entity_mention(&mut self, mention: EntityMention);
    fn set_document_text(&mut self, text: String);

    /// Identificador do documento (vindo do arquivo de linking).
    fn set_name(&mut self, _name: String) {}

    /// Índices de token com linha de linking que nenhuma menção consumiu.
    fn set_unmatched_links(&mut self, _token_indices: Vec<usize>) {}
}

/// Documento completo, com texto e todas as anotações.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub text: String,
    pub documents: Vec<Span>,
    pub sentences: Vec<Span>,
    pub tokens: Vec<Span>,
    pub entity_mentions: Vec<EntityMention>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched_links: Vec<usize>,
}

impl DocumentPack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texto coberto por um span.
    pub fn covered_text(&self, span: &Span) -> Option<&str> {
        span.slice(&self.text)
    }

    /// Palavras na ordem do documento.
    pub fn words(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter_map(|t| self.covered_text(t))
            .collect()
    }

    /// Tokens contidos na sentença.
    pub fn tokens_in<'a>(&'a self, sentence: &'a Span) -> impl Iterator<Item = &'a Span> + 'a {
        self.tokens.iter().filter(move |t| sentence.contains(t))
    }
}

impl AnnotationStore for DocumentPack {
    fn create_token(&mut self, begin: usize, end: usize) {
        self.tokens.push(Span::new(begin, end));
    }

    fn create_sentence(&mut self, begin: usize, end: usize) {
        self.sentences.push(Span::new(begin, end));
    }

    fn create_document(&mut self, begin: usize, end: usize) {
        self.documents.push(Span::new(begin, end));
    }

    fn create_entity_mention(&mut self, mention: EntityMention) {
        self.entity_mentions.push(mention);
    }

    fn set_document_text(&mut self, text: String) {
        self.text = text;
    }

    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    fn set_unmatched_links(&mut self, token_indices: Vec<usize>) {
        self.unmatched_links = token_indices;
    }
}

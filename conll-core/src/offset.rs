//! # Rastreador de Offsets
//!
//! O texto de um documento não existe no arquivo CoNLL: ele é reconstruído
//! juntando as palavras com um espaço. Cada palavra recebe um span de bytes
//! `[begin, end)` nesse texto final, calculado enquanto as palavras chegam.
//!
//! ```text
//! palavras:  "EU"   "rejects"
//! texto:     E U _ r e j e c t s
//! offset:    0 1 2 3 4 5 6 7 8 9
//! spans:     [0,2)  [3,10)        cursor final = 11
//! ```
//!
//! O cursor sempre reserva um separador depois da última palavra. Esse
//! separador não existe no texto final, então o fim do documento é
//! `cursor - 1`, nunca o próprio cursor.

use serde::{Deserialize, Serialize};

/// Intervalo semiaberto de bytes `[begin, end)` no texto do documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifica se `other` está inteiramente contido neste span.
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// Recorta o trecho correspondente do texto (None se fora dos limites).
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.begin..self.end)
    }
}

/// Calcula o span de `word` a partir do cursor e devolve o próximo cursor
/// (fim da palavra + 1 separador reservado).
pub fn advance(word: &str, cursor: usize) -> (Span, usize) {
    let begin = cursor;
    let end = begin + word.len();
    (Span::new(begin, end), end + 1)
}

/// Palavras acumuladas desde a última fronteira de documento.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuffer {
    words: Vec<String>,
    cursor: usize,
}

impl DocumentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anexa a palavra e retorna o seu span no texto final.
    pub fn push(&mut self, word: &str) -> Span {
        let (span, next) = advance(word, self.cursor);
        self.words.push(word.to_string());
        self.cursor = next;
        span
    }

    /// Posição onde a próxima palavra começará.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tamanho do texto final (sem o separador reservado).
    pub fn text_len(&self) -> usize {
        self.cursor.saturating_sub(1)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Junta as palavras com espaço simples.
    pub fn into_text(self) -> String {
        self.words.join(" ")
    }
}

//! # Rótulos IOB e Construtor de Menções
//!
//! Converte a sequência de rótulos IOB (um por token) em menções de entidade
//! com offsets de bytes no texto do documento.
//!
//! ## Esquema IOB
//!
//! - `B-TYPE`: Begin, primeiro token de uma entidade
//! - `I-TYPE`: Inside, tokens subsequentes da mesma entidade
//! - `O`: Outside, não é parte de nenhuma entidade
//!
//! ## Máquina de Estados
//!
//! ```text
//!                 B-X / O / I-Y (Y≠X) / último token
//!               ┌──────────────────────────────┐
//!               ▼                              │ fecha [início, fronteira) e reabre
//!  Nenhum ──► Aberto(início, idx, X) ──────────┘
//!               │  ▲
//!               └──┘ I-X (mesmo tipo)
//! ```
//!
//! Trechos `O` também abrem um span, mas de tipo `O`: ao fechar, não geram menção.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::nel::{LinkLookup, LinkingRecord, WikiLink};
use crate::offset::Span;

/// Rótulo IOB de um token, já separado em prefixo e tipo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IobLabel {
    /// **Begin**: força o início de uma nova entidade. Ex: **EU** (B-ORG).
    Begin(String),
    /// **Inside**: continua a entidade aberta, se o tipo for o mesmo.
    Inside(String),
    /// **Outside**: fora de entidade. O tipo é `O` para o rótulo simples `O`.
    Outside(String),
}

impl IobLabel {
    /// Tipo usado pelos trechos fora de entidade.
    pub const NO_ENTITY: &'static str = "O";

    /// Parseia um rótulo (ex: "B-PER" → Begin("PER")).
    ///
    /// Aceita `O` ou `<B|I|O>-<TIPO>` com tipo não vazio; o tipo é tudo o que
    /// vem depois do primeiro `-` (ex: "B-ORG-X" → "ORG-X"). Qualquer outro
    /// formato (IOBES, tipo sem prefixo, prefixo sem tipo) retorna `None`.
    pub fn parse(label: &str) -> Option<Self> {
        if label == Self::NO_ENTITY {
            return Some(IobLabel::Outside(Self::NO_ENTITY.to_string()));
        }
        let (prefix, entity_type) = label.split_once('-')?;
        if entity_type.is_empty() {
            return None;
        }
        let entity_type = entity_type.to_string();
        match prefix {
            "B" => Some(IobLabel::Begin(entity_type)),
            "I" => Some(IobLabel::Inside(entity_type)),
            "O" => Some(IobLabel::Outside(entity_type)),
            _ => None,
        }
    }

    /// Tipo da entidade (sem o prefixo).
    pub fn entity_type(&self) -> &str {
        match self {
            IobLabel::Begin(t) | IobLabel::Inside(t) | IobLabel::Outside(t) => t,
        }
    }

    /// Representação textual (ex: "B-PER", "I-ORG", "O")
    pub fn label(&self) -> String {
        match self {
            IobLabel::Begin(t) => format!("B-{t}"),
            IobLabel::Inside(t) => format!("I-{t}"),
            IobLabel::Outside(t) if t == Self::NO_ENTITY => Self::NO_ENTITY.to_string(),
            IobLabel::Outside(t) => format!("O-{t}"),
        }
    }

    /// Este rótulo encerra um span aberto do tipo `open_type`?
    fn breaks(&self, open_type: &str) -> bool {
        match self {
            IobLabel::Outside(_) | IobLabel::Begin(_) => true,
            IobLabel::Inside(t) => t != open_type,
        }
    }
}

impl std::fmt::Display for IobLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Onde termina uma menção fechada por um token de fronteira.
///
/// As duas variantes do leitor divergem aqui e ambas são preservadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Fim = início do token de fronteira − 1 (descarta o separador).
    /// Padrão do leitor sem linking.
    TrimSeparator,
    /// Fim = início do token de fronteira, separador incluído.
    /// Padrão do leitor com linking.
    ExactBoundary,
}

impl BoundaryPolicy {
    /// Fim exclusivo de uma menção encerrada pelo token que começa em `boundary`.
    pub fn end_before(&self, boundary: usize) -> usize {
        match self {
            BoundaryPolicy::TrimSeparator => boundary.saturating_sub(1),
            BoundaryPolicy::ExactBoundary => boundary,
        }
    }
}

/// Span de entidade ainda aberto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSpan {
    pub start_offset: usize,
    pub start_token: usize,
    pub entity_type: String,
}

/// Span recém-fechado, ainda sem a consulta de linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSpan {
    pub span: Span,
    pub start_token: usize,
    pub entity_type: String,
}

impl ClosedSpan {
    /// Gera a menção, consumindo a linha de linking do token inicial se houver.
    ///
    /// Uma linha consumida com menos de 4 colunas deixa a menção sem link.
    pub fn into_mention(self, links: Option<&mut LinkingRecord>) -> Result<EntityMention> {
        let link = match links.map(|l| l.take(self.start_token)) {
            Some(LinkLookup::Consumed(row)) => WikiLink::from_row(&row)?,
            Some(LinkLookup::Absent) | None => None,
        };
        Ok(EntityMention {
            begin: self.span.begin,
            end: self.span.end,
            ner_type: self.entity_type,
            link,
        })
    }
}

/// Menção de entidade emitida para o documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Offset de byte inicial no texto do documento.
    pub begin: usize,
    /// Offset de byte final (exclusivo).
    pub end: usize,
    /// Tipo da entidade (ex: "ORG", "PER").
    pub ner_type: String,
    /// Ligação com a Base de Conhecimento (apenas na variante com linking).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<WikiLink>,
}

impl EntityMention {
    pub fn span(&self) -> Span {
        Span::new(self.begin, self.end)
    }
}

/// Máquina de estados que colapsa rótulos IOB em menções.
///
/// Vive apenas durante um documento: no máximo um span aberto por vez.
#[derive(Debug, Clone)]
pub struct SpanBuilder {
    pending: Option<PendingSpan>,
    policy: BoundaryPolicy,
}

impl SpanBuilder {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self {
            pending: None,
            policy,
        }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn pending(&self) -> Option<&PendingSpan> {
        self.pending.as_ref()
    }

    /// Processa um token.
    ///
    /// - Sem rótulo: nada muda.
    /// - Sem span aberto: abre um no token atual.
    /// - Span aberto e o rótulo quebra a sequência (ou `is_last`): fecha o span
    ///   na fronteira dada pela política e reabre no token atual.
    /// - Caso contrário (`I-` do mesmo tipo): a sequência continua.
    ///
    /// Retorna o span fechado, se houver e se não for do tipo `O`.
    pub fn observe(
        &mut self,
        label: Option<&IobLabel>,
        begin: usize,
        token_index: usize,
        is_last: bool,
    ) -> Option<ClosedSpan> {
        let label = label?;
        let opened = PendingSpan {
            start_offset: begin,
            start_token: token_index,
            entity_type: label.entity_type().to_string(),
        };

        match self.pending.take() {
            None => {
                self.pending = Some(opened);
                None
            }
            Some(open) if is_last || label.breaks(&open.entity_type) => {
                self.pending = Some(opened);
                Self::close(open, self.policy.end_before(begin))
            }
            Some(open) => {
                self.pending = Some(open);
                None
            }
        }
    }

    /// Fecha o span aberto no fim do documento (`document_end` = tamanho do
    /// texto final). Não há separador a descartar, então a política não se aplica.
    pub fn finish(&mut self, document_end: usize) -> Option<ClosedSpan> {
        let open = self.pending.take()?;
        Self::close(open, document_end)
    }

    fn close(open: PendingSpan, end: usize) -> Option<ClosedSpan> {
        if open.entity_type == IobLabel::NO_ENTITY {
            return None;
        }
        Some(ClosedSpan {
            span: Span::new(open.start_offset, end),
            start_token: open.start_token,
            entity_type: open.entity_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nel::LinkRow;

    fn label(s: &str) -> IobLabel {
        IobLabel::parse(s).unwrap()
    }

    /// Alimenta o builder com (rótulo, início) e fecha no fim do texto.
    fn run(policy: BoundaryPolicy, tokens: &[(&str, usize)], text_len: usize) -> Vec<ClosedSpan> {
        let mut builder = SpanBuilder::new(policy);
        let mut closed = Vec::new();
        for (i, (l, begin)) in tokens.iter().enumerate() {
            closed.extend(builder.observe(Some(&label(l)), *begin, i, false));
        }
        closed.extend(builder.finish(text_len));
        closed
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(label("O"), IobLabel::Outside("O".into()));
        assert_eq!(label("B-PER"), IobLabel::Begin("PER".into()));
        assert_eq!(label("I-LOC"), IobLabel::Inside("LOC".into()));
        assert_eq!(label("O-MISC"), IobLabel::Outside("MISC".into()));
        assert_eq!(label("B-ORG-X").entity_type(), "ORG-X");
    }

    #[test]
    fn test_label_parse_rejects_unknown_shapes() {
        for bad in ["E-PER", "S-LOC", "ORG", "B-", "B", "", "-PER"] {
            assert_eq!(IobLabel::parse(bad), None, "{bad:?} deveria ser rejeitado");
        }
    }

    #[test]
    fn test_label_round_trip_text() {
        for s in ["O", "B-PER", "I-LOC", "O-MISC"] {
            assert_eq!(label(s).to_string(), s);
        }
    }

    #[test]
    fn test_single_token_entity_trims_separator() {
        // "EU rejects"
        let spans = run(BoundaryPolicy::TrimSeparator, &[("B-ORG", 0), ("O", 3)], 10);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, Span::new(0, 2));
        assert_eq!(spans[0].entity_type, "ORG");
    }

    #[test]
    fn test_exact_boundary_keeps_separator() {
        let spans = run(BoundaryPolicy::ExactBoundary, &[("B-ORG", 0), ("O", 3)], 10);
        assert_eq!(spans[0].span, Span::new(0, 3));
    }

    #[test]
    fn test_consecutive_begins_are_separate_mentions() {
        // "EU UN now"
        let spans = run(
            BoundaryPolicy::TrimSeparator,
            &[("B-ORG", 0), ("B-ORG", 3), ("O", 6)],
            9,
        );
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].span, Span::new(0, 2));
        assert_eq!(spans[1].span, Span::new(3, 5));
    }

    #[test]
    fn test_inside_continues_same_type() {
        // "Peter Blackburn said"
        let spans = run(
            BoundaryPolicy::TrimSeparator,
            &[("B-PER", 0), ("I-PER", 6), ("O", 16)],
            20,
        );
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, Span::new(0, 15));
        assert_eq!(spans[0].start_token, 0);
    }

    #[test]
    fn test_inside_with_other_type_breaks() {
        let spans = run(
            BoundaryPolicy::TrimSeparator,
            &[("B-PER", 0), ("I-LOC", 2), ("O", 4)],
            5,
        );
        let types: Vec<&str> = spans.iter().map(|s| s.entity_type.as_str()).collect();
        assert_eq!(types, vec!["PER", "LOC"]);
    }

    #[test]
    fn test_outside_runs_never_emit() {
        let spans = run(BoundaryPolicy::TrimSeparator, &[("O", 0), ("O", 2), ("O", 4)], 5);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_inside_after_outside_opens_entity() {
        let spans = run(BoundaryPolicy::TrimSeparator, &[("O", 0), ("I-MISC", 2)], 9);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, Span::new(2, 9));
    }

    #[test]
    fn test_finish_closes_trailing_entity_at_text_end() {
        for policy in [BoundaryPolicy::TrimSeparator, BoundaryPolicy::ExactBoundary] {
            let spans = run(policy, &[("O", 0), ("B-LOC", 3), ("I-LOC", 7)], 12);
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0].span, Span::new(3, 12));
        }
    }

    #[test]
    fn test_absent_label_changes_nothing() {
        let mut builder = SpanBuilder::new(BoundaryPolicy::TrimSeparator);
        builder.observe(Some(&label("B-ORG")), 0, 0, false);
        assert!(builder.observe(None, 3, 1, false).is_none());
        assert_eq!(builder.pending().unwrap().entity_type, "ORG");
    }

    #[test]
    fn test_last_token_flag_forces_close() {
        let mut builder = SpanBuilder::new(BoundaryPolicy::ExactBoundary);
        builder.observe(Some(&label("B-PER")), 0, 0, false);
        let closed = builder.observe(Some(&label("I-PER")), 6, 1, true).unwrap();
        assert_eq!(closed.span, Span::new(0, 6));
        // O span reaberto no último token fica pendente e é descartado pelo chamador.
        assert_eq!(builder.pending().unwrap().start_token, 1);
    }

    #[test]
    fn test_into_mention_consumes_link() {
        let mut links = LinkingRecord::new();
        links.insert(
            0,
            LinkRow {
                line: 2,
                text: "0\tGermany\thttp://en.wikipedia.org/wiki/Germany\t11867\t/m/0345h".into(),
            },
        );
        let closed = ClosedSpan {
            span: Span::new(0, 8),
            start_token: 0,
            entity_type: "LOC".into(),
        };
        let mention = closed.into_mention(Some(&mut links)).unwrap();
        let link = mention.link.unwrap();
        assert_eq!(link.target, "Germany");
        assert_eq!(link.numeric_id, 11867);
        assert!(links.is_empty());
    }

    #[test]
    fn test_into_mention_short_row_is_consumed_without_link() {
        let mut links = LinkingRecord::new();
        links.insert(3, LinkRow { line: 1, text: "3\t--NME--".into() });
        let closed = ClosedSpan {
            span: Span::new(10, 14),
            start_token: 3,
            entity_type: "PER".into(),
        };
        let mention = closed.into_mention(Some(&mut links)).unwrap();
        assert!(mention.link.is_none());
        assert!(links.is_empty());
    }
}

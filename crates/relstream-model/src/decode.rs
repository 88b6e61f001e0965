//! Decode generated relation markup into triplets
//!
//! The extraction model emits relations as a flat token stream:
//! `<triplet> head <head_type> tail <tail_type> relation ...`, where a new
//! `<triplet>` marker starts the next head and a new `<head_type>` marker
//! after a completed relation starts another relation for the same head.
//! This module walks that stream and collects complete triplets, dropping
//! anything truncated by the generation length limit.

use relstream_domain::Triplet;
use tracing::warn;

/// Accumulation target while walking the token stream.
#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Head,
    Tail,
    Relation,
}

/// Decode one generated sequence into its triplets.
///
/// Incomplete triplets (any empty field) are skipped with a warning rather
/// than surfaced as errors; a partially generated tail relation is expected
/// behavior at the end of a sequence, not a fault.
pub fn decode_triplets(generated: &str) -> Vec<Triplet> {
    let cleaned = generated
        .replace("<s>", "")
        .replace("<pad>", "")
        .replace("</s>", "")
        .replace("tp_XX", "")
        .replace("__en__", "");

    let mut triplets = Vec::new();
    let mut field = Field::None;

    let mut head = String::new();
    let mut head_type = String::new();
    let mut relation = String::new();
    let mut tail = String::new();
    let mut tail_type = String::new();

    let mut push = |head: &str, head_type: &str, relation: &str, tail: &str, tail_type: &str| {
        let triplet = Triplet::new(
            head.trim(),
            head_type,
            relation.trim(),
            tail.trim(),
            tail_type,
        );
        if triplet.is_complete() {
            triplets.push(triplet);
        } else {
            warn!("skipping incomplete triplet for head {:?}", triplet.head);
        }
    };

    for token in cleaned.split_whitespace() {
        if token == "<triplet>" || token == "<relation>" {
            if !relation.is_empty() {
                push(&head, &head_type, &relation, &tail, &tail_type);
                relation.clear();
            }
            head.clear();
            field = Field::Head;
        } else if token.starts_with('<') && token.ends_with('>') {
            let marker = &token[1..token.len() - 1];
            if field == Field::Head || field == Field::Relation {
                // Type marker after head text (or after a finished relation,
                // starting another relation for the same head)
                if !relation.is_empty() {
                    push(&head, &head_type, &relation, &tail, &tail_type);
                }
                tail.clear();
                head_type = marker.to_string();
                field = Field::Tail;
            } else {
                tail_type = marker.to_string();
                relation.clear();
                field = Field::Relation;
            }
        } else {
            match field {
                Field::Head => {
                    head.push(' ');
                    head.push_str(token);
                }
                Field::Tail => {
                    tail.push(' ');
                    tail.push_str(token);
                }
                Field::Relation => {
                    relation.push(' ');
                    relation.push_str(token);
                }
                Field::None => {}
            }
        }
    }

    if !head.is_empty() && !relation.is_empty() {
        push(&head, &head_type, &relation, &tail, &tail_type);
    }

    triplets
}

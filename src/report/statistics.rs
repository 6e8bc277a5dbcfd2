//! Answer counts for the results tables.
//!
//! Built once from the raw responses before anything is laid out, then only
//! read.

use std::collections::BTreeMap;

use crate::model::{ContentBlock, Response};

/// Counts for one notes question, in the order its values were declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionCounts {
    counts: Vec<(String, usize)>,
}

impl QuestionCounts {
    pub fn count(&self, value: &str) -> usize {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, n)| *n)
    }

    /// Sum of the counts of every declared value.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(v, n)| (v.as_str(), *n))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    questions: BTreeMap<String, QuestionCounts>,
    participants: usize,
}

impl Statistics {
    /// Count, for every notes block, how many respondents gave each of its
    /// possible values. Values outside the declared set are ignored and a
    /// value declared twice is counted once.
    pub fn build(blocks: &[ContentBlock], responses: &[Response]) -> Self {
        let mut questions = BTreeMap::new();
        for block in blocks {
            let ContentBlock::Notes {
                identifier,
                possible_values,
                ..
            } = block
            else {
                continue;
            };

            let mut counts: Vec<(String, usize)> = Vec::with_capacity(possible_values.len());
            for value in possible_values {
                if !counts.iter().any(|(v, _)| v == value) {
                    counts.push((value.clone(), 0));
                }
            }
            for answer in responses.iter().filter_map(|r| r.answer(identifier)) {
                for value in answer.values() {
                    if let Some((_, n)) = counts.iter_mut().find(|(v, _)| *v == value) {
                        *n += 1;
                    }
                }
            }
            questions.insert(identifier.clone(), QuestionCounts { counts });
        }

        log::debug!(questions = questions.len(), participants = responses.len(); "Built statistics");

        Self {
            questions,
            participants: responses.len(),
        }
    }

    pub fn question(&self, identifier: &str) -> Option<&QuestionCounts> {
        self.questions.get(identifier)
    }

    /// Number of respondents.
    pub fn participants(&self) -> usize {
        self.participants
    }
}

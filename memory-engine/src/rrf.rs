//! Reciprocal Rank Fusion (spec §4.5 step 4): combines independently
//! ranked candidate id lists into one fused ranking.

use std::cmp::Ordering;
use std::collections::HashMap;

/// The fusion constant `k` (spec §4.5 step 4).
pub const RRF_K: f32 = 60.0;

/// A fused candidate: its id, the summed reciprocal-rank score, and the
/// best (lowest) individual sub-query rank it achieved — used to break ties
/// between equal fused scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Fused {
    pub id: String,
    pub score: f32,
    pub best_rank: u32,
}

/// Fuses `lists` (each already ordered best-first, 1-based rank implied by
/// position) with constant `k`: `score(e) = Σ 1/(k + rank_s(e))` over the
/// sub-queries where `e` appears. Results are sorted by descending fused
/// score, ties broken by the lower individual sub-query rank (spec §4.5
/// step 4).
#[must_use]
pub fn fuse(lists: &[Vec<String>], k: f32) -> Vec<Fused> {
    let mut scores: HashMap<String, (f32, u32)> = HashMap::new();

    for list in lists {
        for (index, id) in list.iter().enumerate() {
            let rank = (index + 1) as u32;
            let entry = scores.entry(id.clone()).or_insert((0.0, u32::MAX));
            entry.0 += 1.0 / (k + rank as f32);
            entry.1 = entry.1.min(rank);
        }
    }

    let mut fused: Vec<Fused> = scores
        .into_iter()
        .map(|(id, (score, best_rank))| Fused { id, score, best_rank })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.best_rank.cmp(&b.best_rank))
    });

    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_id_present_in_both_lists_outranks_one_present_in_a_single_list() {
        // Mirrors spec §8 scenario 2: A and B both rank highly across the
        // lexical and vector sub-queries, C only appears once and last.
        let lexical = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vector = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        let fused = fuse(&[lexical, vector], RRF_K);

        let rank_of = |id: &str| fused.iter().position(|f| f.id == id).unwrap();
        assert!(rank_of("a") < rank_of("c"));
        assert!(rank_of("b") < rank_of("c"));
        assert_eq!(fused.last().unwrap().id, "c");
    }

    #[test]
    fn ties_are_broken_by_the_better_individual_rank() {
        let lexical = vec!["a".to_string(), "b".to_string()];
        let vector = vec!["b".to_string(), "a".to_string()];
        let fused = fuse(&[lexical, vector], RRF_K);
        // Both ids appear once at rank 1 and once at rank 2: identical
        // fused scores, so the tie-break (best_rank) must decide a total
        // order rather than leaving it to hash iteration order.
        assert_eq!(fused[0].score, fused[1].score);
        assert_eq!(fused[0].best_rank, 1);
    }

    #[test]
    fn an_empty_candidate_set_fuses_to_nothing() {
        assert!(fuse(&[], RRF_K).is_empty());
        assert!(fuse(&[Vec::new(), Vec::new()], RRF_K).is_empty());
    }
}

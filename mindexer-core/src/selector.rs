//! Greedy, submodular-style index selection (spec §4.6).
//!
//! Repeatedly picks the candidate with the largest column-sum of benefit
//! across the workload, then re-credits every row so a later pick is judged
//! on its *marginal* improvement over the best index already chosen for
//! that query, never on its raw benefit again.

use crate::candidate::IndexCandidate;
use crate::config::SelectionConfig;
use crate::scorer::BenefitMatrix;

/// One chosen candidate and the column-total benefit that won it its round.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub candidate: IndexCandidate,
    pub round_benefit: f64,
}

pub fn select(matrix: BenefitMatrix, config: &SelectionConfig) -> Vec<Recommendation> {
    let BenefitMatrix { candidates, rows: base } = matrix;
    let num_queries = base.len();
    let num_candidates = candidates.len();
    if num_candidates == 0 {
        return Vec::new();
    }

    let mut working = base.clone();
    let mut eligible = vec![true; num_candidates];
    let mut recommendations = Vec::new();

    loop {
        if config.max_indexes > 0 && recommendations.len() == config.max_indexes {
            break;
        }

        let mut best_col = None;
        let mut best_total = 0.0_f64;
        for col in 0..num_candidates {
            if !eligible[col] {
                continue;
            }
            let total: f64 = (0..num_queries).map(|row| working[row][col]).sum();
            if best_col.is_none() || total > best_total {
                best_col = Some(col);
                best_total = total;
            }
        }

        let Some(winner) = best_col else { break };
        if best_total <= 0.0 {
            break;
        }

        recommendations.push(Recommendation {
            candidate: candidates[winner].clone(),
            round_benefit: best_total,
        });
        eligible[winner] = false;

        // Marginal re-credit: for every query row, find the best benefit
        // among columns already chosen, then floor every remaining column's
        // benefit at its improvement over that best.
        for row in 0..num_queries {
            let best_chosen = (0..num_candidates)
                .filter(|&col| !eligible[col])
                .map(|col| base[row][col])
                .filter(|v| *v != 0.0)
                .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))));

            if let Some(best) = best_chosen {
                for col in 0..num_candidates {
                    if eligible[col] {
                        working[row][col] = (base[row][col] - best).max(0.0);
                    }
                }
            }
        }
    }

    recommendations
}

//! Static weight expansion.

use super::Endpoint;

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Expand static weights into a schedule of endpoint indexes.
///
/// Weights are reduced by their common divisor, then spread with the smooth
/// weighted round-robin rule so heavy endpoints are not picked in bursts.
/// Returns an empty schedule when no endpoint carries a positive weight.
pub fn build_static_weight_list(endpoints: &[Endpoint]) -> Vec<usize> {
    let weighted: Vec<(usize, u32)> = endpoints
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.weight.filter(|w| *w > 0).map(|w| (i, w)))
        .collect();
    let divisor = weighted.iter().fold(0, |acc, (_, w)| gcd(acc, *w));
    if divisor == 0 {
        return Vec::new();
    }

    let weights: Vec<(usize, i64)> = weighted
        .iter()
        .map(|(i, w)| (*i, i64::from(*w / divisor)))
        .collect();
    let total: i64 = weights.iter().map(|(_, w)| w).sum();
    let mut current = vec![0i64; weights.len()];
    let mut schedule = Vec::with_capacity(usize::try_from(total).unwrap_or_default());
    for _ in 0..total {
        let mut best: Option<(usize, i64)> = None;
        for (slot, (_, w)) in current.iter_mut().zip(&weights) {
            *slot += w;
        }
        for (pos, slot) in current.iter().enumerate() {
            if best.is_none_or(|(_, b)| *slot > b) {
                best = Some((pos, *slot));
            }
        }
        let Some((pos, _)) = best else {
            break;
        };
        if let (Some(slot), Some((index, _))) = (current.get_mut(pos), weights.get(pos)) {
            *slot -= total;
            schedule.push(*index);
        }
    }
    schedule
}

//! Sequence similarity for near-duplicate claim detection

/// Similarity ratio `2·M / (|a| + |b|)` where `M` counts characters in
/// matching blocks found by repeatedly taking the longest common block
///
/// Two empty strings are identical (1.0).
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block in `a[alo..ahi]` and `b[blo..bhi]`; ties go to the
/// earliest start in `a`, then in `b`
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best) = (alo, blo, 0);
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    for i in alo..ahi {
        let mut row = vec![0usize; width + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                row[j - blo + 1] = k;
                if k > best {
                    best = k;
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                }
            }
        }
        prev = row;
    }
    (best_i, best_j, best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_disjoint() {
        assert_eq!(sequence_ratio("缓存模块", "缓存模块"), 1.0);
        assert_eq!(sequence_ratio("甲乙", "丙丁"), 0.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_known_ratio() {
        // Two matching blocks "ab" and "d" out of seven chars
        assert!((sequence_ratio("abcd", "abd") - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_substitution_stays_above_threshold() {
        let a = "所述缓存模块还包括淘汰单元，所述淘汰单元按照访问频率淘汰缓存数据";
        let b = "所述缓存模块还包括淘汰单元，所述淘汰单元按照访问次数淘汰缓存数据";
        let ratio = sequence_ratio(a, b);
        assert!(ratio >= 0.92, "ratio {}", ratio);
        assert!(ratio < 1.0);
    }
}

//! Review Aggregates

use serde::Serialize;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Average, count and per-star distribution for a product's reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub average: f64,
    pub count: usize,
    /// Index 0 holds the number of 1-star reviews, index 4 the 5-star ones.
    pub distribution: [u32; 5],
}

pub fn is_valid_rating(rating: i16) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

pub fn summarize(ratings: &[i16]) -> ReviewSummary {
    let mut distribution = [0u32; 5];
    let mut sum = 0i64;
    for &rating in ratings {
        debug_assert!(is_valid_rating(rating));
        distribution[(rating - 1) as usize] += 1;
        sum += rating as i64;
    }
    let count = ratings.len();
    let average = if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    };
    ReviewSummary {
        average,
        count,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(is_valid_rating(1));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(0));
        assert!(!is_valid_rating(6));
        assert!(!is_valid_rating(-3));
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&[5, 4, 5, 3, 5]);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.distribution, [0, 0, 1, 1, 3]);
        assert!((summary.average - 4.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.distribution, [0; 5]);
    }
}

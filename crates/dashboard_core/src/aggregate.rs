use std::collections::HashMap;

use crate::record::{MovieRecord, NO_RATING};

const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBucket {
    pub key: String,
    pub count: usize,
}

/// Chart-ready summary of one record set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    pub total: usize,
    pub average_rating: f64,
    pub movies_per_week: f64,
    pub movies_per_month: f64,
    /// One increment per constituent genre of each record.
    pub genres: Vec<AggregateBucket>,
    /// Records with an unknown year are left out.
    pub years: Vec<AggregateBucket>,
    /// Keyed by raw rating text; unrated records are left out.
    pub ratings: Vec<AggregateBucket>,
}

impl Aggregates {
    pub fn genre_count_sum(&self) -> usize {
        self.genres.iter().map(|b| b.count).sum()
    }

    pub fn year_count_sum(&self) -> usize {
        self.years.iter().map(|b| b.count).sum()
    }
}

/// Folds records into totals and buckets. Bucket order follows the first
/// appearance of each key.
pub fn aggregate(records: &[MovieRecord]) -> Aggregates {
    let total = records.len();
    let mut genres = BucketCounter::default();
    let mut years = BucketCounter::default();
    let mut ratings = BucketCounter::default();
    let mut rating_sum = 0.0;

    for record in records {
        for genre in record.genres() {
            genres.increment(genre);
        }
        if record.has_known_year() {
            years.increment(record.year());
        }
        if record.rating() != NO_RATING {
            ratings.increment(record.rating());
        }
        rating_sum += parse_rating(record.rating()).unwrap_or(0.0);
    }

    // Unrated records still count toward the denominator.
    let average_rating = if total == 0 {
        0.0
    } else {
        rating_sum / total as f64
    };

    Aggregates {
        total,
        average_rating,
        movies_per_week: total as f64 / WEEKS_PER_YEAR,
        movies_per_month: total as f64 / MONTHS_PER_YEAR,
        genres: genres.into_buckets(),
        years: years.into_buckets(),
        ratings: ratings.into_buckets(),
    }
}

/// Parses the longest leading decimal number of the trimmed text
/// (`"8.8/10"` gives 8.8). Returns `None` when no finite number leads the text.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let text = raw.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in text.char_indices() {
        let accepted = match ch {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            '+' | '-' if idx == 0 => true,
            _ => false,
        };
        if !accepted {
            break;
        }
        end = idx + ch.len_utf8();
    }
    // Back off a trailing dot or lone sign that `f64::from_str` would reject.
    let mut candidate = &text[..end];
    while !candidate.is_empty() {
        if let Ok(value) = candidate.parse::<f64>() {
            return value.is_finite().then_some(value);
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    None
}

#[derive(Default)]
struct BucketCounter {
    order: Vec<AggregateBucket>,
    index: HashMap<String, usize>,
}

impl BucketCounter {
    fn increment(&mut self, key: &str) {
        if let Some(&idx) = self.index.get(key) {
            self.order[idx].count += 1;
            return;
        }
        self.index.insert(key.to_string(), self.order.len());
        self.order.push(AggregateBucket {
            key: key.to_string(),
            count: 1,
        });
    }

    fn into_buckets(self) -> Vec<AggregateBucket> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::parse_rating;

    #[test]
    fn rating_parse_accepts_leading_number() {
        assert_eq!(parse_rating("8.8"), Some(8.8));
        assert_eq!(parse_rating(" 7 "), Some(7.0));
        assert_eq!(parse_rating("8.8/10"), Some(8.8));
        assert_eq!(parse_rating("9."), Some(9.0));
        assert_eq!(parse_rating("N/A"), None);
        assert_eq!(parse_rating("-"), None);
        assert_eq!(parse_rating(""), None);
    }
}

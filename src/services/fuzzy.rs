//! Typo-tolerant title search
//!
//! Titles and queries go through the same normalization before being
//! compared with a normalized Levenshtein ratio. Substring hits get a
//! confidence floor since people often type part of a title correctly.
use std::cmp::Ordering;

use strsim::levenshtein;

use crate::{
    models::{Movie, TitleMatch},
    store::Catalog,
};

use super::{ranking::score_key, EngineSettings, RecommendError, RecommendResult};

const ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Shortest fragment that may match inside a word
const MIN_FRAGMENT_LEN: usize = 3;

/// Canonical form of a title or query
///
/// - drops a trailing release year: "Heat (1995)" -> "Heat"
/// - moves a trailing article to the front: "Matrix, The" -> "The Matrix"
/// - lower-cases, drops apostrophes, turns other punctuation into spaces
/// - trims and collapses whitespace
pub fn normalize_title(raw: &str) -> String {
    let mut title = strip_year(raw.trim()).to_string();

    if let Some((head, tail)) = title.rsplit_once(',') {
        let tail = tail.trim();
        if ARTICLES.iter().any(|a| a.eq_ignore_ascii_case(tail)) {
            title = format!("{} {}", tail, head.trim());
        }
    }

    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_year(title: &str) -> &str {
    if let Some(stripped) = title.strip_suffix(')') {
        if let Some(open) = stripped.rfind('(') {
            let inner = &stripped[open + 1..];
            let is_year = !inner.is_empty()
                && inner.chars().any(|c| c.is_ascii_digit())
                && inner.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '\u{2013}');
            if is_year {
                return stripped[..open].trim_end();
            }
        }
    }
    title
}

/// Confidence that `title` is what `query` meant; both must be normalized
pub fn confidence(query: &str, title: &str, containment_floor: f64) -> f64 {
    let query_len = query.chars().count();
    let title_len = title.chars().count();
    let longest = query_len.max(title_len);
    if longest == 0 {
        return 0.0;
    }

    let ratio = 1.0 - levenshtein(query, title) as f64 / longest as f64;

    let (shorter, longer) = if query_len <= title_len {
        (query, title)
    } else {
        (title, query)
    };
    if shorter.is_empty() || !boosts_containment(shorter, longer) {
        return ratio;
    }

    let floor = containment_floor.clamp(0.0, 1.0);
    let coverage = query_len.min(title_len) as f64 / longest as f64;
    ratio.max(floor + (1.0 - floor) * coverage)
}

/// Whether `shorter` inside `longer` counts as a partial title hit
///
/// Short fragments only count as whole words, so a stray letter does not
/// match every title that happens to contain it.
fn boosts_containment(shorter: &str, longer: &str) -> bool {
    if shorter.chars().count() >= MIN_FRAGMENT_LEN {
        return longer.contains(shorter);
    }
    format!(" {} ", longer).contains(&format!(" {} ", shorter))
}

struct Candidate<'m> {
    movie: &'m Movie,
    confidence: f64,
    normalized_len: usize,
}

/// Confidence descending, shorter title first, then lower ID
fn compare_candidates(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    score_key(b.confidence)
        .cmp(&score_key(a.confidence))
        .then_with(|| a.normalized_len.cmp(&b.normalized_len))
        .then_with(|| a.movie.id.cmp(&b.movie.id))
}

/// Resolves free text to catalog movies
pub struct TitleMatcher<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    settings: &'a EngineSettings,
}

impl<'a, C: Catalog + ?Sized> TitleMatcher<'a, C> {
    pub fn new(catalog: &'a C, settings: &'a EngineSettings) -> Self {
        Self { catalog, settings }
    }

    /// Best `top_k` title matches for `query`
    ///
    /// Signals `NoMatch` when nothing reaches the confidence floor.
    pub fn match_titles(&self, query: &str, top_k: usize) -> RecommendResult<Vec<TitleMatch>> {
        let normalized_query = normalize_title(query);
        if normalized_query.is_empty() {
            return Err(RecommendError::NoMatch {
                query: query.to_string(),
            });
        }

        let mut candidates: Vec<Candidate<'_>> = self
            .catalog
            .all_movies()
            .into_iter()
            .filter_map(|movie| {
                let normalized = normalize_title(&movie.title);
                let confidence = confidence(
                    &normalized_query,
                    &normalized,
                    self.settings.match_containment_floor,
                );
                (confidence >= self.settings.match_min_confidence).then(|| Candidate {
                    movie,
                    confidence,
                    normalized_len: normalized.chars().count(),
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(RecommendError::NoMatch {
                query: query.to_string(),
            });
        }

        candidates.sort_by(compare_candidates);
        candidates.truncate(top_k);

        Ok(candidates
            .into_iter()
            .map(|c| TitleMatch {
                movie: c.movie.clone(),
                confidence: c.confidence,
            })
            .collect())
    }
}

/*!
 * Individual re-chunking rules.
 *
 * Every rule takes ownership of the unit list and returns the new list; word
 * order and word timings are never changed, only the grouping.
 */

use super::{join_words, SubtitleUnit};

/// Split after every word ending in one of `marks`, as long as another word
/// follows. The mark stays with the left-hand piece.
pub fn split_by_punctuation(units: Vec<SubtitleUnit>, marks: &[String]) -> Vec<SubtitleUnit> {
    let marks: Vec<&str> = marks.iter().map(|m| m.trim()).filter(|m| !m.is_empty()).collect();
    if marks.is_empty() {
        return units;
    }

    units
        .into_iter()
        .flat_map(|unit| {
            let boundaries: Vec<usize> = unit
                .words
                .iter()
                .enumerate()
                .take(unit.words.len().saturating_sub(1))
                .filter(|(_, word)| {
                    let token = word.text.trim_end();
                    marks.iter().any(|mark| token.ends_with(mark))
                })
                .map(|(i, _)| i + 1)
                .collect();
            unit.split_at(&boundaries)
        })
        .collect()
}

/// Split between two words whose silence exceeds `max_gap` seconds.
/// A non-positive threshold disables the rule.
pub fn split_by_gap(units: Vec<SubtitleUnit>, max_gap: f64) -> Vec<SubtitleUnit> {
    if max_gap <= 0.0 {
        return units;
    }

    units
        .into_iter()
        .flat_map(|unit| {
            let boundaries: Vec<usize> = unit
                .words
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[1].start - pair[0].end > max_gap)
                .map(|(i, _)| i + 1)
                .collect();
            unit.split_at(&boundaries)
        })
        .collect()
}

/// Join adjacent units of the same speaker when the silence between them is
/// below `min_gap` seconds and the joined unit stays within `max_words`.
/// A non-positive threshold disables the rule.
pub fn merge_by_gap(units: Vec<SubtitleUnit>, min_gap: f64, max_words: usize) -> Vec<SubtitleUnit> {
    if min_gap <= 0.0 {
        return units;
    }

    let mut merged: Vec<SubtitleUnit> = Vec::with_capacity(units.len());
    for unit in units {
        if let Some(prev) = merged.last_mut() {
            let gap = unit.start - prev.end;
            let fits = max_words == 0 || prev.word_count() + unit.word_count() <= max_words;
            if gap < min_gap && fits && prev.speaker == unit.speaker {
                prev.absorb(unit);
                continue;
            }
        }
        merged.push(unit);
    }
    merged
}

/// Split units above `max_words` words or `max_chars` characters, never inside
/// a word. Pieces are balanced when an even split satisfies both limits.
/// A zero limit is ignored.
pub fn split_by_length(units: Vec<SubtitleUnit>, max_words: usize, max_chars: usize) -> Vec<SubtitleUnit> {
    if max_words == 0 && max_chars == 0 {
        return units;
    }

    units
        .into_iter()
        .flat_map(|unit| {
            if within_limits(&unit.text, unit.word_count(), max_words, max_chars) {
                return vec![unit];
            }
            let boundaries = length_boundaries(&unit, max_words, max_chars);
            unit.split_at(&boundaries)
        })
        .collect()
}

fn within_limits(text: &str, words: usize, max_words: usize, max_chars: usize) -> bool {
    (max_words == 0 || words <= max_words) && (max_chars == 0 || text.chars().count() <= max_chars)
}

fn length_boundaries(unit: &SubtitleUnit, max_words: usize, max_chars: usize) -> Vec<usize> {
    let words = &unit.words;

    // Greedy pass: as many words per piece as the limits allow
    let mut greedy = Vec::new();
    let mut from = 0;
    for k in 1..words.len() {
        let candidate = join_words(&words[from..=k]);
        if !within_limits(&candidate, k + 1 - from, max_words, max_chars) {
            greedy.push(k);
            from = k;
        }
    }

    // Try spreading the same number of pieces evenly
    let pieces = greedy.len() + 1;
    let per_piece = words.len().div_ceil(pieces);
    let even: Vec<usize> = (1..pieces).map(|p| p * per_piece).filter(|&b| b < words.len()).collect();
    let even_fits = even.len() + 1 == pieces
        && even
            .iter()
            .copied()
            .chain(std::iter::once(words.len()))
            .scan(0, |start, end| {
                let piece = &words[*start..end];
                *start = end;
                Some(within_limits(&join_words(piece), piece.len(), max_words, max_chars))
            })
            .all(|fits| fits);

    if even_fits { even } else { greedy }
}

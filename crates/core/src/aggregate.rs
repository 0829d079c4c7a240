//! Merging several captures of the same page into one composite text.
//!
//! Lines from every frame are deduplicated by fuzzy similarity, keeping the
//! most complete variant of each. Words the merge lost are recovered from the
//! frames, and when the merge is worse than the best single frame the words of
//! all frames are folded into that frame instead.

use std::collections::{HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::Error;

/// Lowercase with whitespace runs collapsed.
fn normalize_line(line: &str) -> String {
    line.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Similarity of two lines in `0.0..=1.0`: the better of normalized edit
/// similarity and the containment ratio of the shorter line in the longer.
pub fn line_similarity(a: &str, b: &str) -> f32 {
    let a = normalize_line(a);
    let b = normalize_line(b);
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    let longest = ac.len().max(bc.len());
    let edit = 1.0 - levenshtein(&ac, &bc) as f32 / longest as f32;

    let (short, long) = if ac.len() <= bc.len() { (&a, &b) } else { (&b, &a) };
    let containment = if long.contains(short.as_str()) {
        short.chars().count() as f32 / longest as f32
    } else {
        0.0
    };

    edit.max(containment)
}

fn punctuation_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_punctuation).count()
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Word identity for recovery: lowercase, surrounding punctuation removed.
fn word_key(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// True when `candidate` should replace `kept` as the variant of a line.
fn is_better_variant(candidate: &str, kept: &str) -> bool {
    let (c_len, k_len) = (candidate.chars().count(), kept.chars().count());
    c_len > k_len || (c_len == k_len && punctuation_count(candidate) > punctuation_count(kept))
}

/// Index of the frame with the most words, then punctuation, then length.
/// The earliest frame wins ties.
pub fn most_complete_frame(frames: &[String]) -> Option<usize> {
    let score = |frame: &String| {
        (
            word_count(frame),
            punctuation_count(frame) > 0,
            frame.chars().count(),
        )
    };

    let mut best: Option<(usize, (usize, bool, usize))> = None;
    for (i, frame) in frames.iter().enumerate() {
        let s = score(frame);
        if best.is_none_or(|(_, top)| s > top) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

fn merge_lines(frames: &[String], threshold: f32) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for line in frames.iter().flat_map(|f| f.lines()).map(str::trim) {
        if line.is_empty() {
            continue;
        }
        match kept
            .iter()
            .position(|existing| line_similarity(existing, line) >= threshold)
        {
            Some(i) => {
                if is_better_variant(line, &kept[i]) {
                    kept[i] = line.to_string();
                }
            }
            None => kept.push(line.to_string()),
        }
    }
    kept
}

/// Append to `base` every word of the other frames it does not already hold.
fn union_words(base: &str, frames: &[String]) -> String {
    let mut seen: HashSet<String> = base.split_whitespace().map(word_key).collect();
    let mut result = base.trim().to_string();
    for word in frames.iter().flat_map(|f| f.split_whitespace()) {
        let key = word_key(word);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Append words seen in at least two frames that the composite lost.
fn recover_words(composite: &str, frames: &[String]) -> String {
    let mut frame_counts: HashMap<String, usize> = HashMap::new();
    for frame in frames {
        let keys: HashSet<String> = frame
            .split_whitespace()
            .map(word_key)
            .filter(|k| !k.is_empty())
            .collect();
        for key in keys {
            *frame_counts.entry(key).or_default() += 1;
        }
    }

    let mut present: HashSet<String> = composite.split_whitespace().map(word_key).collect();
    let mut result = composite.to_string();
    for word in frames.iter().flat_map(|f| f.split_whitespace()) {
        let key = word_key(word);
        if frame_counts.get(&key).copied().unwrap_or(0) < 2 || !present.insert(key) {
            continue;
        }
        log::debug!("recovered word {word:?} from frames");
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word.trim_matches(|c: char| !c.is_alphanumeric()));
    }
    result
}

/// Merge a set of captures of the same page into one text.
pub fn aggregate(frames: &[String], config: &PipelineConfig) -> Result<String, Error> {
    if frames.is_empty() {
        return Err(Error::EmptyFrameSet);
    }
    if frames.len() == 1 {
        return Ok(frames[0].clone());
    }

    let lines = merge_lines(frames, config.similarity_threshold);
    let mut composite = lines.join("\n");

    if let Some(best) = most_complete_frame(frames) {
        if lines.is_empty() || word_count(&composite) < word_count(&frames[best]) {
            log::debug!("line merge lost words; folding all frames into frame {best}");
            composite = union_words(&frames[best], frames);
        }
    }

    if composite.chars().count() < config.recovery_max_chars {
        composite = recover_words(&composite, frames);
    }
    Ok(composite)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_frame_set() {
        assert!(matches!(
            aggregate(&[], &PipelineConfig::default()),
            Err(Error::EmptyFrameSet)
        ));
    }

    #[test]
    fn test_single_frame_unchanged() {
        let input = frames(&["  odd   spacing\n\nkept "]);
        assert_eq!(
            aggregate(&input, &PipelineConfig::default()).unwrap(),
            "  odd   spacing\n\nkept "
        );
    }

    #[test]
    fn test_frame_dedup_keeps_punctuated_variant() {
        let input = frames(&["Hello world.", "Hello world"]);
        assert_eq!(
            aggregate(&input, &PipelineConfig::default()).unwrap(),
            "Hello world."
        );
    }

    #[test]
    fn test_distinct_lines_are_merged_in_order() {
        let input = frames(&["Question one.\nName a gas.", "Question one.\nName a gas!\nDraw it."]);
        assert_eq!(
            aggregate(&input, &PipelineConfig::default()).unwrap(),
            "Question one.\nName a gas.\nDraw it."
        );
    }

    #[test]
    fn test_line_similarity() {
        assert_eq!(line_similarity("Hello  World", "hello world"), 1.0);
        assert!(line_similarity("Hello world.", "Hello world") > 0.9);
        assert!(line_similarity("soil", "water cycle") < 0.5);
        assert_eq!(line_similarity("", "text"), 0.0);
    }

    #[test]
    fn test_levenshtein() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("same"), &chars("same")), 0);
    }

    #[test]
    fn test_most_complete_frame() {
        let input = frames(&["two words", "three words here", "three words here."]);
        assert_eq!(most_complete_frame(&input), Some(2));
        assert_eq!(most_complete_frame(&[]), None);
    }

    #[test]
    fn test_union_fallback_when_merge_loses_words() {
        let config = PipelineConfig {
            similarity_threshold: 0.8,
            ..PipelineConfig::default()
        };
        let input = frames(&["a b c d e f g h i", "a b c d e f g hij."]);
        assert_eq!(aggregate(&input, &config).unwrap(), "a b c d e f g h i hij.");
    }

    #[test]
    fn test_recover_words_seen_twice() {
        let input = frames(&["soil water", "water, soil", "sand"]);
        assert_eq!(recover_words("sand", &input), "sand soil water");
    }

    #[test]
    fn test_recovery_skips_long_composites() {
        let config = PipelineConfig {
            recovery_max_chars: 5,
            ..PipelineConfig::default()
        };
        let input = frames(&["The root absorbs water.", "The root absorbs water"]);
        assert_eq!(
            aggregate(&input, &config).unwrap(),
            "The root absorbs water."
        );
    }
}

// tests/matching_properties.rs
//! Behavioral tests for the matching core through the public API
//!
//! This file tests:
//! 1. Result invariants over a spread of messy transcripts
//! 2. Casual-speech substitutions, including the substring heuristic
//! 3. Forward-only alignment
//! 4. Best-so-far sessions fed like a live recognizer
//! 5. Accented script text against plain transcripts

use cueline::matching::edit_distance;
use cueline::{
    LineMatcher, MatchResult, MatchSession, SubstitutionTable, match_line, normalize_text,
    tokenize, tokens_match,
};

const HAMLET: &str = "To be, or not to be, that is the question.";

fn assert_well_formed(result: &MatchResult) {
    assert!(result.matched_words <= result.total_words);
    assert_eq!(result.matched_indices.len(), result.matched_words);
    assert!(result.matched_indices.windows(2).all(|w| w[0] < w[1]));
    assert!(
        result
            .matched_indices
            .iter()
            .all(|&i| i < result.total_words)
    );
    assert!((0.0..=100.0).contains(&result.match_percentage));
}

#[test]
fn test_results_are_well_formed_for_messy_transcripts() {
    let transcripts = [
        "",
        "   ",
        "?!...",
        "to",
        "question the is that be to not or be to",
        "to to to to to to to to to to to to",
        "tobe or nott to bee that is teh questin",
        "uh so to be or um not to be",
        "TO BE OR NOT TO BE THAT IS THE QUESTION",
        "to be or not to be that is the question and then some more words",
        "ça va? naïve café",
    ];
    for transcript in transcripts {
        let result = match_line(transcript, HAMLET, 0.75);
        assert_well_formed(&result);
        assert_eq!(result.total_words, 10, "transcript: {transcript:?}");
        // Pure: a second call agrees
        assert_eq!(result, match_line(transcript, HAMLET, 0.75));
    }
}

#[test]
fn test_long_transcript_stays_well_formed() {
    let transcript = "to be or not ".repeat(2_000);
    let result = match_line(&transcript, HAMLET, 0.75);
    assert_well_formed(&result);
    assert_eq!(result.matched_words, 6);
}

#[test]
fn test_empty_expected_line_is_always_complete() {
    for expected in ["", "   ", "...", "—"] {
        for transcript in ["", "anything at all"] {
            let result = match_line(transcript, expected, 0.75);
            assert_eq!(result.total_words, 0);
            assert_eq!(result.match_percentage, 100.0);
            assert!(result.is_complete);
        }
    }
}

#[test]
fn test_exact_line_is_fully_matched() {
    let result = match_line("to be or not to be", "To be or not to be", 0.75);
    assert_eq!(result.matched_words, 6);
    assert_eq!(result.total_words, 6);
    assert_eq!(result.match_percentage, 100.0);
    assert!(result.is_complete);
}

#[test]
fn test_threshold_boundary() {
    let expected = "one two three four";
    let three = match_line("one two three", expected, 0.75);
    assert_eq!(three.matched_words, 3);
    assert!(three.is_complete);

    let two = match_line("one two", expected, 0.75);
    assert_eq!(two.matched_words, 2);
    assert!(!two.is_complete);
}

#[test]
fn test_contraction_against_expanded_line() {
    // "i'm" is one token and is not in the built-in table, so "i am" stays
    // unmatched; "gonna" matches the "i" of the line through the substring
    // rule before "going" gets a chance.
    let result = match_line("yeah I'm gonna go", "Yes I am going to go", 0.75);
    assert_eq!(result.total_words, 6);
    assert_eq!(result.matched_indices, vec![0, 1, 5]);
    assert!(!result.is_complete);

    // Spoken in full, the casual forms line up word for word
    let result = match_line("yeah I am gonna go", "Yes I am going to go", 0.75);
    assert_eq!(result.matched_indices, vec![0, 1, 2, 3, 5]);
    assert!(result.is_complete);
}

#[test]
fn test_configured_contraction_entry() {
    let mut table = SubstitutionTable::default();
    table.insert("i'm", ["i am"]);
    let matcher = LineMatcher::new(0.75).with_substitutions(table);
    let session = {
        let mut session = MatchSession::with_matcher("I am here", matcher);
        session.update("I'm here");
        session
    };
    // "i'm" stands in for "i"; "am" is a substring of "i am" but the
    // cursor has already moved past the spoken "i'm"
    assert_eq!(session.get_match().matched_indices, vec![0, 2]);
}

#[test]
fn test_substitutions_work_in_both_directions() {
    let matcher = LineMatcher::default();
    let mut spoken_casual = MatchSession::with_matcher("I want to leave", matcher.clone());
    assert_eq!(spoken_casual.update("I wanna leave").matched_indices, vec![0, 1, 3]);

    let mut written_casual = MatchSession::with_matcher("Gonna leave", matcher);
    assert!(written_casual.update("going to leave").is_complete);
}

#[test]
fn test_without_substitutions_casual_speech_misses() {
    let matcher = LineMatcher::new(0.75).with_substitutions(SubstitutionTable::empty());
    let mut session = MatchSession::with_matcher("yes", matcher);
    assert!(!session.update("yeah").is_complete);
}

#[test]
fn test_forward_only_alignment() {
    let result = match_line("be be to", "to be", 0.75);
    // "to" is found after both "be"s, so "be" has nothing left to match
    assert_eq!(result.matched_indices, vec![0]);
    assert_eq!(result.matched_words, 1);

    // An early stray word cannot be matched again later
    let result = match_line("not to be", "to be or not", 0.75);
    assert_eq!(result.matched_indices, vec![0, 1]);
}

#[test]
fn test_token_tolerance() {
    assert!(tokens_match("tomorow", "tomorrow", 0.3));
    assert!(tokens_match("recieve", "receive", 0.3));
    assert!(!tokens_match("cat", "dog", 0.3));
    // A transposition costs two edits, too many for a three letter word
    assert_eq!(edit_distance("teh", "the"), 2);
    assert!(!tokens_match("teh", "the", 0.3));
    assert!(tokens_match("teh", "the", 0.7));
}

#[test]
fn test_normalization_ignores_punctuation_and_case() {
    assert_eq!(normalize_text("  Wherefore ART thou,\tRomeo?! "), "wherefore art thou romeo");
    assert_eq!(normalize_text("I\u{2019}m"), "i'm");
    let tokens: Vec<String> = tokenize("O Romeo, Romeo!")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(tokens, vec!["o", "romeo", "romeo"]);
}

#[test]
fn test_accented_line_heard_without_accents() {
    // Accented letters are word characters: they survive normalization and
    // an unaccented transcript pays one edit per accent
    assert_eq!(normalize_text("Naïve CAFÉ, señor!"), "naïve café señor");
    let result = match_line("naive cafe senor", "Naïve café, señor!", 0.75);
    assert_eq!(result.matched_indices, vec![0, 1, 2]);
    assert!(result.is_complete);

    // Two accents in a three letter word are too many edits
    assert!(!tokens_match("ete", "été", 0.3));
    assert!(tokens_match("été", "été", 0.3));
}

#[test]
fn test_session_follows_live_recognizer() {
    let mut session = MatchSession::new(HAMLET, 0.75);
    let updates = [
        ("to", 1),
        ("to be", 2),
        ("to be or knot", 4),
        // The recognizer revises its guess; the session keeps the best
        ("two bee", 4),
        ("to be or not to be that", 7),
        ("to be or not to be that is the", 9),
        ("", 9),
    ];
    let mut previous = 0;
    for (transcript, expected) in updates {
        let matched = session.update(transcript).matched_words;
        assert_eq!(matched, expected, "after {transcript:?}");
        assert!(matched >= previous);
        previous = matched;
    }
    assert!(session.is_complete());

    session.reset();
    assert_eq!(session.get_match().matched_words, 0);
    assert!(!session.is_complete());
}

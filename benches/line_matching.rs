use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use cueline::{ExpectedLine, LineMatcher, MatchSession, tokenize};
use std::hint::black_box;

const MONOLOGUE: &str = "Now is the winter of our discontent made glorious summer by this \
    sun of York, and all the clouds that lour'd upon our house in the deep bosom of the \
    ocean buried. Now are our brows bound with victorious wreaths, our bruised arms hung \
    up for monuments, our stern alarums changed to merry meetings, our dreadful marches \
    to delightful measures.";

/// Transcript of the first `words` words as a recognizer might hear them.
fn heard(words: usize) -> String {
    tokenize(MONOLOGUE)
        .iter()
        .take(words)
        .enumerate()
        .map(|(i, token)| {
            // Every fifth word comes back slightly wrong
            if i % 5 == 4 {
                format!("{}e", token.as_str())
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_match_line(c: &mut Criterion) {
    let matcher = LineMatcher::default();
    let expected = ExpectedLine::new(MONOLOGUE);
    let mut group = c.benchmark_group("match_line");

    for words in [5, 20, expected.len()] {
        let transcript = heard(words);
        group.bench_with_input(BenchmarkId::from_parameter(words), &transcript, |b, t| {
            b.iter(|| matcher.match_line(black_box(t), black_box(&expected)))
        });
    }
    group.finish();
}

fn bench_live_session(c: &mut Criterion) {
    let total = tokenize(MONOLOGUE).len();
    // One interim transcript per word, growing like live recognition
    let interims: Vec<String> = (1..=total).map(heard).collect();

    c.bench_function("session_interim_stream", |b| {
        b.iter(|| {
            let mut session = MatchSession::new(MONOLOGUE, 0.75);
            for transcript in &interims {
                black_box(session.update(transcript));
            }
            session.is_complete()
        })
    });
}

criterion_group!(benches, bench_match_line, bench_live_session);
criterion_main!(benches);

// tests/performance_pipeline.rs
//! End-to-end performances through the threaded pipeline
//!
//! This file tests:
//! 1. A full scene: partner lines voiced, directions skipped, human lines heard
//! 2. Interim-only completion advancing after silence
//! 3. Recognizer restarts discarding a half-heard line
//! 4. Fatal recognizer errors ending the performance
//! 5. Reader controls (jump, pause, resume, done)
//! 6. JSON-lines output for another process to follow

use cueline::performance::MockSpeaker;
use cueline::pipeline::{CollectorSink, JsonLinesSink};
use cueline::recognition::{AdapterConfig, EngineEvent, RecognitionErrorKind, ScriptedEngine};
use cueline::{
    Control, LineMatcher, PerformanceController, PerformanceEvent, PerformancePipeline,
    PerformanceSettings, PerformanceStatus, Performer, PipelineConfig, Script, ScriptLine,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WAIT: Option<Duration> = Some(Duration::from_secs(10));

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        adapter: AdapterConfig {
            restart_delay: Duration::from_millis(5),
            poll_interval: Duration::from_millis(2),
            channel_capacity: 16,
        },
        tick_interval: Duration::from_millis(5),
        ..PipelineConfig::default()
    }
}

fn balcony() -> Script {
    Script::new(
        "Balcony",
        vec![
            ScriptLine::direction("Capulet's orchard."),
            ScriptLine::dialogue(
                "ROMEO",
                "But soft, what light through yonder window breaks?",
                Performer::Human,
            ),
            ScriptLine::dialogue("JULIET", "Ay me!", Performer::Ai),
            ScriptLine::dialogue("ROMEO", "She speaks.", Performer::Human),
            ScriptLine::dialogue(
                "JULIET",
                "O Romeo, Romeo, wherefore art thou Romeo?",
                Performer::Ai,
            ),
        ],
    )
}

fn controller(script: Script, settings: PerformanceSettings) -> PerformanceController {
    PerformanceController::new(script, LineMatcher::default(), settings)
}

fn interim(text: &str) -> EngineEvent {
    EngineEvent::Result {
        transcript: text.to_string(),
        is_final: false,
    }
}

fn final_result(text: &str) -> EngineEvent {
    EngineEvent::Result {
        transcript: text.to_string(),
        is_final: true,
    }
}

fn completed_lines(events: &[PerformanceEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            PerformanceEvent::LineCompleted { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

#[test]
fn test_full_scene_with_interim_results() {
    let speaker = MockSpeaker::new();
    let sink = CollectorSink::new();
    let engine = ScriptedEngine::new([
        interim("but soft"),
        interim("but soft what light"),
        final_result("but soft what light through yonder window breaks"),
        interim("she"),
        final_result("she speaks"),
    ]);

    let handle = PerformancePipeline::new(fast_config())
        .start(
            controller(balcony(), PerformanceSettings::default()),
            engine,
            speaker.clone(),
            Box::new(sink.clone()),
        )
        .unwrap();

    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();

    assert_eq!(
        speaker.spoken(),
        vec!["Ay me!", "O Romeo, Romeo, wherefore art thou Romeo?"]
    );

    let events = sink.events();
    assert_eq!(events.first(), Some(&PerformanceEvent::LineSkipped { index: 0 }));
    assert_eq!(completed_lines(&events), vec![1, 3]);

    // Progress on the first human line only ever grows
    let progress: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            PerformanceEvent::Progress { index: 1, result } => Some(result.matched_words),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![2, 4, 8]);
}

#[test]
fn test_interim_completion_advances_after_silence() {
    let speaker = MockSpeaker::new();
    let sink = CollectorSink::new();
    let script = Script::new(
        "Exit",
        vec![
            ScriptLine::dialogue("GUARD", "Who goes there?", Performer::Human),
            ScriptLine::dialogue("KING", "Your king.", Performer::Ai),
        ],
    );
    let settings = PerformanceSettings {
        auto_advance: true,
        silence_threshold: Duration::from_millis(30),
    };
    // Interim only: the line must be moved on by the silence timer
    let engine = ScriptedEngine::new([interim("who goes there")]);

    let handle = PerformancePipeline::new(fast_config())
        .start(
            controller(script, settings),
            engine,
            speaker.clone(),
            Box::new(sink.clone()),
        )
        .unwrap();

    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();

    assert_eq!(speaker.spoken(), vec!["Your king."]);
    assert_eq!(completed_lines(&sink.events()), vec![0]);
}

#[test]
fn test_without_auto_advance_completion_waits_for_reader() {
    let sink = CollectorSink::new();
    let script = Script::new(
        "Hold",
        vec![ScriptLine::dialogue("A", "Stay a while.", Performer::Human)],
    );
    let settings = PerformanceSettings {
        auto_advance: false,
        silence_threshold: Duration::from_millis(10),
    };
    let engine = ScriptedEngine::finals(["stay a while"]);

    let handle = PerformancePipeline::new(fast_config())
        .start(
            controller(script, settings),
            engine,
            MockSpeaker::new(),
            Box::new(sink.clone()),
        )
        .unwrap();

    // Heard, but nothing moves on by itself
    assert_eq!(handle.wait(Some(Duration::from_millis(200))), None);
    assert_eq!(completed_lines(&sink.events()), vec![0]);

    handle.send(Control::HumanDone).unwrap();
    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();

    assert!(sink.events().iter().any(|e| matches!(
        e,
        PerformanceEvent::LineCompleted {
            index: 0,
            manual: true,
            ..
        }
    )));
}

#[test]
fn test_recognizer_restart_discards_partial_line() {
    let sink = CollectorSink::new();
    let script = Script::new(
        "Question",
        vec![ScriptLine::dialogue(
            "HAMLET",
            "To be or not to be, that is the question.",
            Performer::Human,
        )],
    );
    let engine = ScriptedEngine::new([
        interim("to be or not"),
        EngineEvent::Ended,
        final_result("to be or not to be that is the question"),
    ]);
    let stats = engine.stats();

    let handle = PerformancePipeline::new(fast_config())
        .start(
            controller(script, PerformanceSettings::default()),
            engine,
            MockSpeaker::new(),
            Box::new(sink.clone()),
        )
        .unwrap();

    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();

    assert!(stats.starts() >= 2);
    let progress: Vec<usize> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            PerformanceEvent::Progress { result, .. } => Some(result.matched_words),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![4, 0, 10]);
}

#[test]
fn test_not_allowed_ends_the_performance() {
    let sink = CollectorSink::new();
    let engine = ScriptedEngine::new([
        EngineEvent::Error("no-speech".to_string()),
        EngineEvent::Error("not-allowed".to_string()),
        EngineEvent::Ended,
    ]);

    let handle = PerformancePipeline::new(fast_config())
        .start(
            controller(balcony(), PerformanceSettings::default()),
            engine,
            MockSpeaker::new(),
            Box::new(sink.clone()),
        )
        .unwrap();

    assert!(matches!(
        handle.wait(WAIT),
        Some(PerformanceEvent::RecognitionClosed { .. })
    ));
    handle.shutdown();

    // Benign no-speech never reaches the performance
    let errors: Vec<RecognitionErrorKind> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PerformanceEvent::RecognitionError { error } => Some(error),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec![RecognitionErrorKind::NotAllowed]);
}

#[test]
fn test_reader_controls_jump_pause_and_resume() {
    let speaker = MockSpeaker::new();
    let sink = CollectorSink::new();
    let config = PipelineConfig {
        start_at: None,
        ..fast_config()
    };

    let handle = PerformancePipeline::new(config)
        .start(
            controller(balcony(), PerformanceSettings::default()),
            ScriptedEngine::new([]),
            speaker.clone(),
            Box::new(sink.clone()),
        )
        .unwrap();

    handle.send(Control::JumpTo(3)).unwrap();
    handle.send(Control::Pause).unwrap();
    handle.send(Control::Play).unwrap();
    handle.send(Control::HumanDone).unwrap();

    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();

    assert_eq!(
        speaker.spoken(),
        vec!["O Romeo, Romeo, wherefore art thou Romeo?"]
    );
    let statuses: Vec<PerformanceStatus> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PerformanceEvent::StatusChanged { status } => Some(status),
            _ => None,
        })
        .collect();
    assert!(statuses.contains(&PerformanceStatus::Paused));
    assert_eq!(completed_lines(&sink.events()), vec![3]);
}

#[test]
fn test_start_at_skips_earlier_lines() {
    let speaker = MockSpeaker::new();
    let config = PipelineConfig {
        start_at: Some(4),
        ..fast_config()
    };

    let handle = PerformancePipeline::new(config)
        .start(
            controller(balcony(), PerformanceSettings::default()),
            ScriptedEngine::new([]),
            speaker.clone(),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();
    assert_eq!(
        speaker.spoken(),
        vec!["O Romeo, Romeo, wherefore art thou Romeo?"]
    );
}

/// Writer whose output stays readable after the sink takes ownership.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_json_lines_output() {
    let buffer = SharedBuffer::default();
    let script = Script::new(
        "Short",
        vec![
            ScriptLine::dialogue("A", "Hello there.", Performer::Human),
            ScriptLine::dialogue("B", "Hi.", Performer::Ai),
        ],
    );

    let handle = PerformancePipeline::new(fast_config())
        .start(
            controller(script, PerformanceSettings::default()),
            ScriptedEngine::finals(["hello there"]),
            MockSpeaker::new(),
            Box::new(JsonLinesSink::new(buffer.clone())),
        )
        .unwrap();

    assert_eq!(handle.wait(WAIT), Some(PerformanceEvent::Finished));
    handle.shutdown();

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let events: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(events.iter().any(|e| e["event"] == "speak" && e["index"] == 1));
    assert!(events.iter().any(|e| {
        e["event"] == "line_completed" && e["index"] == 0 && e["result"]["matched_words"] == 2
    }));
    assert_eq!(events.last().unwrap()["event"], "finished");
}

use super::*;
use crate::chat::{ChatMessage, ChatResponse, TextResponse};
use crate::persona::{IDLE_CHATTER, OFFLINE_RESPONSES};
use crate::response::AnimationFlags;
use crate::speech::SilentVoice;
use crate::stage::{RecordingStage, StageAction};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::task::JoinHandle;

enum Script {
    Reply(&'static str),
    Hang,
    Panic,
}

struct ScriptedAssistant {
    script: Script,
    delay: Duration,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedAssistant {
    fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::from_millis(300),
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedAssistant {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, AssistantError> {
        self.calls.lock().expect("calls lock").push(messages.to_vec());
        time::sleep(self.delay).await;
        match self.script {
            Script::Reply(text) => Ok(Box::new(TextResponse { text: text.into() })),
            Script::Hang => std::future::pending().await,
            Script::Panic => panic!("provider exploded"),
        }
    }
}

struct TimedVoice {
    duration: Duration,
    outcome: Playback,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl TimedVoice {
    fn finishing_after(ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(ms),
            outcome: Playback::Finished,
            spoken: Arc::default(),
        }
    }

    fn detached() -> Self {
        Self {
            duration: Duration::ZERO,
            outcome: Playback::Detached,
            spoken: Arc::default(),
        }
    }
}

#[async_trait]
impl Voice for TimedVoice {
    async fn speak(&self, text: &str) -> Result<Playback, SpeechError> {
        self.spoken.lock().expect("spoken lock").push(text.to_string());
        time::sleep(self.duration).await;
        Ok(self.outcome)
    }
}

fn frames(dir: &str, count: usize) -> Vec<PathBuf> {
    (1..=count)
        .map(|i| PathBuf::from(format!("{dir}/{i}.png")))
        .collect()
}

fn animations() -> AnimationSet {
    AnimationSet::from_sequences([
        (AnimationKind::Idle, frames("idle", 2)),
        (AnimationKind::Talking, frames("talking", 2)),
        (AnimationKind::Wave, frames("wave", 3)),
        (AnimationKind::Arrive, frames("arrive", 2)),
    ])
}

fn remote(assistant: Arc<ScriptedAssistant>) -> Option<Arc<dyn ChatProvider>> {
    Some(assistant)
}

fn quiet_config() -> OrchestratorConfig {
    OrchestratorConfig {
        frame_interval: Duration::from_millis(100),
        teleport_interval: None,
        chatter_window: None,
        request_timeout: Duration::from_secs(2),
        watchdog_grace: Duration::from_secs(1),
        speech_ms_per_word: 500,
        speech_min: Duration::from_millis(1500),
        random_animations: false,
        fallback_odds: Default::default(),
        history_pairs: 3,
        welcome: false,
        screen: (800, 600),
    }
}

struct Harness {
    commands: mpsc::Sender<Command>,
    events: mpsc::UnboundedReceiver<BuddyEvent>,
    stage: RecordingStage,
    handle: JoinHandle<ConversationHistory>,
}

fn start(
    config: OrchestratorConfig,
    assistant: Option<Arc<dyn ChatProvider>>,
    voice: Arc<dyn Voice>,
) -> Harness {
    let stage = RecordingStage::new();
    let mut orchestrator =
        Orchestrator::new(config, animations(), assistant, voice, Box::new(stage.clone()))
            .with_seed(7);
    let events = orchestrator.create_event_channel();
    let (commands, rx) = mpsc::channel(8);
    let handle = tokio::spawn(orchestrator.run(rx));
    Harness {
        commands,
        events,
        stage,
        handle,
    }
}

impl Harness {
    async fn prompt(&self, text: &str) {
        self.commands
            .send(Command::Prompt(text.into()))
            .await
            .expect("orchestrator running");
    }

    /// Collects events up to and including the first one matching `last`.
    async fn collect_until(
        &mut self,
        last: impl Fn(&BuddyEvent) -> bool,
    ) -> Vec<(Instant, BuddyEvent)> {
        let mut seen = Vec::new();
        let collect = async {
            while let Some(event) = self.events.recv().await {
                let done = last(&event);
                seen.push((Instant::now(), event));
                if done {
                    break;
                }
            }
        };
        time::timeout(Duration::from_secs(120), collect)
            .await
            .expect("event never arrived");
        seen
    }

    async fn shutdown(mut self) -> ConversationHistory {
        self.commands
            .send(Command::Shutdown)
            .await
            .expect("orchestrator running");
        self.collect_until(|e| *e == BuddyEvent::Stopped).await;
        self.handle.await.expect("orchestrator task")
    }
}

fn kinds(events: &[(Instant, BuddyEvent)]) -> Vec<BuddyEvent> {
    events.iter().map(|(_, e)| e.clone()).collect()
}

fn instant_of(events: &[(Instant, BuddyEvent)], pred: impl Fn(&BuddyEvent) -> bool) -> Instant {
    events
        .iter()
        .find(|(_, e)| pred(e))
        .map(|(at, _)| *at)
        .expect("event present")
}

#[tokio::test(start_paused = true)]
async fn reply_talks_then_waves_then_idles() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Reply(
        r#"{"dialogue": "Hi there.", "wave": true}"#,
    )));
    let voice = Arc::new(TimedVoice::finishing_after(800));
    let spoken = voice.spoken.clone();
    let mut harness = start(quiet_config(), remote(assistant), voice);

    harness.prompt("hello").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;

    let wave_flags = AnimationFlags {
        wave: true,
        ..Default::default()
    };
    assert_eq!(
        kinds(&events),
        vec![
            BuddyEvent::TurnStarted {
                turn: 1,
                user_text: Some("hello".into())
            },
            BuddyEvent::ResponseReady {
                turn: 1,
                source: TurnSource::Remote,
                dialogue: "Hi there.".into(),
                flags: wave_flags,
            },
            BuddyEvent::TalkingStarted { turn: 1 },
            BuddyEvent::TalkingFinished {
                turn: 1,
                reason: TalkEndReason::PlaybackFinished
            },
            BuddyEvent::AnimationStarted {
                turn: 1,
                animation: AnimationKind::Wave
            },
            BuddyEvent::TurnCompleted { turn: 1 },
        ]
    );

    let talked = instant_of(&events, |e| matches!(e, BuddyEvent::TalkingFinished { .. }))
        - instant_of(&events, |e| matches!(e, BuddyEvent::TalkingStarted { .. }));
    assert!(
        talked >= Duration::from_millis(800) && talked < Duration::from_millis(900),
        "talked for {talked:?}"
    );

    let waved = instant_of(&events, |e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        - instant_of(&events, |e| matches!(e, BuddyEvent::AnimationStarted { .. }));
    assert!(waved >= Duration::from_millis(200), "wave lasted {waved:?}");

    let actions = harness.stage.actions();
    assert!(actions.contains(&StageAction::Caption(Some("Loading response...".into()))));
    assert!(actions.contains(&StageAction::Caption(Some("Hi there.".into()))));
    let wave_frames: Vec<_> = actions
        .iter()
        .filter_map(|a| match a {
            StageAction::Frame(path) if path.starts_with("wave") => Some(path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(wave_frames, frames("wave", 3));
    assert_eq!(actions.last(), Some(&StageAction::Caption(None)));
    assert_eq!(spoken.lock().expect("spoken lock").as_slice(), ["Hi there."]);

    let history = harness.shutdown().await;
    let stored = history.messages();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].content, "hello");
    assert_eq!(stored[1].content, r#"{"dialogue": "Hi there.", "wave": true}"#);
}

#[tokio::test(start_paused = true)]
async fn unanswered_request_falls_back_to_offline_line() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Hang));
    let mut harness = start(
        quiet_config(),
        remote(assistant),
        Arc::new(TimedVoice::detached()),
    );

    let started = Instant::now();
    harness.prompt("anyone there?").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;

    let ready_at = instant_of(&events, |e| matches!(e, BuddyEvent::ResponseReady { .. }));
    assert!(ready_at - started >= Duration::from_secs(2));

    let (source, dialogue, flags) = events
        .iter()
        .find_map(|(_, e)| match e {
            BuddyEvent::ResponseReady {
                source,
                dialogue,
                flags,
                ..
            } => Some((*source, dialogue.clone(), *flags)),
            _ => None,
        })
        .expect("response ready");
    assert_eq!(source, TurnSource::ErrorFallback);
    assert!(OFFLINE_RESPONSES.contains(&dialogue.as_str()));
    assert!(!flags.any());
    assert!(kinds(&events).contains(&BuddyEvent::TalkingFinished {
        turn: 1,
        reason: TalkEndReason::TimedOut
    }));

    let history = harness.shutdown().await;
    assert!(history.is_empty());
}

#[tokio::test(start_paused = true)]
async fn watchdog_resolves_a_lost_request() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Panic));
    let mut harness = start(
        quiet_config(),
        remote(assistant),
        Arc::new(TimedVoice::finishing_after(100)),
    );

    let started = Instant::now();
    harness.prompt("boom").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;

    let ready_at = instant_of(&events, |e| {
        matches!(
            e,
            BuddyEvent::ResponseReady {
                source: TurnSource::ErrorFallback,
                ..
            }
        )
    });
    assert!(ready_at - started >= Duration::from_secs(3));
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn animations_without_frames_are_skipped_immediately() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Reply(
        r#"{"dialogue": "Watch this.", "backflip": true}"#,
    )));
    let mut harness = start(
        quiet_config(),
        remote(assistant),
        Arc::new(TimedVoice::finishing_after(400)),
    );

    harness.prompt("do a flip").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;

    assert!(kinds(&events).contains(&BuddyEvent::AnimationSkipped {
        turn: 1,
        animation: AnimationKind::Backflip
    }));
    let talked = instant_of(&events, |e| matches!(e, BuddyEvent::TalkingFinished { .. }));
    let skipped = instant_of(&events, |e| matches!(e, BuddyEvent::AnimationSkipped { .. }));
    let completed = instant_of(&events, |e| matches!(e, BuddyEvent::TurnCompleted { .. }));
    assert_eq!(talked, skipped);
    assert_eq!(skipped, completed);
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn prompts_while_busy_are_deferred_in_order() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Reply("Sure, whatever.")));
    let calls = assistant.calls.clone();
    let mut harness = start(
        quiet_config(),
        remote(assistant),
        Arc::new(TimedVoice::finishing_after(200)),
    );

    harness.prompt("one").await;
    harness.prompt("two").await;
    let events = harness
        .collect_until(|e| *e == BuddyEvent::TurnCompleted { turn: 2 })
        .await;

    let started: Vec<_> = events
        .iter()
        .filter_map(|(_, e)| match e {
            BuddyEvent::TurnStarted { user_text, .. } => user_text.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(started, ["one", "two"]);
    assert!(kinds(&events).contains(&BuddyEvent::PromptDeferred {
        text: "two".into(),
        pending: 1
    }));

    let first_done = instant_of(&events, |e| *e == BuddyEvent::TurnCompleted { turn: 1 });
    let second_start = instant_of(&events, |e| {
        matches!(e, BuddyEvent::TurnStarted { turn: 2, .. })
    });
    assert!(second_start >= first_done);

    let calls = calls.lock().expect("calls lock").clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].len(), 1);
    let contents: Vec<_> = calls[1].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["one", "Sure, whatever.", "two"]);

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn offline_mode_answers_from_canned_lines() {
    let mut harness = start(quiet_config(), None, Arc::new(TimedVoice::finishing_after(100)));

    harness.prompt("hi").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;

    let offline = events.iter().any(|(_, e)| {
        matches!(e, BuddyEvent::ResponseReady { source: TurnSource::Offline, dialogue, .. }
            if OFFLINE_RESPONSES.contains(&dialogue.as_str()))
    });
    assert!(offline);
    assert!(harness.shutdown().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn idle_chatter_speaks_unprompted() {
    let config = OrchestratorConfig {
        chatter_window: Some((Duration::from_secs(1), Duration::from_secs(2))),
        ..quiet_config()
    };
    let mut harness = start(config, None, Arc::new(TimedVoice::finishing_after(100)));

    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;

    assert_eq!(
        events[0].1,
        BuddyEvent::TurnStarted {
            turn: 1,
            user_text: None
        }
    );
    let chatter = events.iter().any(|(_, e)| {
        matches!(e, BuddyEvent::ResponseReady { dialogue, .. }
            if IDLE_CHATTER.contains(&dialogue.as_str()))
    });
    assert!(chatter);
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn teleport_vanishes_moves_and_reappears() {
    let config = OrchestratorConfig {
        teleport_interval: Some(Duration::from_secs(1)),
        ..quiet_config()
    };
    let mut harness = start(config, None, Arc::new(SilentVoice));

    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::Teleported { .. }))
        .await;
    let Some((_, BuddyEvent::Teleported { position })) = events.last() else {
        panic!("no teleport");
    };
    assert!(position.x >= 0 && position.x <= 600);
    assert!(position.y >= 0 && position.y <= 400);

    // Let the arrival play out.
    time::sleep(Duration::from_millis(500)).await;
    let actions = harness.stage.actions();
    let moved = actions
        .iter()
        .position(|a| matches!(a, StageAction::Move(_)))
        .expect("moved");
    let arrive = frames("arrive", 2);
    assert_eq!(
        actions[moved - 2..moved],
        [
            StageAction::Frame(arrive[1].clone()),
            StageAction::Frame(arrive[0].clone())
        ]
    );
    assert_eq!(
        actions[moved + 1..moved + 3],
        [
            StageAction::Frame(arrive[0].clone()),
            StageAction::Frame(arrive[1].clone())
        ]
    );
    harness.shutdown().await;
}

fn slow_remote() -> Option<Arc<dyn ChatProvider>> {
    let mut assistant = ScriptedAssistant::new(Script::Reply("Fine. Done."));
    assistant.delay = Duration::from_secs(1);
    remote(Arc::new(assistant))
}

#[tokio::test(start_paused = true)]
async fn chatter_due_mid_turn_waits_for_the_turn_to_finish() {
    let config = OrchestratorConfig {
        chatter_window: Some((Duration::from_millis(500), Duration::from_millis(500))),
        ..quiet_config()
    };
    let mut harness = start(config, slow_remote(), Arc::new(TimedVoice::finishing_after(1000)));

    harness.prompt("take your time").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnStarted { turn: 2, .. }))
        .await;

    let completed_at = instant_of(&events, |e| *e == BuddyEvent::TurnCompleted { turn: 1 });
    let started: Vec<_> = events
        .iter()
        .filter(|(_, e)| matches!(e, BuddyEvent::TurnStarted { .. }))
        .collect();
    assert_eq!(started.len(), 2);
    assert_eq!(
        started[0].1,
        BuddyEvent::TurnStarted {
            turn: 1,
            user_text: Some("take your time".into())
        }
    );
    assert_eq!(
        started[1].1,
        BuddyEvent::TurnStarted {
            turn: 2,
            user_text: None
        }
    );
    assert!(started[1].0 >= completed_at + Duration::from_millis(500));
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn teleport_due_mid_turn_waits_for_the_turn_to_finish() {
    let config = OrchestratorConfig {
        teleport_interval: Some(Duration::from_millis(500)),
        ..quiet_config()
    };
    let mut harness = start(config, slow_remote(), Arc::new(TimedVoice::finishing_after(1000)));

    harness.prompt("stay put").await;
    let events = harness
        .collect_until(|e| matches!(e, BuddyEvent::Teleported { .. }))
        .await;

    let completed = events
        .iter()
        .position(|(_, e)| *e == BuddyEvent::TurnCompleted { turn: 1 })
        .expect("turn completed before teleporting");
    assert!(completed < events.len() - 1);
    let completed_at = events[completed].0;
    let (teleported_at, _) = events.last().expect("teleported");
    assert!(*teleported_at >= completed_at + Duration::from_millis(500));
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn welcome_line_plays_on_start() {
    let config = OrchestratorConfig {
        welcome: true,
        ..quiet_config()
    };
    let voice = Arc::new(TimedVoice::finishing_after(100));
    let spoken = voice.spoken.clone();
    let mut harness = start(config, None, voice);

    harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnCompleted { .. }))
        .await;
    assert_eq!(
        spoken.lock().expect("spoken lock").as_slice(),
        [WELCOME_LINE]
    );
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_a_turn_and_ignores_late_results() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Reply("Too late.")));
    let mut harness = start(
        quiet_config(),
        remote(assistant),
        Arc::new(TimedVoice::finishing_after(100)),
    );

    harness.prompt("hello").await;
    harness
        .collect_until(|e| matches!(e, BuddyEvent::TurnStarted { .. }))
        .await;
    harness
        .commands
        .send(Command::Shutdown)
        .await
        .expect("orchestrator running");
    let events = harness.collect_until(|e| *e == BuddyEvent::Stopped).await;

    assert!(!events
        .iter()
        .any(|(_, e)| matches!(e, BuddyEvent::ResponseReady { .. })));
    assert!(kinds(&events).contains(&BuddyEvent::AnimationSkipped {
        turn: 2,
        animation: AnimationKind::Goodbye
    }));
    let history = harness.handle.await.expect("orchestrator task");
    assert!(history.is_empty());
}

#[tokio::test(start_paused = true)]
async fn closing_the_command_channel_stops_the_loop() {
    let Harness {
        commands,
        mut events,
        handle,
        ..
    } = start(quiet_config(), None, Arc::new(SilentVoice));
    drop(commands);

    let stopped = time::timeout(Duration::from_secs(5), async {
        while let Some(event) = events.recv().await {
            if event == BuddyEvent::Stopped {
                return true;
            }
        }
        false
    })
    .await
    .expect("stopped in time");
    assert!(stopped);
    handle.await.expect("orchestrator task");
}

/// Fails the first caption it is asked to show.
struct FlakyStage {
    failed: bool,
}

impl Stage for FlakyStage {
    fn show_frame(&mut self, _frame: &std::path::Path) -> Result<(), StageError> {
        Ok(())
    }

    fn show_caption(&mut self, caption: Option<&str>) -> Result<(), StageError> {
        if caption.is_some() && !self.failed {
            self.failed = true;
            return Err(StageError::Closed);
        }
        Ok(())
    }

    fn move_to(&mut self, _position: Position) -> Result<(), StageError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn stage_failure_returns_to_idle_and_keeps_serving() {
    let assistant = Arc::new(ScriptedAssistant::new(Script::Reply("Fine.")));
    let mut orchestrator = Orchestrator::new(
        quiet_config(),
        animations(),
        remote(assistant),
        Arc::new(TimedVoice::finishing_after(100)),
        Box::new(FlakyStage { failed: false }),
    );
    let mut events = orchestrator.create_event_channel();
    let (commands, rx) = mpsc::channel(8);
    let handle = tokio::spawn(orchestrator.run(rx));

    commands
        .send(Command::Prompt("first".into()))
        .await
        .expect("orchestrator running");
    let recovered = time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Some(BuddyEvent::Recovered { .. }) => return true,
                Some(_) => {}
                None => return false,
            }
        }
    })
    .await
    .expect("recovered in time");
    assert!(recovered);

    commands
        .send(Command::Prompt("second".into()))
        .await
        .expect("orchestrator running");
    let mut seen = Vec::new();
    time::timeout(Duration::from_secs(30), async {
        while let Some(event) = events.recv().await {
            let done = matches!(event, BuddyEvent::TurnCompleted { .. });
            seen.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("second turn completed");

    assert!(seen.contains(&BuddyEvent::TurnStarted {
        turn: 3,
        user_text: Some("second".into())
    }));
    assert_eq!(seen.last(), Some(&BuddyEvent::TurnCompleted { turn: 3 }));
    // The first turn's late reply was dropped.
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, BuddyEvent::ResponseReady { .. }))
            .count(),
        1
    );

    drop(commands);
    let history = handle.await.expect("orchestrator task");
    assert_eq!(history.len(), 2);
}

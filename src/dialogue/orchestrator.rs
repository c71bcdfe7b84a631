use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::animation::{AnimationKind, AnimationSet, FrameCursor};
use crate::chat::ChatProvider;
use crate::error::AssistantError;
use crate::memory::ConversationHistory;
use crate::persona::{idle_chatter, offline_response, WELCOME_LINE};
use crate::speech::{Playback, SpeechError, Voice};
use crate::stage::{Position, Stage, StageError};

use super::config::OrchestratorConfig;
use super::events::{BuddyEvent, Command, TalkEndReason};
use super::state::{Phase, PresentationState, TeleportLeg};
use super::turn::{resolve_reply, speech_timeout, AssistantTurn, TurnSource};

const LOADING_CAPTION: &str = "Loading response...";

/// Results sent back by spawned work, tagged with the turn that started it.
enum Completion {
    Reply {
        turn: u64,
        user_text: String,
        result: Result<String, AssistantError>,
    },
    Speech {
        turn: u64,
        outcome: Result<Playback, SpeechError>,
    },
}

#[derive(Debug, Default)]
struct Deadlines {
    teleport: Option<Instant>,
    chatter: Option<Instant>,
    watchdog: Option<Instant>,
    speech: Option<Instant>,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Drives the character: owns the presentation state, the conversation
/// history, and every timer.
pub struct Orchestrator {
    config: OrchestratorConfig,
    animations: AnimationSet,
    assistant: Option<Arc<dyn ChatProvider>>,
    voice: Arc<dyn Voice>,
    stage: Box<dyn Stage>,
    history: ConversationHistory,
    state: PresentationState,
    deferred: VecDeque<String>,
    /// User text of the request in flight, kept for the watchdog.
    awaiting: Option<String>,
    deadlines: Deadlines,
    surface: (u32, u32),
    rng: StdRng,
    events: Option<mpsc::UnboundedSender<BuddyEvent>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: Option<mpsc::UnboundedReceiver<Completion>>,
    shutting_down: bool,
    stopped: bool,
}

impl Orchestrator {
    /// `assistant` is `None` when running offline; every prompt then gets a
    /// canned line.
    pub fn new(
        config: OrchestratorConfig,
        animations: AnimationSet,
        assistant: Option<Arc<dyn ChatProvider>>,
        voice: Arc<dyn Voice>,
        stage: Box<dyn Stage>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let surface = animations.frame_bounding_box();
        Self {
            history: ConversationHistory::with_exchanges(config.history_pairs),
            config,
            animations,
            assistant,
            voice,
            stage,
            state: PresentationState::default(),
            deferred: VecDeque::new(),
            awaiting: None,
            deadlines: Deadlines::default(),
            surface,
            rng: StdRng::from_entropy(),
            events: None,
            completions_tx,
            completions_rx: Some(completions_rx),
            shutting_down: false,
            stopped: false,
        }
    }

    /// Makes random choices (lines, positions, decorations) reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn create_event_channel(&mut self) -> mpsc::UnboundedReceiver<BuddyEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Size of the character including the caption margin.
    pub fn surface(&self) -> (u32, u32) {
        self.surface
    }

    /// Runs until a [`Command::Shutdown`] (or the command channel closing)
    /// has played the goodbye animation. Returns the conversation history.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> ConversationHistory {
        let Some(mut completions) = self.completions_rx.take() else {
            log::error!("Orchestrator can only run once");
            return self.history;
        };

        let mut frames = time::interval(self.config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.state.reset_to_idle();
        let now = Instant::now();
        self.arm_teleport(now);
        self.arm_chatter(now);
        if self.config.welcome {
            let result = self.speak_unprompted(WELCOME_LINE);
            self.settle(result);
        }

        let mut commands_open = true;
        while !self.stopped {
            let teleport = self.deadlines.teleport;
            let chatter = self.deadlines.chatter;
            let watchdog = self.deadlines.watchdog;
            let speech = self.deadlines.speech;

            let result = tokio::select! {
                _ = frames.tick() => self.on_frame_tick(),
                _ = sleep_until_opt(teleport) => self.on_teleport_timer(),
                _ = sleep_until_opt(chatter) => self.on_chatter_timer(),
                _ = sleep_until_opt(watchdog) => self.on_watchdog(),
                _ = sleep_until_opt(speech) => self.on_speech_timeout(),
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.on_command(command),
                    None => {
                        commands_open = false;
                        self.on_command(Command::Shutdown)
                    }
                },
                Some(done) = completions.recv() => self.on_completion(done),
            };
            self.settle(result);
        }

        self.emit(BuddyEvent::Stopped);
        self.history
    }

    fn emit(&self, event: BuddyEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Logs a failed handler and forces the orchestrator back to idle.
    fn settle(&mut self, result: Result<(), StageError>) {
        let Err(e) = result else {
            return;
        };
        log::error!("Presentation step failed, returning to idle: {e}");
        self.state.turn += 1;
        self.state.reset_to_idle();
        self.awaiting = None;
        self.deadlines.watchdog = None;
        self.deadlines.speech = None;
        if self.deadlines.teleport.is_none() || self.deadlines.chatter.is_none() {
            let now = Instant::now();
            self.arm_teleport(now);
            self.arm_chatter(now);
        }
        let _ = self.stage.show_caption(None);
        self.emit(BuddyEvent::Recovered {
            reason: e.to_string(),
        });
        if self.shutting_down {
            self.stopped = true;
        }
    }

    fn arm_teleport(&mut self, now: Instant) {
        if self.shutting_down {
            return;
        }
        self.deadlines.teleport = self.config.teleport_interval.map(|every| now + every);
    }

    fn arm_chatter(&mut self, now: Instant) {
        if self.shutting_down {
            return;
        }
        self.deadlines.chatter = match self.config.chatter_window {
            Some((low, high)) => {
                let low = u64::try_from(low.as_millis()).unwrap_or(u64::MAX).max(1);
                let high = u64::try_from(high.as_millis()).unwrap_or(u64::MAX).max(low);
                Some(now + Duration::from_millis(self.rng.gen_range(low..=high)))
            }
            None => None,
        };
    }

    fn on_command(&mut self, command: Command) -> Result<(), StageError> {
        match command {
            Command::Prompt(text) => {
                let text = text.trim().to_string();
                if text.is_empty() || self.shutting_down {
                    return Ok(());
                }
                if self.state.is_free() && self.deferred.is_empty() {
                    return self.start_prompt(text);
                }
                self.deferred.push_back(text.clone());
                log::debug!("Busy, deferring prompt ({} pending)", self.deferred.len());
                self.emit(BuddyEvent::PromptDeferred {
                    text,
                    pending: self.deferred.len(),
                });
                Ok(())
            }
            Command::Shutdown => self.begin_shutdown(),
        }
    }

    fn on_completion(&mut self, done: Completion) -> Result<(), StageError> {
        match done {
            Completion::Reply {
                turn,
                user_text,
                result,
            } => {
                if turn != self.state.turn || self.state.phase != Phase::AwaitingResponse {
                    log::debug!("Ignoring stale reply for turn {turn}");
                    return Ok(());
                }
                self.accept_reply(user_text, result)
            }
            Completion::Speech { turn, outcome } => {
                if turn != self.state.turn || self.state.phase != Phase::Talking {
                    log::debug!("Ignoring stale speech result for turn {turn}");
                    return Ok(());
                }
                match outcome {
                    Ok(Playback::Finished) => self.complete_talking(TalkEndReason::PlaybackFinished),
                    Ok(Playback::Detached) => {
                        log::debug!("Speech detached, talking until the timeout");
                        Ok(())
                    }
                    Err(e) => {
                        log::warn!("Speech failed, talking until the timeout: {e}");
                        Ok(())
                    }
                }
            }
        }
    }

    fn on_frame_tick(&mut self) -> Result<(), StageError> {
        match self.state.phase {
            Phase::Idle => {
                if self.state.is_free() && !self.deferred.is_empty() {
                    return self.start_next_deferred();
                }
                self.show_looping(AnimationKind::Idle)
            }
            Phase::AwaitingResponse => self.show_looping(AnimationKind::Idle),
            Phase::Talking => self.show_looping(AnimationKind::Talking),
            Phase::PlayingQueuedAnimation => self.step_queued(),
            Phase::Teleporting => self.step_teleport(),
        }
    }

    fn show_looping(&mut self, kind: AnimationKind) -> Result<(), StageError> {
        let frames = match self.animations.get(kind) {
            [] => self.animations.get(AnimationKind::Idle),
            frames => frames,
        };
        if frames.is_empty() {
            return Ok(());
        }
        if self.state.sequence != Some(kind) {
            self.state.sequence = Some(kind);
            self.state.frame_index = 0;
        }
        let index = self.state.frame_index % frames.len();
        let frame = frames[index].clone();
        self.state.frame_index = (index + 1) % frames.len();
        self.stage.show_frame(&frame)
    }

    fn begin_turn(&mut self, user_text: Option<String>) -> u64 {
        self.state.turn += 1;
        self.state.dialogue_active = true;
        self.state.phase = Phase::AwaitingResponse;
        let turn = self.state.turn;
        self.emit(BuddyEvent::TurnStarted { turn, user_text });
        turn
    }

    fn start_next_deferred(&mut self) -> Result<(), StageError> {
        if !self.state.is_free() {
            return Ok(());
        }
        match self.deferred.pop_front() {
            Some(text) => self.start_prompt(text),
            None => Ok(()),
        }
    }

    fn start_prompt(&mut self, text: String) -> Result<(), StageError> {
        let turn = self.begin_turn(Some(text.clone()));

        let Some(assistant) = self.assistant.clone() else {
            let line = offline_response(&mut self.rng);
            return self.present(AssistantTurn::canned(Some(text), line, TurnSource::Offline));
        };

        let messages = self.history.with_user_message(&text);
        let limit = self.config.request_timeout;
        let tx = self.completions_tx.clone();
        let user_text = text.clone();
        tokio::spawn(async move {
            let result = match time::timeout(limit, assistant.chat(&messages)).await {
                Ok(Ok(reply)) => Ok(reply.text().unwrap_or_default()),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(AssistantError::Timeout(
                    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                )),
            };
            let _ = tx.send(Completion::Reply {
                turn,
                user_text,
                result,
            });
        });

        self.awaiting = Some(text);
        self.deadlines.watchdog = Some(Instant::now() + limit + self.config.watchdog_grace);
        self.stage.show_caption(Some(LOADING_CAPTION))
    }

    fn speak_unprompted(&mut self, line: &str) -> Result<(), StageError> {
        self.begin_turn(None);
        self.present(AssistantTurn::canned(None, line, TurnSource::Offline))
    }

    fn accept_reply(
        &mut self,
        user_text: String,
        result: Result<String, AssistantError>,
    ) -> Result<(), StageError> {
        self.deadlines.watchdog = None;
        self.awaiting = None;
        if let Ok(raw) = &result {
            if !raw.trim().is_empty() {
                self.history.remember_exchange(user_text.clone(), raw.clone());
            }
        }
        let fallback = self
            .config
            .random_animations
            .then_some(&self.config.fallback_odds);
        let reply = resolve_reply(Some(user_text), &result, fallback, &mut self.rng);
        self.present(reply)
    }

    fn on_watchdog(&mut self) -> Result<(), StageError> {
        self.deadlines.watchdog = None;
        if self.state.phase != Phase::AwaitingResponse {
            return Ok(());
        }
        log::warn!("No reply within the watchdog deadline");
        let user_text = self.awaiting.take().unwrap_or_default();
        let waited = self.config.request_timeout + self.config.watchdog_grace;
        self.accept_reply(
            user_text,
            Err(AssistantError::Timeout(
                u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            )),
        )
    }

    fn present(&mut self, reply: AssistantTurn) -> Result<(), StageError> {
        let turn = self.state.turn;
        self.emit(BuddyEvent::ResponseReady {
            turn,
            source: reply.source,
            dialogue: reply.dialogue.clone(),
            flags: reply.flags,
        });

        self.state.phase = Phase::Talking;
        self.state.talking = true;
        self.state.sequence = Some(AnimationKind::Talking);
        self.state.frame_index = 0;
        self.state.cursor = None;
        self.state.queue = reply.flags.queued().into();
        self.deadlines.speech = Some(
            Instant::now()
                + speech_timeout(
                    &reply.dialogue,
                    self.config.speech_ms_per_word,
                    self.config.speech_min,
                ),
        );

        let voice = self.voice.clone();
        let tx = self.completions_tx.clone();
        let text = reply.dialogue.clone();
        tokio::spawn(async move {
            let outcome = voice.speak(&text).await;
            let _ = tx.send(Completion::Speech { turn, outcome });
        });

        self.emit(BuddyEvent::TalkingStarted { turn });
        self.stage.show_caption(Some(&reply.dialogue))
    }

    fn on_speech_timeout(&mut self) -> Result<(), StageError> {
        self.deadlines.speech = None;
        if self.state.phase != Phase::Talking {
            return Ok(());
        }
        self.complete_talking(TalkEndReason::TimedOut)
    }

    fn complete_talking(&mut self, reason: TalkEndReason) -> Result<(), StageError> {
        self.deadlines.speech = None;
        self.state.talking = false;
        self.state.phase = Phase::PlayingQueuedAnimation;
        self.state.cursor = None;
        self.emit(BuddyEvent::TalkingFinished {
            turn: self.state.turn,
            reason,
        });
        self.step_queued()
    }

    /// Shows the next frame of the queued one-shots. Animations without frames
    /// are skipped on the spot; an empty queue ends the turn.
    fn step_queued(&mut self) -> Result<(), StageError> {
        loop {
            let next = self
                .state
                .cursor
                .as_mut()
                .and_then(|cursor| cursor.next_frame().cloned());
            if let Some(frame) = next {
                return self.stage.show_frame(&frame);
            }

            let Some(kind) = self.state.queue.pop_front() else {
                return self.finish_turn();
            };
            let turn = self.state.turn;
            let frames = self.animations.get(kind);
            if frames.is_empty() {
                log::debug!("No frames for '{kind}', skipping");
                self.state.cursor = None;
                self.emit(BuddyEvent::AnimationSkipped {
                    turn,
                    animation: kind,
                });
                continue;
            }
            self.state.sequence = Some(kind);
            self.state.cursor = Some(FrameCursor::forward(frames));
            self.emit(BuddyEvent::AnimationStarted {
                turn,
                animation: kind,
            });
        }
    }

    fn finish_turn(&mut self) -> Result<(), StageError> {
        let turn = self.state.turn;
        self.state.reset_to_idle();
        self.deadlines.speech = None;
        self.deadlines.watchdog = None;
        if self.shutting_down {
            self.stopped = true;
            return Ok(());
        }

        self.emit(BuddyEvent::TurnCompleted { turn });
        let now = Instant::now();
        self.arm_teleport(now);
        self.arm_chatter(now);
        self.stage.show_caption(None)?;
        self.start_next_deferred()
    }

    fn on_teleport_timer(&mut self) -> Result<(), StageError> {
        self.arm_teleport(Instant::now());
        if !self.state.is_free() {
            log::debug!("Busy, skipping this teleport");
            return Ok(());
        }
        self.state.phase = Phase::Teleporting;
        self.state.teleport_leg = Some(TeleportLeg::Vanish);
        self.state.sequence = Some(AnimationKind::Arrive);
        self.state.cursor = Some(FrameCursor::reverse(
            self.animations.get(AnimationKind::Arrive),
        ));
        self.step_teleport()
    }

    fn step_teleport(&mut self) -> Result<(), StageError> {
        loop {
            let next = self
                .state
                .cursor
                .as_mut()
                .and_then(|cursor| cursor.next_frame().cloned());
            if let Some(frame) = next {
                return self.stage.show_frame(&frame);
            }

            match self.state.teleport_leg {
                Some(TeleportLeg::Vanish) => {
                    let position =
                        Position::random_within(&mut self.rng, self.config.screen, self.surface);
                    self.stage.move_to(position)?;
                    self.emit(BuddyEvent::Teleported { position });
                    self.state.teleport_leg = Some(TeleportLeg::Arrive);
                    self.state.cursor = Some(FrameCursor::forward(
                        self.animations.get(AnimationKind::Arrive),
                    ));
                }
                _ => {
                    self.state.reset_to_idle();
                    return self.start_next_deferred();
                }
            }
        }
    }

    fn on_chatter_timer(&mut self) -> Result<(), StageError> {
        self.arm_chatter(Instant::now());
        if !self.state.is_free() || !self.deferred.is_empty() {
            log::debug!("Busy, rescheduling chatter");
            return Ok(());
        }
        let line = idle_chatter(&mut self.rng);
        self.speak_unprompted(line)
    }

    fn begin_shutdown(&mut self) -> Result<(), StageError> {
        if self.shutting_down {
            return Ok(());
        }
        log::info!("Shutting down");
        self.shutting_down = true;
        self.deferred.clear();
        self.awaiting = None;
        self.deadlines = Deadlines::default();
        self.state.turn += 1;
        self.state.reset_to_idle();
        self.state.dialogue_active = true;
        self.state.phase = Phase::PlayingQueuedAnimation;
        self.state.queue.push_back(AnimationKind::Goodbye);
        self.stage.show_caption(None)?;
        self.step_queued()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use desk_buddy::animation::AnimationSet;
use desk_buddy::assistant_from_config;
use desk_buddy::chat::ChatMessage;
use desk_buddy::config::{
    resolve_config_path, try_load_config, BuddyConfig, ConfigError, LoadedConfig,
};
use desk_buddy::dialogue::{BuddyEvent, Command, Orchestrator, OrchestratorConfig};
use desk_buddy::persona::DRAG_RANT;
use desk_buddy::response::parse;
#[cfg(feature = "rodio")]
use desk_buddy::speech::RodioPlayer;
use desk_buddy::speech::{
    prepare_drag_sound, AudioCache, AudioPlayer, CachedSynthesizer, CommandPlayer, RemoteTts,
    SilentVoice, SpeechPipeline, SpeechSynthesizer, SystemTts, Voice,
};
use desk_buddy::stage::LogStage;

use crate::args::{CliArgs, CliCommand};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let path = resolve_config_path(args.config.clone());
    let (loaded, load_error) = load_or_default(&path);
    let _logger = init_logging(&loaded.config)?;
    match load_error {
        Some(e) => log::warn!("Using defaults, cannot load {}: {e}", path.display()),
        None if !loaded.exists => log::info!("No config at {}, using defaults", path.display()),
        None => log::debug!("Loaded config from {}", loaded.path.display()),
    }

    let mut config = loaded.config;
    args.apply_to(&mut config);

    if let Some(CliCommand::Check { prompt }) = &args.command {
        return check(&config, prompt).await;
    }

    let assistant = assistant_from_config(&config);
    if assistant.is_none() {
        log::info!("No assistant available, answering with canned lines");
    }
    let voice = build_voice(&config, args.mute).await?;
    let animations = AnimationSet::load(&config.asset_dirs);
    if animations.is_empty() {
        log::warn!("No animation frames found under {:?}", config.asset_dirs);
    }

    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig::from(&config),
        animations,
        assistant,
        voice,
        Box::new(LogStage::default()),
    );
    let events = orchestrator.create_event_channel();
    let (commands, rx) = mpsc::channel(16);
    let runner = tokio::spawn(orchestrator.run(rx));

    match args.prompt {
        Some(prompt) => one_shot(commands, events, prompt).await?,
        None => interactive(commands, events).await?,
    }

    let history = runner.await?;
    log::debug!("Stopped after {} remembered messages", history.len());
    Ok(())
}

/// Like `load_config`, but hands the error back so it can be logged once the
/// logger is up.
fn load_or_default(path: &Path) -> (LoadedConfig, Option<ConfigError>) {
    match try_load_config(path) {
        Ok(loaded) => (loaded, None),
        Err(e) => (
            LoadedConfig {
                config: BuddyConfig::default(),
                path: path.to_path_buf(),
                exists: false,
            },
            Some(e),
        ),
    }
}

async fn build_voice(config: &BuddyConfig, mute: bool) -> anyhow::Result<Arc<dyn Voice>> {
    if mute {
        return Ok(Arc::new(SilentVoice));
    }

    let synth: Arc<dyn SpeechSynthesizer> = if config.use_system_tts {
        Arc::new(SystemTts::new(config.system_voice.as_str()))
    } else {
        Arc::new(RemoteTts::new(
            config.tts_api_url.as_str(),
            config.tts_voice.as_str(),
            config.tts_pitch.as_str(),
            config.tts_speed.as_str(),
            config.request_timeout(),
        )?)
    };

    tokio::fs::create_dir_all(&config.audio_dir).await?;
    let cached = CachedSynthesizer::new(synth, AudioCache::new(&config.audio_dir));
    match prepare_drag_sound(&cached, DRAG_RANT).await {
        Ok(path) => log::debug!("Drag sound ready at {}", path.display()),
        Err(e) => log::warn!("Could not prepare the drag sound: {e}"),
    }

    Ok(Arc::new(SpeechPipeline::new(cached, audio_player(config)?)))
}

fn audio_player(config: &BuddyConfig) -> anyhow::Result<Arc<dyn AudioPlayer>> {
    #[cfg(feature = "rodio")]
    if config.audio_player == "rodio" {
        return Ok(Arc::new(RodioPlayer));
    }
    Ok(Arc::new(CommandPlayer::from_command_line(&config.audio_player)?))
}

fn report(event: &BuddyEvent) {
    match event {
        BuddyEvent::ResponseReady { dialogue, .. } => println!("{dialogue}"),
        BuddyEvent::PromptDeferred { pending, .. } => {
            log::info!("Busy, {pending} prompt(s) waiting")
        }
        BuddyEvent::Recovered { reason } => log::warn!("Recovered from: {reason}"),
        other => log::debug!("{other:?}"),
    }
}

/// Sends one prompt and shuts down once its turn has played out.
async fn one_shot(
    commands: mpsc::Sender<Command>,
    mut events: mpsc::UnboundedReceiver<BuddyEvent>,
    prompt: String,
) -> anyhow::Result<()> {
    commands
        .send(Command::Prompt(prompt))
        .await
        .map_err(|_| anyhow!("orchestrator stopped before the prompt was sent"))?;

    let mut ours = None;
    while let Some(event) = events.recv().await {
        report(&event);
        match event {
            BuddyEvent::TurnStarted {
                turn,
                user_text: Some(_),
            } => ours = Some(turn),
            BuddyEvent::TurnCompleted { turn } if Some(turn) == ours => break,
            BuddyEvent::Recovered { .. } | BuddyEvent::Stopped => break,
            _ => {}
        }
    }

    let _ = commands.send(Command::Shutdown).await;
    Ok(())
}

/// Feeds stdin lines to the orchestrator until EOF, `quit`, or Ctrl-C.
async fn interactive(
    commands: mpsc::Sender<Command>,
    mut events: mpsc::UnboundedReceiver<BuddyEvent>,
) -> anyhow::Result<()> {
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            report(&event);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        if commands.send(Command::Prompt(line.to_string())).await.is_err() {
            break;
        }
    }

    let _ = commands.send(Command::Shutdown).await;
    drop(commands);
    printer.await?;
    Ok(())
}

/// One round trip to the configured assistant, printed as the character
/// would understand it.
async fn check(config: &BuddyConfig, prompt: &str) -> anyhow::Result<()> {
    let Some(assistant) = assistant_from_config(config) else {
        bail!("no assistant configured: the API is disabled or the key is missing");
    };
    let messages = [ChatMessage::user().content(prompt).build()];
    let reply = tokio::time::timeout(config.request_timeout(), assistant.chat(&messages))
        .await
        .map_err(|_| anyhow!("no reply within {:?}", config.request_timeout()))??;

    let raw = reply.text().unwrap_or_default();
    let parsed = parse(&raw);
    println!("provider:   {}", assistant.name());
    println!("raw:        {raw}");
    println!("dialogue:   {}", parsed.dialogue);
    match parsed.flags {
        Some(flags) => println!("animations: {:?}", flags.queued()),
        None => println!("animations: none (no JSON object in the reply)"),
    }
    if let Some(usage) = reply.usage() {
        println!("tokens:     {}", usage.total());
    }
    Ok(())
}

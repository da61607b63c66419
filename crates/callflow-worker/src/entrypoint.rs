//! Per-call entrypoint: wires the voice services into an agent session.

use crate::config::Config;
use callflow_agent::runtime::adapters::{ConsoleSpeech, LocalRoom, RoomSpeech, SilentThinking};
use callflow_agent::{AgentSession, AgentState, SessionError, SessionOptions, SessionPorts};
use callflow_types::UserInfo;
use callflow_voice::{
    AgentVoiceClient, BackgroundAudioPlayer, ChatClient, RoomInputOptions, RoomService,
    SttService, TranscriptionEvent, TtsService, VoiceError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// First request to the model once the session is live.
const OPENING_INSTRUCTIONS: &str = "Greet the user and offer your assistance.";

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Participant identity given to caller lines typed into a room session.
const CALLER_IDENTITY: &str = "caller";

/// Runs one call in the configured LiveKit room until it ends or the process
/// is asked to stop.
///
/// Room lifecycle goes through the LiveKit server API. The media path is
/// simulated (see [`AgentVoiceClient`]): agent speech is synthesized and
/// published to the simulated track, and caller turns are read from stdin
/// and delivered as room transcripts.
pub async fn run_room(config: Config) -> Result<(), WorkerError> {
    let room_name = config.session.room.clone();
    let room_service = Arc::new(RoomService::new(config.livekit.clone()));
    if !room_service.is_enabled() {
        return Err(VoiceError::Config("LiveKit URL is not set".to_string()).into());
    }

    let room = room_service.create_room(&room_name).await?;
    info!(room = %room.name, sid = %room.sid, "room ready");

    let token = room_service.generate_join_token(
        &room_name,
        &config.session.agent_identity,
        &config.session.agent_name,
    )?;

    let stt = Arc::new(SttService::new(config.openai.clone())?);
    let input_options = RoomInputOptions {
        noise_cancellation: config.session.noise_cancellation.filter(),
    };
    let client = Arc::new(
        AgentVoiceClient::connect(room_service.url(), &token, &room_name, input_options, stt)
            .await?,
    );
    let mut transcripts = client.subscribe_transcriptions();
    warn!(room = %room_name, "media path is simulated; caller turns are read from stdin");

    let background = Arc::new(BackgroundAudioPlayer::new(
        config.background_audio.thinking_sound.clone(),
        &config.background_audio.assets_dir,
    ));

    let ports = SessionPorts {
        speech: Arc::new(RoomSpeech::new(
            TtsService::new(config.openai.clone())?,
            Arc::clone(&client),
        )),
        model: Arc::new(ChatClient::new(config.openai.clone())?),
        room: room_service,
        thinking: background.clone(),
    };

    let mut session = AgentSession::new(
        room_name.clone(),
        UserInfo::default(),
        SessionOptions {
            turn_detection: config.session.turn_detection,
        },
        ports,
    );

    session.start(AgentState::ConsentCollector).await?;
    background.start(Arc::clone(&client)).await?;
    session.generate_reply(Some(OPENING_INSTRUCTIONS)).await?;

    let agent_identity = config.session.agent_identity.as_str();
    let mut caller = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    while !session.is_closed() {
        tokio::select! {
            line = caller.next_line() => match line? {
                Some(line) => client.push_transcript(CALLER_IDENTITY, line),
                None => {
                    // Deliver anything already broadcast before hanging up.
                    while let Ok(event) = transcripts.try_recv() {
                        if session.is_closed() {
                            break;
                        }
                        handle_transcript(&mut session, agent_identity, event).await?;
                    }
                    info!(room = %room_name, "caller input closed");
                    break;
                }
            },
            event = transcripts.recv() => match event {
                Ok(event) => handle_transcript(&mut session, agent_identity, event).await?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(room = %room_name, skipped, "transcription receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            () = &mut shutdown => break,
        }
    }

    info!(room = %room_name, state = ?session.state(), "session finished");
    Ok(())
}

/// Feeds one room transcript to the session, skipping the agent's own speech.
async fn handle_transcript(
    session: &mut AgentSession,
    agent_identity: &str,
    event: TranscriptionEvent,
) -> Result<(), WorkerError> {
    if event.speaker_identity == agent_identity {
        return Ok(());
    }
    session.handle_user_turn(&event.text).await?;
    Ok(())
}

/// Runs one call over stdin/stdout, one caller utterance per line.
pub async fn run_console(config: Config) -> Result<(), WorkerError> {
    let room = Arc::new(LocalRoom::default());
    let ports = SessionPorts {
        speech: Arc::new(ConsoleSpeech::stdout()),
        model: Arc::new(ChatClient::new(config.openai.clone())?),
        room: room.clone(),
        thinking: Arc::new(SilentThinking),
    };

    let mut session = AgentSession::new(
        "console",
        UserInfo::default(),
        SessionOptions {
            turn_detection: config.session.turn_detection,
        },
        ports,
    );

    session.start(AgentState::ConsentCollector).await?;
    session.generate_reply(Some(OPENING_INSTRUCTIONS)).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        session.handle_user_turn(&line).await?;
        if session.is_closed() || room.is_deleted() {
            break;
        }
    }

    info!(state = ?session.state(), "console session finished");
    Ok(())
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT, shutting down"); }
        () = terminate => { info!("received SIGTERM, shutting down"); }
    }
}

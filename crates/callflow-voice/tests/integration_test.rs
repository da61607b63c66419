use callflow_types::{AudioConfig, BuiltinAudioClip, NoiseCancellation, TtsVoice};
use callflow_voice::{
    AgentVoiceClient, BackgroundAudioPlayer, LiveKitConfig, OpenAiConfig, RoomInputOptions,
    RoomService, SttService, TtsService, VoiceError,
};
use std::sync::Arc;

const DEFAULT_URL: &str = "http://localhost:7880";
const DEFAULT_KEY: &str = "devkey";
const DEFAULT_SECRET: &str = "secret";

async fn connected_client() -> AgentVoiceClient {
    let stt = Arc::new(SttService::new(OpenAiConfig::default()).expect("stt client"));
    AgentVoiceClient::connect(
        DEFAULT_URL,
        "token",
        "call-room",
        RoomInputOptions {
            noise_cancellation: Some(NoiseCancellation::Bvc),
        },
        stt,
    )
    .await
    .expect("connect")
}

#[tokio::test]
async fn test_generate_join_token() {
    let service = RoomService::new(LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET));
    assert!(service.is_enabled());

    let token = service
        .generate_join_token("call-room", "agent-1", "Agent")
        .expect("Failed to generate token");
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_token_grants_room_join() {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use serde::Deserialize;

    let service = RoomService::new(LiveKitConfig::new(DEFAULT_URL, DEFAULT_KEY, DEFAULT_SECRET));
    let token = service
        .generate_join_token("perm-room", "agent-perm", "Agent")
        .expect("Failed to generate token");

    #[derive(Deserialize)]
    struct Claims {
        sub: String,
        video: VideoClaims,
    }

    #[derive(Deserialize)]
    struct VideoClaims {
        room: String,
        #[serde(rename = "roomJoin")]
        room_join: bool,
        #[serde(rename = "canPublish")]
        can_publish: bool,
    }

    let validation = Validation::new(Algorithm::HS256);
    let key = DecodingKey::from_secret(DEFAULT_SECRET.as_bytes());
    let data = decode::<Claims>(&token, &key, &validation).expect("Failed to decode token");

    assert_eq!(data.claims.sub, "agent-perm");
    assert_eq!(data.claims.video.room, "perm-room");
    assert!(data.claims.video.room_join);
    assert!(data.claims.video.can_publish);
}

#[test]
fn test_room_service_disabled_without_url() {
    let service = RoomService::new(LiveKitConfig::default());
    assert!(!service.is_enabled());
}

#[tokio::test]
async fn test_connect_requires_url() {
    let stt = Arc::new(SttService::new(OpenAiConfig::default()).unwrap());
    let result =
        AgentVoiceClient::connect("", "token", "room", RoomInputOptions::default(), stt).await;
    assert!(matches!(result, Err(VoiceError::Config(_))));
}

#[tokio::test]
async fn test_publish_after_disconnect_fails() {
    let mut client = connected_client().await;
    assert_eq!(
        client.input_options.noise_cancellation,
        Some(NoiseCancellation::Bvc)
    );

    client.publish_audio(&[0u8; 64]).await.unwrap();
    assert_eq!(client.published_bytes(), 64);

    client.disconnect().await;
    let result = client.publish_audio(&[0u8; 64]).await;
    assert!(matches!(result, Err(VoiceError::RoomService(_))));
}

#[tokio::test]
async fn test_transcripts_reach_subscribers() {
    let client = connected_client().await;
    let mut rx = client.subscribe_transcriptions();

    client.push_transcript("caller", "yes, you may record");

    let event = rx.recv().await.unwrap();
    assert_eq!(event.room_name, "call-room");
    assert_eq!(event.speaker_identity, "caller");
    assert_eq!(event.text, "yes, you may record");
}

#[tokio::test]
async fn test_background_audio_publishes_thinking_clip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let clip = BuiltinAudioClip::KeyboardTyping;
    std::fs::write(temp_dir.path().join(clip.file_name()), [0u8; 32]).unwrap();

    let client = Arc::new(connected_client().await);
    let player = BackgroundAudioPlayer::new(vec![AudioConfig::new(clip, 0.8)], temp_dir.path());
    player.start(Arc::clone(&client)).await.unwrap();

    player.thinking_started().await.unwrap();
    assert!(player.is_thinking());
    assert_eq!(client.published_bytes(), 32);

    // Already thinking: no second clip.
    player.thinking_started().await.unwrap();
    assert_eq!(client.published_bytes(), 32);

    player.thinking_stopped();
    assert!(!player.is_thinking());
}

#[tokio::test]
async fn test_background_audio_clears_thinking_when_publish_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let clip = BuiltinAudioClip::KeyboardTyping;
    std::fs::write(temp_dir.path().join(clip.file_name()), [0u8; 32]).unwrap();

    let mut client = connected_client().await;
    client.disconnect().await;
    let player = BackgroundAudioPlayer::new(vec![AudioConfig::new(clip, 1.0)], temp_dir.path());
    player.start(Arc::new(client)).await.unwrap();

    let result = player.thinking_started().await;
    assert!(matches!(result, Err(VoiceError::RoomService(_))));
    assert!(!player.is_thinking());
}

#[tokio::test]
async fn test_background_audio_skips_missing_clip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let client = Arc::new(connected_client().await);
    let player = BackgroundAudioPlayer::new(
        vec![AudioConfig::new(BuiltinAudioClip::KeyboardTyping2, 0.7)],
        temp_dir.path(),
    );
    player.start(Arc::clone(&client)).await.unwrap();

    player.thinking_started().await.unwrap();
    assert_eq!(client.published_bytes(), 0);
}

#[tokio::test]
async fn test_background_audio_rejects_bad_volume() {
    let client = Arc::new(connected_client().await);
    let player = BackgroundAudioPlayer::new(
        vec![AudioConfig::new(BuiltinAudioClip::KeyboardTyping, 1.5)],
        "assets/audio",
    );
    let result = player.start(client).await;
    assert!(matches!(result, Err(VoiceError::Config(_))));
}

#[tokio::test]
async fn test_tts_requires_api_key() {
    let service = TtsService::new(OpenAiConfig::default()).unwrap();
    let result = service.synthesize("Hello", TtsVoice::Ash).await;
    assert!(matches!(result, Err(VoiceError::Config(_))));
}

#[tokio::test]
async fn test_tts_rejects_oversized_text() {
    let service = TtsService::new(OpenAiConfig::new("sk-test")).unwrap();
    let text = "a".repeat(5000);
    match service.synthesize(&text, TtsVoice::Sage).await {
        Err(VoiceError::Tts(msg)) => assert!(msg.contains("exceeds maximum size")),
        other => panic!("Expected Tts size error, got {:?}", other),
    }
}

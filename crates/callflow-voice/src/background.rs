//! Background audio played while the agent is thinking.

use crate::agent::AgentVoiceClient;
use crate::error::VoiceError;
use callflow_types::{AudioConfig, BuiltinAudioClip};
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Plays one of the configured "thinking" clips whenever the agent waits on
/// the dialogue model.
#[derive(Debug)]
pub struct BackgroundAudioPlayer {
    thinking_sound: Vec<AudioConfig>,
    assets_dir: PathBuf,
    clips: RwLock<HashMap<BuiltinAudioClip, Arc<Vec<u8>>>>,
    client: RwLock<Option<Arc<AgentVoiceClient>>>,
    thinking: AtomicBool,
}

impl BackgroundAudioPlayer {
    pub fn new(thinking_sound: Vec<AudioConfig>, assets_dir: impl AsRef<Path>) -> Self {
        Self {
            thinking_sound,
            assets_dir: assets_dir.as_ref().to_path_buf(),
            clips: RwLock::new(HashMap::new()),
            client: RwLock::new(None),
            thinking: AtomicBool::new(false),
        }
    }

    pub fn thinking_sound(&self) -> &[AudioConfig] {
        &self.thinking_sound
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.load(Ordering::Acquire)
    }

    /// Attaches the player to the agent's room participant.
    pub async fn start(&self, client: Arc<AgentVoiceClient>) -> Result<(), VoiceError> {
        for cfg in &self.thinking_sound {
            if !(0.0..=1.0).contains(&cfg.volume) {
                return Err(VoiceError::Config(format!(
                    "volume for {:?} must be between 0.0 and 1.0, got {}",
                    cfg.clip, cfg.volume
                )));
            }
        }
        debug!(
            room = %client.room_name,
            clips = self.thinking_sound.len(),
            "background audio started"
        );
        *self.client.write().await = Some(client);
        Ok(())
    }

    /// Starts a thinking clip. A missing clip asset is logged and skipped.
    pub async fn thinking_started(&self) -> Result<(), VoiceError> {
        if self.thinking.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let client = match self.client.read().await.clone() {
            Some(client) => client,
            None => return Ok(()),
        };

        let Some(choice) = select_clip(&self.thinking_sound, &mut rand::thread_rng()) else {
            return Ok(());
        };

        let pcm = match self.load_clip(choice.clip).await {
            Ok(pcm) => pcm,
            Err(e) => {
                warn!(clip = ?choice.clip, error = %e, "thinking clip unavailable");
                return Ok(());
            }
        };

        let published = client.publish_audio(&apply_volume(&pcm, choice.volume)).await;
        if published.is_err() {
            self.thinking.store(false, Ordering::Release);
        }
        published
    }

    pub fn thinking_stopped(&self) {
        self.thinking.store(false, Ordering::Release);
    }

    async fn load_clip(&self, clip: BuiltinAudioClip) -> Result<Arc<Vec<u8>>, VoiceError> {
        if let Some(pcm) = self.clips.read().await.get(&clip) {
            return Ok(Arc::clone(pcm));
        }

        let path = self.assets_dir.join(clip.file_name());
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| VoiceError::Audio(format!("Failed to read {:?}: {}", path, e)))?;
        let pcm = Arc::new(bytes);
        self.clips.write().await.insert(clip, Arc::clone(&pcm));
        Ok(pcm)
    }
}

/// Picks a clip with probability proportional to its `probability` weight.
///
/// Returns `None` when no clip has a positive weight.
pub fn select_clip<R: Rng + ?Sized>(choices: &[AudioConfig], rng: &mut R) -> Option<AudioConfig> {
    let total: f32 = choices
        .iter()
        .map(|c| c.probability.max(0.0))
        .sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.gen_range(0.0..total);
    for choice in choices {
        let weight = choice.probability.max(0.0);
        if roll < weight {
            return Some(*choice);
        }
        roll -= weight;
    }
    choices.iter().rev().find(|c| c.probability > 0.0).copied()
}

/// Scales s16le samples by `volume`, saturating at the sample range.
pub fn apply_volume(pcm: &[u8], volume: f32) -> Vec<u8> {
    pcm.chunks_exact(2)
        .flat_map(|chunk| {
            let sample = f32::from(i16::from_le_bytes([chunk[0], chunk[1]])) * volume;
            (sample.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16).to_le_bytes()
        })
        .collect()
}

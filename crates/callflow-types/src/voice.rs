//! Voice and audio settings handed to the speech collaborators.
//!
//! These types describe *which* external model or clip to use; synthesis,
//! recognition and mixing happen outside this workspace.

use serde::{Deserialize, Serialize};

/// Voices offered by the text-to-speech model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsVoice {
    #[default]
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Fable,
    Nova,
    Onyx,
    Sage,
    Shimmer,
}

impl TtsVoice {
    /// Returns the voice name as the speech API expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Nova => "nova",
            Self::Onyx => "onyx",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
        }
    }
}

impl std::fmt::Display for TtsVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Noise cancellation applied to inbound audio by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseCancellation {
    /// Background voice cancellation.
    Bvc,
    /// Background voice cancellation tuned for telephony audio.
    BvcTelephony,
}

/// Strategy the transport uses to decide that the caller finished speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDetection {
    /// Multilingual end-of-utterance model.
    #[default]
    Multilingual,
    /// Silence-based detection from voice activity only.
    Vad,
    /// End of turn as reported by the speech-to-text stream.
    Stt,
}

/// Audio clips bundled with the background-audio player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinAudioClip {
    OfficeAmbience,
    CityAmbience,
    ForestAmbience,
    CrowdedRoom,
    KeyboardTyping,
    KeyboardTyping2,
}

impl BuiltinAudioClip {
    /// File name of the raw PCM asset for this clip.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::OfficeAmbience => "office-ambience.pcm",
            Self::CityAmbience => "city-ambience.pcm",
            Self::ForestAmbience => "forest-ambience.pcm",
            Self::CrowdedRoom => "crowded-room.pcm",
            Self::KeyboardTyping => "keyboard-typing.pcm",
            Self::KeyboardTyping2 => "keyboard-typing2.pcm",
        }
    }
}

fn default_volume() -> f32 {
    1.0
}

fn default_probability() -> f32 {
    1.0
}

/// A clip with its playback volume and relative selection weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub clip: BuiltinAudioClip,
    /// Linear gain, 1.0 is unchanged.
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Relative weight when several clips are configured for one slot.
    #[serde(default = "default_probability")]
    pub probability: f32,
}

impl AudioConfig {
    pub fn new(clip: BuiltinAudioClip, volume: f32) -> Self {
        Self {
            clip,
            volume,
            probability: default_probability(),
        }
    }
}

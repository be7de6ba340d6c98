/// Effect profiles
///
/// A profile bundles a sound asset, a light pattern and a duration. The
/// table holds one profile per situation the prop reacts to.
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detection::Verdict;

/// Situations the prop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Intro effect played once before polling starts
    Startup,

    /// Short cue while the camera looks into the bucket
    Pending,

    /// Candy was dropped in
    Treat,

    /// Something other than candy was dropped in
    Trick,

    /// Motion without a classification result
    Motion,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Startup => write!(f, "Startup"),
            ProfileKind::Pending => write!(f, "Pending"),
            ProfileKind::Treat => write!(f, "Treat"),
            ProfileKind::Trick => write!(f, "Trick"),
            ProfileKind::Motion => write!(f, "Motion"),
        }
    }
}

impl From<Verdict> for ProfileKind {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Treat => ProfileKind::Treat,
            Verdict::Trick => ProfileKind::Trick,
            Verdict::Nothing => ProfileKind::Motion,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    0.5
}

/// One light + sound effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectProfile {
    /// Sound to play (relative paths resolve against the config directory)
    pub sound_asset: PathBuf,

    /// Light pattern name understood by the light actuator
    pub light_pattern: String,

    /// How long the lights run before they are stopped
    pub duration_ms: u64,

    /// Whether the lights animate at all
    #[serde(default = "default_true")]
    pub has_animation: bool,

    /// Playback volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl EffectProfile {
    pub fn new(sound_asset: impl Into<PathBuf>, light_pattern: &str, duration_ms: u64) -> Self {
        Self {
            sound_asset: sound_asset.into(),
            light_pattern: light_pattern.to_string(),
            duration_ms,
            has_animation: true,
            volume: default_volume(),
        }
    }

    /// Sound only, lights stay dark
    pub fn sound_only(mut self) -> Self {
        self.has_animation = false;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    fn resolved(&self, base: &Path) -> Self {
        let mut profile = self.clone();
        if profile.sound_asset.is_relative() {
            profile.sound_asset = base.join(&profile.sound_asset);
        }
        profile
    }
}

/// The fixed set of profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTable {
    pub startup: EffectProfile,

    /// Optional cue; only used when a classifier is present
    #[serde(default)]
    pub pending: Option<EffectProfile>,

    pub treat: EffectProfile,
    pub trick: EffectProfile,
    pub motion: EffectProfile,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            startup: EffectProfile::new("assets/trick_or_treat.wav", "pulse", 5000),
            pending: Some(EffectProfile::new("assets/ghost_woo.mp3", "solid", 0).sound_only()),
            treat: EffectProfile::new("assets/treat.wav", "chase", 5000),
            trick: EffectProfile::new("assets/trick.mp3", "flicker", 3000).sound_only(),
            motion: EffectProfile::new("assets/ghostly_whisper.mp3", "flicker", 5000),
        }
    }
}

impl ProfileTable {
    /// Look up the profile for a situation
    pub fn get(&self, kind: ProfileKind) -> Option<&EffectProfile> {
        match kind {
            ProfileKind::Startup => Some(&self.startup),
            ProfileKind::Pending => self.pending.as_ref(),
            ProfileKind::Treat => Some(&self.treat),
            ProfileKind::Trick => Some(&self.trick),
            ProfileKind::Motion => Some(&self.motion),
        }
    }

    /// Every configured profile with its kind
    pub fn iter(&self) -> impl Iterator<Item = (ProfileKind, &EffectProfile)> {
        [
            ProfileKind::Startup,
            ProfileKind::Pending,
            ProfileKind::Treat,
            ProfileKind::Trick,
            ProfileKind::Motion,
        ]
        .into_iter()
        .filter_map(move |kind| self.get(kind).map(|p| (kind, p)))
    }

    /// Copy of the table with relative sound paths joined onto `base`
    pub fn resolve_assets(&self, base: &Path) -> Self {
        Self {
            startup: self.startup.resolved(base),
            pending: self.pending.as_ref().map(|p| p.resolved(base)),
            treat: self.treat.resolved(base),
            trick: self.trick.resolved(base),
            motion: self.motion.resolved(base),
        }
    }
}

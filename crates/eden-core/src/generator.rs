//! Generator kinds and their request settings.
//!
//! The gateway runs a closed set of generators. Each kind carries its own
//! request payload and determines what a polled snapshot can contain:
//! whether intermediate previews are reported while the task runs, and
//! whether the final result can be a video.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of generators the gateway can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// CLIP-guided image/video generation.
    #[serde(rename = "eden-clipx")]
    EdenClipX,
    /// Latent diffusion image/video generation.
    #[serde(rename = "stable-diffusion")]
    StableDiffusion,
    /// Text oracle; produces a single still rendering.
    #[serde(rename = "oracle")]
    Oracle,
}

impl GeneratorKind {
    /// Name of this generator on the gateway wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::EdenClipX => "eden-clipx",
            Self::StableDiffusion => "stable-diffusion",
            Self::Oracle => "oracle",
        }
    }

    /// Whether this generator reports intermediate previews while running.
    pub fn reports_previews(&self) -> bool {
        matches!(self, Self::EdenClipX | Self::StableDiffusion)
    }

    /// Whether this generator can finish with a video result.
    pub fn may_produce_video(&self) -> bool {
        matches!(self, Self::EdenClipX | Self::StableDiffusion)
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Where a creation request came from: the chat origin and the user,
/// guild, and channel that asked for it. Submitted verbatim with the
/// request so the gateway can attribute work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContext {
    /// Originating surface, e.g. `discord`.
    pub origin: String,
    /// Author id on the originating surface.
    pub author: u64,
    /// Author display name.
    pub author_name: String,
    /// Guild/server id.
    pub guild: u64,
    /// Guild/server name.
    pub guild_name: String,
    /// Channel id.
    pub channel: u64,
    /// Channel name.
    pub channel_name: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            author: 0,
            author_name: String::new(),
            guild: 0,
            guild_name: String::new(),
            channel: 0,
            channel_name: String::new(),
        }
    }

    /// Builder method to set the author.
    pub fn with_author(mut self, id: u64, name: impl Into<String>) -> Self {
        self.author = id;
        self.author_name = name.into();
        self
    }

    /// Builder method to set the guild.
    pub fn with_guild(mut self, id: u64, name: impl Into<String>) -> Self {
        self.guild = id;
        self.guild_name = name.into();
        self
    }

    /// Builder method to set the channel.
    pub fn with_channel(mut self, id: u64, name: impl Into<String>) -> Self {
        self.channel = id;
        self.channel_name = name.into();
        self
    }
}

/// Request settings for the CLIP-guided generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdenClipXSettings {
    /// Prompt text.
    pub text_input: String,
    /// Optional guide image URL.
    pub image_url: String,
    /// Multiplier on the iteration schedule.
    pub step_multiplier: f64,
    /// Fraction of pixels the color target applies to.
    pub color_target_pixel_fraction: f64,
    /// Weight of the color loss term.
    pub color_loss_f: f64,
    /// RGB color target.
    pub color_rgb_target: (f64, f64, f64),
    /// Weight of the guide image.
    pub image_weight: f64,
    /// Number of permuted prompts to add (-1 = generator default).
    pub n_permuted_prompts_to_add: i32,
    /// Output width (0 = generator default).
    pub width: u32,
    /// Output height (0 = generator default).
    pub height: u32,
    /// Number of octaves.
    pub num_octaves: u32,
    /// Scale factor between octaves.
    pub octave_scale: f64,
    /// CLIP model ensemble per octave.
    pub clip_model_options: Vec<Vec<String>>,
    /// Iterations per octave.
    pub num_iterations: Vec<u32>,
}

impl EdenClipXSettings {
    /// Create settings for a prompt with generator defaults.
    pub fn new(text_input: impl Into<String>) -> Self {
        Self {
            text_input: text_input.into(),
            image_url: String::new(),
            step_multiplier: 1.0,
            color_target_pixel_fraction: 0.75,
            color_loss_f: 0.0,
            color_rgb_target: (0.0, 0.0, 0.0),
            image_weight: 0.35,
            n_permuted_prompts_to_add: -1,
            width: 0,
            height: 0,
            num_octaves: 3,
            octave_scale: 2.0,
            clip_model_options: vec![vec![
                "ViT-B/32".to_string(),
                "ViT-B/16".to_string(),
                "RN50".to_string(),
            ]],
            num_iterations: vec![100, 200, 300],
        }
    }

    /// Builder method to set a guide image.
    pub fn with_image(mut self, url: impl Into<String>, weight: f64) -> Self {
        self.image_url = url.into();
        self.image_weight = weight;
        self
    }

    /// Builder method to set the output size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Request settings for the latent diffusion generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StableDiffusionSettings {
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Prompt text.
    pub text_input: String,
    /// Generation mode, e.g. `generate` or `interpolate`.
    pub mode: String,
    /// Sampling seed.
    pub seed: i64,
    /// Reuse the same start code across samples.
    pub fixed_code: bool,
    /// Prompts to interpolate between in `interpolate` mode.
    pub interpolation_texts: Vec<String>,
    /// Frames per interpolation segment.
    pub n_interpolate: u32,
    /// DDIM sampling steps.
    pub ddim_steps: u32,
    /// Use PLMS sampling instead of DDIM.
    pub plms: bool,
    /// Latent channels.
    #[serde(rename = "C")]
    pub latent_channels: u32,
    /// Downsampling factor.
    #[serde(rename = "f")]
    pub downsample_factor: u32,
}

impl StableDiffusionSettings {
    /// Create settings for a prompt at the given output size.
    pub fn new(width: u32, height: u32, text_input: impl Into<String>) -> Self {
        Self {
            width,
            height,
            text_input: text_input.into(),
            mode: "generate".to_string(),
            seed: 42,
            fixed_code: false,
            interpolation_texts: Vec::new(),
            n_interpolate: 10,
            ddim_steps: 50,
            plms: false,
            latent_channels: 4,
            downsample_factor: 8,
        }
    }

    /// Builder method to set the seed.
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to switch to interpolation mode.
    pub fn with_interpolation(mut self, texts: Vec<String>) -> Self {
        self.mode = "interpolate".to_string();
        self.interpolation_texts = texts;
        self
    }
}

/// Request settings for the text oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Question text.
    pub text_input: String,
}

impl OracleSettings {
    /// Create settings for a question.
    pub fn new(text_input: impl Into<String>) -> Self {
        Self {
            text_input: text_input.into(),
        }
    }
}

/// A generator request: the kind plus its settings, serialized as the
/// bare settings object on the wire (the kind travels separately as
/// `generator_name`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeneratorConfig {
    /// CLIP-guided generation.
    EdenClipX(EdenClipXSettings),
    /// Latent diffusion generation.
    StableDiffusion(StableDiffusionSettings),
    /// Text oracle.
    Oracle(OracleSettings),
}

impl GeneratorConfig {
    /// The generator kind this config targets.
    pub fn kind(&self) -> GeneratorKind {
        match self {
            Self::EdenClipX(_) => GeneratorKind::EdenClipX,
            Self::StableDiffusion(_) => GeneratorKind::StableDiffusion,
            Self::Oracle(_) => GeneratorKind::Oracle,
        }
    }
}

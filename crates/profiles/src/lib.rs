//! Scene profile configuration.
//!
//! A profile is a versioned TOML document naming one or more scenes, each a
//! color pair plus backdrop and scroll tuning. The binary resolves one scene
//! against the `[defaults]` section and maps the result onto renderer/motion
//! parameters; this crate knows nothing about either.
//!
//! ```toml
//! version = 1
//!
//! [defaults]
//! easing = 0.14
//! wheel_multiplier = 1.0
//!
//! [scenes.nature]
//! top_color = "#29ff90"
//! bottom_color = "#a09eff"
//! intensity = 0.9
//! blend = "screen"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read profile at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported profile version {0} (expected {PROFILE_VERSION})")]
    UnsupportedVersion(u32),
    #[error("unknown scene '{0}'")]
    UnknownScene(String),
    #[error("invalid profile: {0}")]
    Invalid(String),
}

/// Only document version this build understands.
pub const PROFILE_VERSION: u32 = 1;

/// Compositing mode a scene requests for the backdrop layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendSetting {
    Normal,
    Screen,
    Additive,
}

impl Default for BlendSetting {
    fn default() -> Self {
        Self::Screen
    }
}

/// An sRGB color parsed from `#rrggbb`, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexColor(pub [f32; 3]);

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let [r, g, b] = self.0.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
        serializer.serialize_str(&format!("#{r:02x}{g:02x}{b:02x}"))
    }
}

impl HexColor {
    /// Parses `#rrggbb` (leading `#` optional) into unit-range components.
    pub fn parse(text: &str) -> Result<Self, ProfileError> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ProfileError::Invalid(format!(
                "color '{text}' is not of the form #rrggbb"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map(|v| v as f32 / 255.0)
        };
        let r = channel(0..2).map_err(|_| invalid_color(text))?;
        let g = channel(2..4).map_err(|_| invalid_color(text))?;
        let b = channel(4..6).map_err(|_| invalid_color(text))?;
        Ok(Self([r, g, b]))
    }
}

fn invalid_color(text: &str) -> ProfileError {
    ProfileError::Invalid(format!("color '{text}' is not of the form #rrggbb"))
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = HexColor;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a hex color string like \"#29ff90\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                HexColor::parse(v).map_err(|err| E::custom(err.to_string()))
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}

/// Top-level profile document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileDoc {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneProfile>,
}

/// Workspace-wide tuning applied underneath every scene.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    /// Optional FPS cap for the render loop; None renders every paint
    /// callback up to the pacer's built-in target.
    pub fps: Option<f32>,
    /// Inertial easing factor in (0, 1).
    pub easing: Option<f32>,
    /// Scale applied to wheel deltas.
    pub wheel_multiplier: Option<f32>,
}

/// One scene's backdrop description. All fields default to the stock
/// "nature" look so a profile only has to name what it changes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneProfile {
    #[serde(default = "default_top_color")]
    pub top_color: HexColor,
    #[serde(default = "default_bottom_color")]
    pub bottom_color: HexColor,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default = "default_glow")]
    pub glow: f32,
    #[serde(default = "default_noise")]
    pub noise: f32,
    #[serde(default = "default_pillar_width")]
    pub pillar_width: f32,
    #[serde(default = "default_pillar_height")]
    pub pillar_height: f32,
    #[serde(default)]
    pub pillar_rotation: f32,
    #[serde(default)]
    pub blend: BlendSetting,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_opacity")]
    pub haze_opacity: f32,
}

impl Default for SceneProfile {
    fn default() -> Self {
        Self {
            top_color: default_top_color(),
            bottom_color: default_bottom_color(),
            intensity: default_intensity(),
            rotation_speed: default_rotation_speed(),
            interactive: false,
            glow: default_glow(),
            noise: default_noise(),
            pillar_width: default_pillar_width(),
            pillar_height: default_pillar_height(),
            pillar_rotation: 0.0,
            blend: BlendSetting::default(),
            opacity: default_opacity(),
            haze_opacity: default_opacity(),
        }
    }
}

fn default_top_color() -> HexColor {
    HexColor([0x29 as f32 / 255.0, 1.0, 0x90 as f32 / 255.0])
}

fn default_bottom_color() -> HexColor {
    HexColor([0xa0 as f32 / 255.0, 0x9e as f32 / 255.0, 1.0])
}

fn default_intensity() -> f32 {
    0.9
}

fn default_rotation_speed() -> f32 {
    0.25
}

fn default_glow() -> f32 {
    0.005
}

fn default_noise() -> f32 {
    0.45
}

fn default_pillar_width() -> f32 {
    3.0
}

fn default_pillar_height() -> f32 {
    0.4
}

fn default_opacity() -> f32 {
    0.55
}

/// A scene flattened over the document defaults, ready to map onto the
/// renderer and motion crates.
#[derive(Debug, Clone)]
pub struct ResolvedScene {
    pub id: String,
    pub scene: SceneProfile,
    pub fps: Option<f32>,
    pub easing: f32,
    pub wheel_multiplier: f32,
}

impl ProfileDoc {
    /// Parses and validates a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ProfileError> {
        let doc: ProfileDoc = toml::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Reads a profile from disk.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// The profile compiled into the binary; always parses.
    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_PROFILE).expect("builtin profile must parse")
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.version != PROFILE_VERSION {
            return Err(ProfileError::UnsupportedVersion(self.version));
        }
        if let Some(easing) = self.defaults.easing {
            if !(easing > 0.0 && easing < 1.0) {
                return Err(ProfileError::Invalid(format!(
                    "defaults.easing must lie in (0, 1), got {easing}"
                )));
            }
        }
        if let Some(multiplier) = self.defaults.wheel_multiplier {
            if !multiplier.is_finite() {
                return Err(ProfileError::Invalid(
                    "defaults.wheel_multiplier must be finite".into(),
                ));
            }
        }
        for (id, scene) in &self.scenes {
            for (field, value) in [
                ("intensity", scene.intensity),
                ("glow", scene.glow),
                ("noise", scene.noise),
                ("pillar_width", scene.pillar_width),
                ("pillar_height", scene.pillar_height),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ProfileError::Invalid(format!(
                        "scene '{id}': {field} must be a non-negative number, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Flattens `scene_id` over the defaults. Opacity-like scalars are
    /// clamped into `[0, 1]` here so downstream layers can rely on range.
    pub fn resolve(&self, scene_id: &str) -> Result<ResolvedScene, ProfileError> {
        let mut scene = self
            .scenes
            .get(scene_id)
            .cloned()
            .ok_or_else(|| ProfileError::UnknownScene(scene_id.to_string()))?;
        scene.opacity = scene.opacity.clamp(0.0, 1.0);
        scene.haze_opacity = scene.haze_opacity.clamp(0.0, 1.0);

        Ok(ResolvedScene {
            id: scene_id.to_string(),
            scene,
            fps: self.defaults.fps.filter(|fps| *fps > 0.0),
            easing: self.defaults.easing.unwrap_or(0.14),
            wheel_multiplier: self.defaults.wheel_multiplier.unwrap_or(1.0),
        })
    }

    /// Scene ids in document order, for diagnostics.
    pub fn scene_ids(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }
}

/// Stock scenes shipped with the binary. "nature" mirrors the default
/// backdrop look; the others exist so profile switching has somewhere to go.
const BUILTIN_PROFILE: &str = r##"
version = 1

[defaults]
easing = 0.14
wheel_multiplier = 1.0

[scenes.nature]
top_color = "#29ff90"
bottom_color = "#a09eff"
intensity = 0.9
rotation_speed = 0.25
blend = "screen"

[scenes.ember]
top_color = "#ff9429"
bottom_color = "#ff5e62"
intensity = 1.1
rotation_speed = 0.4
pillar_width = 2.2
blend = "additive"

[scenes.void]
top_color = "#9e9eff"
bottom_color = "#2b2b4a"
intensity = 0.7
rotation_speed = 0.12
noise = 0.6
opacity = 0.45
haze_opacity = 0.6
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profile_parses_and_resolves() {
        let doc = ProfileDoc::builtin();
        assert_eq!(doc.version, PROFILE_VERSION);
        let nature = doc.resolve("nature").expect("nature scene");
        assert_eq!(nature.id, "nature");
        assert!((nature.easing - 0.14).abs() < 1e-6);
        assert_eq!(nature.scene.blend, BlendSetting::Screen);
    }

    #[test]
    fn hex_colors_parse_to_unit_components() {
        let color = HexColor::parse("#29ff90").unwrap();
        assert!((color.0[0] - 0x29 as f32 / 255.0).abs() < 1e-6);
        assert!((color.0[1] - 1.0).abs() < 1e-6);
        assert!((color.0[2] - 0x90 as f32 / 255.0).abs() < 1e-6);

        assert!(HexColor::parse("29ff90").is_ok());
        assert!(HexColor::parse("#29ff9").is_err());
        assert!(HexColor::parse("#zzzzzz").is_err());
    }

    #[test]
    fn unknown_scene_is_reported_by_name() {
        let doc = ProfileDoc::builtin();
        let err = doc.resolve("missing").unwrap_err();
        assert!(matches!(err, ProfileError::UnknownScene(ref id) if id == "missing"));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let err = ProfileDoc::from_toml("version = 7\n").unwrap_err();
        assert!(matches!(err, ProfileError::UnsupportedVersion(7)));
    }

    #[test]
    fn out_of_range_easing_is_rejected() {
        let text = "version = 1\n[defaults]\neasing = 1.5\n";
        assert!(matches!(
            ProfileDoc::from_toml(text),
            Err(ProfileError::Invalid(_))
        ));
    }

    #[test]
    fn negative_scalars_are_rejected() {
        let text = r##"
version = 1
[scenes.bad]
intensity = -0.5
"##;
        assert!(matches!(
            ProfileDoc::from_toml(text),
            Err(ProfileError::Invalid(_))
        ));
    }

    #[test]
    fn resolve_clamps_opacities() {
        let text = r##"
version = 1
[scenes.hot]
opacity = 3.0
haze_opacity = -1.0
"##;
        let doc = ProfileDoc::from_toml(text).unwrap();
        let resolved = doc.resolve("hot").unwrap();
        assert_eq!(resolved.scene.opacity, 1.0);
        assert_eq!(resolved.scene.haze_opacity, 0.0);
    }

    #[test]
    fn scene_defaults_fill_missing_fields() {
        let text = r##"
version = 1
[scenes.bare]
"##;
        let doc = ProfileDoc::from_toml(text).unwrap();
        let bare = doc.resolve("bare").unwrap();
        assert!((bare.scene.pillar_width - 3.0).abs() < 1e-6);
        assert!((bare.scene.opacity - 0.55).abs() < 1e-6);
        assert!(!bare.scene.interactive);
    }
}

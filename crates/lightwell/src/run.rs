use anyhow::{Context, Result};
use motion::InertiaOptions;
use profiles::{BlendSetting, ProfileDoc, ResolvedScene};
use renderer::{BlendMode, PillarParams};
use tracing_subscriber::EnvFilter;

use crate::cli::{self, Cli};
use crate::viewer::{self, ViewerConfig};

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();

    let doc = match args.profile.as_ref() {
        Some(path) => ProfileDoc::load(path)
            .with_context(|| format!("failed to load profile {}", path.display()))?,
        None => ProfileDoc::builtin(),
    };

    let resolved = doc.resolve(&args.scene).with_context(|| {
        format!(
            "scene '{}' is not defined (available: {})",
            args.scene,
            doc.scene_ids().collect::<Vec<_>>().join(", ")
        )
    })?;

    let (width, height) = cli::parse_surface_size(&args.size)?;
    tracing::info!(scene = %resolved.id, width, height, "starting lightwell viewer");

    viewer::run(ViewerConfig {
        scene_id: resolved.id.clone(),
        params: pillar_params(&resolved),
        inertia: inertia_options(&resolved, &args),
        size: (width, height),
        fps: args.fps.or(resolved.fps),
        reduced_motion: args.reduced_motion,
        haze_out: args.haze_out,
    })
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Flattens a resolved profile scene onto the renderer's parameter set.
fn pillar_params(resolved: &ResolvedScene) -> PillarParams {
    let scene = &resolved.scene;
    PillarParams {
        top_color: scene.top_color.0,
        bottom_color: scene.bottom_color.0,
        intensity: scene.intensity,
        rotation_speed: scene.rotation_speed,
        interactive: scene.interactive,
        glow: scene.glow,
        noise: scene.noise,
        pillar_width: scene.pillar_width,
        pillar_height: scene.pillar_height,
        pillar_rotation: scene.pillar_rotation,
        blend: map_blend(scene.blend),
        opacity: scene.opacity,
        haze_opacity: scene.haze_opacity,
    }
}

fn map_blend(setting: BlendSetting) -> BlendMode {
    match setting {
        BlendSetting::Normal => BlendMode::Normal,
        BlendSetting::Screen => BlendMode::Screen,
        BlendSetting::Additive => BlendMode::Additive,
    }
}

fn inertia_options(resolved: &ResolvedScene, args: &Cli) -> InertiaOptions {
    InertiaOptions {
        enabled: !args.no_inertia,
        reduced_motion: args.reduced_motion,
        easing: resolved.easing,
        wheel_multiplier: resolved.wheel_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn blend_settings_map_one_to_one() {
        assert_eq!(map_blend(BlendSetting::Normal), BlendMode::Normal);
        assert_eq!(map_blend(BlendSetting::Screen), BlendMode::Screen);
        assert_eq!(map_blend(BlendSetting::Additive), BlendMode::Additive);
    }

    #[test]
    fn builtin_nature_scene_flattens_onto_params() {
        let doc = ProfileDoc::builtin();
        let resolved = doc.resolve("nature").unwrap();
        let params = pillar_params(&resolved);
        assert_eq!(params.blend, BlendMode::Screen);
        assert_eq!(params.top_color, resolved.scene.top_color.0);
        assert!((params.intensity - 0.9).abs() < 1e-6);
    }

    #[test]
    fn cli_flags_disable_inertia() {
        let args = Cli::try_parse_from(["lightwell", "--no-inertia"]).unwrap();
        let doc = ProfileDoc::builtin();
        let resolved = doc.resolve("nature").unwrap();
        let options = inertia_options(&resolved, &args);
        assert!(!options.enabled);
        assert!((options.easing - 0.14).abs() < 1e-6);
    }
}

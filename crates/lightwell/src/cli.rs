use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lightwell",
    author,
    version,
    about = "Ambient light-pillar backdrop viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Scene to display, resolved against the profile.
    #[arg(value_name = "SCENE", default_value = "nature")]
    pub scene: String,

    /// Scene profile TOML; omit to use the built-in profile.
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Viewer window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "1280x720")]
    pub size: String,

    /// Optional FPS cap for the render loop; overrides the profile.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Skip the GPU backdrop and the inertial scroll entirely.
    #[arg(long)]
    pub reduced_motion: bool,

    /// Leave scrolling native; do not engage the inertia engine.
    #[arg(long)]
    pub no_inertia: bool,

    /// Where to write the haze fallback PNG when the GPU path is skipped.
    #[arg(long, value_name = "PATH")]
    pub haze_out: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1280x720"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("window dimensions must be greater than zero");
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn surface_size_accepts_wxh() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size(" 1920 X 1080 ").unwrap(), (1920, 1080));
    }

    #[test]
    fn surface_size_rejects_garbage() {
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("axb").is_err());
    }

    #[test]
    fn defaults_select_the_nature_scene() {
        let cli = Cli::try_parse_from(["lightwell"]).unwrap();
        assert_eq!(cli.scene, "nature");
        assert!(!cli.reduced_motion);
        assert!(cli.profile.is_none());
    }
}

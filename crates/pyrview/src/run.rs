use anyhow::Result;
use renderer::{Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let mut config = RendererConfig::default();
    if let Some(ref size) = args.size {
        config.surface_size = parse_surface_size(size)?;
    }
    config.target_fps = args.fps.filter(|fps| *fps > 0.0);
    config.vsync = !args.no_vsync;
    if let Some(title) = args.title {
        config.title = title;
    }

    tracing::info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        fps = ?config.target_fps,
        vsync = config.vsync,
        "starting pyrview"
    );

    Renderer::new(config).run()
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 640x480"))?;

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

    #[test]
    fn parses_well_formed_sizes() {
        assert_eq!(parse_surface_size("800x600").unwrap(), (800, 600));
        assert_eq!(parse_surface_size(" 640 X 480 ").unwrap(), (640, 480));
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(parse_surface_size("0x480").is_err());
        assert!(parse_surface_size("640x0").is_err());
    }

    #[test]
    fn rejects_malformed_specs() {
        assert!(parse_surface_size("640").is_err());
        assert!(parse_surface_size("wide x tall").is_err());
    }
}

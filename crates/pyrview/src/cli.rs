use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "pyrview",
    author,
    version,
    about = "Spinning pyramid perspective projection demo"
)]
pub struct Args {
    /// Override the window size (e.g. `800x600`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Present as fast as the surface allows instead of waiting for vsync.
    #[arg(long)]
    pub no_vsync: bool,

    /// Override the window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_everything_unset() {
        let args = Args::parse_from(["pyrview"]);
        assert!(args.size.is_none());
        assert!(args.fps.is_none());
        assert!(!args.no_vsync);
        assert!(args.title.is_none());
    }

    #[test]
    fn flags_are_accepted() {
        let args = Args::parse_from(["pyrview", "--size", "800x600", "--fps", "30", "--no-vsync"]);
        assert_eq!(args.size.as_deref(), Some("800x600"));
        assert_eq!(args.fps, Some(30.0));
        assert!(args.no_vsync);
    }
}

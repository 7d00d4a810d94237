use std::path::PathBuf;

use clap::{Parser, Subcommand};
use poolconfig::PowerSetting;

#[derive(Parser, Debug)]
#[command(
    name = "cardshade",
    author,
    version,
    about = "Animated shader cards with a bounded GPU context pool"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scroll a simulated card list and render every visible card.
    Run(RunArgs),
    /// Print which variant a card identity maps to.
    Select(SelectArgs),
    /// List the shader library in index order.
    Variants(VariantsArgs),
    /// Inspect configuration locations.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration TOML (defaults to `cardshade.toml` in the config dir).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON array of card descriptors.
    #[arg(long, value_name = "FILE")]
    pub cards: Option<PathBuf>,

    /// Number of cards to synthesise when `--cards` is not given.
    #[arg(long, value_name = "N", default_value_t = 60)]
    pub count: usize,

    /// Frames to pump before tearing down.
    #[arg(long, value_name = "N", default_value_t = 600)]
    pub frames: u64,

    /// Pixels scrolled per frame.
    #[arg(long, value_name = "PX", default_value_t = 24.0)]
    pub scroll_speed: f32,

    /// FPS cap (0 = uncapped). Overrides `render.fps`.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Maximum live card instances. Overrides `pool.max_active`.
    #[arg(long, value_name = "N")]
    pub max_active: Option<usize>,

    /// Viewport size for the simulated scroll container.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_viewport, default_value = "1280x720")]
    pub viewport: (u32, u32),

    /// GPU adapter preference (`low` or `high`). Overrides `render.power`.
    #[arg(long, value_name = "PREF", value_parser = poolconfig::parse_power)]
    pub power: Option<PowerSetting>,

    /// Write a PNG of every live card here when the run finishes.
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Skip the full-viewport background instance.
    #[arg(long)]
    pub no_background: bool,

    /// Simulate a context loss on the oldest live card every N frames.
    #[arg(long, value_name = "N")]
    pub lose_context_every: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Overall identifier (e.g. episode number across the whole list).
    #[arg(allow_negative_numbers = true)]
    pub overall: i64,

    /// Group identifier (e.g. season number).
    #[arg(allow_negative_numbers = true)]
    pub group: i64,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Additional variant packs appended after the built-in library.
    #[arg(long, value_name = "DIR")]
    pub pack_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct VariantsArgs {
    /// Additional variant packs appended after the built-in library.
    #[arg(long, value_name = "DIR")]
    pub pack_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration file path.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_viewport(raw: &str) -> Result<(u32, u32), String> {
    let (width, height) = raw
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid viewport width '{width}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid viewport height '{height}'"))?;
    if width == 0 || height == 0 {
        return Err("viewport dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_parses_both_separators() {
        assert_eq!(parse_viewport("800x600").unwrap(), (800, 600));
        assert_eq!(parse_viewport(" 1920X1080 ").unwrap(), (1920, 1080));
    }

    #[test]
    fn viewport_rejects_zero_and_garbage() {
        assert!(parse_viewport("0x600").is_err());
        assert!(parse_viewport("wide").is_err());
    }

    #[test]
    fn negative_identities_are_accepted() {
        let cli = Cli::try_parse_from(["cardshade", "select", "-4", "1"]).unwrap();
        match cli.command {
            Command::Select(args) => {
                assert_eq!(args.overall, -4);
                assert_eq!(args.group, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "cardshade",
            "run",
            "--max-active",
            "4",
            "--frames",
            "10",
            "--power",
            "high",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.max_active, Some(4));
        assert_eq!(args.frames, 10);
        assert_eq!(args.power, Some(PowerSetting::High));
        assert_eq!(args.viewport, (1280, 720));
    }
}

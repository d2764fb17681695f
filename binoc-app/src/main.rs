mod app;
mod files;

use anyhow::{Result, bail};
use app::{App, Mode};
use std::path::PathBuf;

const USAGE: &str = "\
Usage:
  binoc <set.json> [--loop] [--wait]
  binoc --browse <folder> [--recursive]

Options:
  --loop       cycle through the set indefinitely
  --wait       wait for SPACE instead of starting immediately
  --recursive  include subfolders when scanning";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        bail!("missing arguments");
    }

    let mode = if args[0] == "--browse" {
        let Some(folder) = args.get(1).filter(|a| !a.starts_with("--")) else {
            eprintln!("{USAGE}");
            bail!("--browse needs a folder");
        };
        Mode::Browse {
            folder: PathBuf::from(folder),
            recursive: args.iter().any(|a| a == "--recursive"),
        }
    } else {
        Mode::Sequence {
            set_path: PathBuf::from(&args[0]),
            wait: args.iter().any(|a| a == "--wait"),
            loop_playback: args.iter().any(|a| a == "--loop"),
        }
    };

    App::new(mode)?.run()
}

use clap::Parser;
use std::path::PathBuf;

use crate::workflow::ProcessOptions;

const USAGE_EXAMPLES: &str = "\
Examples:
  tagtranslit Mp3File.mp3
  tagtranslit \"/music/Rock\"
  tagtranslit -n -r -m MyTranslitMap.xml Mp3File.mp3 \"/music\"";

/// MP3 tag and file name transliterator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = USAGE_EXAMPLES)]
pub struct Args {
    /// Files and folders to process
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// File with the transliteration map
    #[arg(short, long = "map", value_name = "FILE", default_value = "Default.xml")]
    pub map: PathBuf,

    /// Don't transliterate file names
    #[arg(short = 'n', long = "name")]
    pub no_rename: bool,

    /// Don't transliterate mp3 tags
    #[arg(short = 't', long = "tag")]
    pub no_retag: bool,

    /// Recursive folder processing
    #[arg(short, long)]
    pub recursive: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn options(&self) -> ProcessOptions {
        ProcessOptions {
            rename: !self.no_rename,
            retag: !self.no_retag,
            recursive: self.recursive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["tagtranslit", "song.mp3"]).unwrap();
        assert_eq!(args.inputs, vec![PathBuf::from("song.mp3")]);
        assert_eq!(args.map, PathBuf::from("Default.xml"));
        assert_eq!(args.options(), ProcessOptions::default());
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "tagtranslit",
            "-n",
            "-t",
            "-r",
            "-m",
            "ua.xml",
            "a.mp3",
            "music",
        ])
        .unwrap();
        assert_eq!(args.map, PathBuf::from("ua.xml"));
        assert_eq!(args.inputs, vec![PathBuf::from("a.mp3"), PathBuf::from("music")]);
        assert_eq!(
            args.options(),
            ProcessOptions {
                rename: false,
                retag: false,
                recursive: true,
            }
        );
    }

    #[test]
    fn test_long_flags() {
        let args =
            Args::try_parse_from(["tagtranslit", "--name", "--recursive", "--map", "x.xml", "a.mp3"])
                .unwrap();
        assert!(args.no_rename);
        assert!(!args.no_retag);
        assert!(args.recursive);
    }

    #[test]
    fn test_requires_input() {
        assert!(Args::try_parse_from(["tagtranslit"]).is_err());
        assert!(Args::try_parse_from(["tagtranslit", "-r"]).is_err());
    }
}

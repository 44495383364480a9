use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jslb",
    // Use the default attributes feature of clap to set the proper version of jslb at compile time
    version,
    about = "jslint-builder CLI",
    long_about = "Lints JavaScript projects incrementally and keeps their diagnostics up to date."
)]
pub struct JslbCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl JslbCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preferences file to use instead of <PATH>/.jslint.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding persisted diagnostics (default: ~/.jslint-builder)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Exit with status 1 when any file fails to lint
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log JSON to <DATA_DIR>/logs instead of the terminal, for builds started by
    /// an editor or a file watcher
    #[arg(long, global = true)]
    pub background: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint every JavaScript file of a project
    Build {
        /// Project directory
        #[arg(default_value = ".")]
        project_path: PathBuf,
    },
    /// Lint only the files touched since the last build
    Update {
        /// Project directory
        #[arg(default_value = ".")]
        project_path: PathBuf,

        /// Files or folders that were added, changed or removed
        #[arg(required = true, last = true)]
        changed: Vec<PathBuf>,
    },
    /// Remove every diagnostic of a project
    Clean {
        /// Project directory
        #[arg(default_value = ".")]
        project_path: PathBuf,
    },
    /// Print the recorded diagnostics of a project
    List {
        /// Project directory
        #[arg(default_value = ".")]
        project_path: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        JslbCli::command().debug_assert();
    }

    #[test]
    fn test_update_takes_changed_paths_after_separator() {
        let cli = JslbCli::try_parse_from([
            "jslb", "--strict", "update", "web", "--", "src/a.js", "lib",
        ])
        .unwrap();

        assert!(cli.global.strict);
        match cli.command {
            Commands::Update {
                project_path,
                changed,
            } => {
                assert_eq!(project_path, PathBuf::from("web"));
                assert_eq!(changed, vec![PathBuf::from("src/a.js"), PathBuf::from("lib")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_project_path_defaults_to_current_directory() {
        let cli = JslbCli::try_parse_from(["jslb", "build", "--verbose"]).unwrap();

        assert!(cli.global.verbose);
        assert!(matches!(cli.command, Commands::Build { project_path } if project_path == PathBuf::from(".")));
    }

    #[test]
    fn test_background_logging_is_a_global_flag() {
        let cli = JslbCli::try_parse_from(["jslb", "update", "--background", "web", "--", "a.js"])
            .unwrap();

        assert!(cli.global.background);
        assert!(!JslbCli::try_parse_from(["jslb", "build"]).unwrap().global.background);
    }
}

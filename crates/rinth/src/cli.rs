use std::io;
use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor::{BrightBlue, White, Yellow};
use clap::{Parser, ValueEnum};
use clap_complete::Generator;
use clap_complete::shells::{Bash, Elvish, Fish, PowerShell, Zsh};
use clap_complete_nushell::Nushell;
use rinth_model::{HashAlgorithm, SearchIndex, SearchQuery, VersionType};
use strum::Display;
use url::Url;

/// Styling for [`clap`]'s CLI interface.
const STYLES: Styles = Styles::styled()
    .usage(Yellow.on_default().bold())
    .literal(BrightBlue.on_default().bold())
    .placeholder(White.on_default().bold())
    .header(Yellow.on_default().bold());

#[derive(Parser, Debug)]
#[command(version, author, about, styles(STYLES))]
pub struct Options {
    #[command(subcommand)]
    pub subcommand: Subcommand,

    /// How to print whatever the command fetched.
    #[arg(short('f'), long("format"), value_enum, global = true, default_value_t)]
    pub output_format: OutputFormat,

    /// Modrinth personal access token, overrides the one in the config file.
    #[arg(long, env = "MODRINTH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// API root to talk to, overrides the one in the config file.
    #[arg(long, global = true)]
    pub base_url: Option<Url>,

    /// Directory holding `rinth.yml`.
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Yaml,
}

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Search for projects.
    Search {
        /// Text to search for.
        query: Option<String>,

        /// A group of ORed facets, like `categories:fabric,categories:quilt`.
        /// Repeat to AND several groups.
        #[arg(short('F'), long("facet"))]
        facets: Vec<String>,

        /// How to sort the results.
        #[arg(short, long, value_enum, default_value_t)]
        index: SearchIndex,

        #[arg(short, long, default_value_t = SearchQuery::DEFAULT_LIMIT)]
        limit: u64,

        #[arg(short, long, default_value_t = 0)]
        offset: u64,
    },

    /// Inspect projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Inspect versions.
    Version {
        #[command(subcommand)]
        action: VersionAction,
    },

    /// Download the files of a version, or of a project's latest version.
    #[command(arg_required_else_help = true)]
    Download {
        /// The ID of the version (or project, with `--project`).
        id: String,

        /// Treat `id` as a project and download its latest version.
        #[arg(short, long)]
        project: bool,

        /// Also download the direct dependencies.
        #[arg(short, long)]
        recursive: bool,

        /// Where to put the downloaded files.
        #[arg(short('d'), long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Inspect users.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// List the members of a team.
    #[command(arg_required_else_help = true)]
    Team {
        /// The ID of the team.
        id: String,
    },

    /// List one of the platform's tag sets.
    Tags {
        #[arg(value_enum)]
        kind: TagKind,
    },

    /// Show platform-wide statistics.
    Stats,

    /// Manage the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions for this tool.
    Completions {
        /// Which shell to generate completions for.
        #[arg(short, long, value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ProjectAction {
    /// Show a project by its ID or slug.
    #[command(arg_required_else_help = true)]
    Show { id: String },

    /// List the versions of a project, newest first.
    #[command(arg_required_else_help = true)]
    Versions {
        id: String,

        /// Only list versions for these loaders.
        #[arg(short, long)]
        loaders: Vec<String>,

        /// Only list versions for these game versions.
        #[arg(short, long)]
        game_versions: Vec<String>,

        /// Only list versions of these release channels.
        #[arg(short('t'), long("type"), value_enum)]
        version_types: Vec<VersionType>,
    },

    /// List the projects any version of this project depends on.
    #[command(arg_required_else_help = true)]
    Dependencies { id: String },

    /// List the members of a project's team.
    #[command(arg_required_else_help = true)]
    Members { id: String },

    /// Show a few random projects.
    Random {
        #[arg(short, long, default_value_t = 5)]
        count: u32,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum VersionAction {
    /// Show a version by its ID.
    #[command(arg_required_else_help = true)]
    Show { id: String },

    /// Find the version(s) a file hash belongs to.
    #[command(arg_required_else_help = true)]
    Hash {
        hash: String,

        #[arg(short, long, value_enum, default_value_t)]
        algorithm: HashAlgorithm,

        /// List every version containing the file instead of just one.
        #[arg(long)]
        all: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum UserAction {
    /// Show a user by their ID or username.
    #[command(arg_required_else_help = true)]
    Show { id: String },

    /// Show the user the token belongs to.
    Me,

    /// List the projects of a user.
    #[command(arg_required_else_help = true)]
    Projects { id: String },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a config file with the default settings.
    Init {
        /// Replace an existing config file.
        #[arg(long)]
        overwrite: bool,
    },

    /// Show the effective settings (file plus overrides).
    Show,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum TagKind {
    Categories,
    Loaders,
    GameVersions,
    Licenses,
    DonationPlatforms,
    ReportTypes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
#[expect(clippy::enum_variant_names, reason = "PowerShell")]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    PowerShell,
    Zsh,
    Nushell,
}

impl Generator for Shell {
    fn file_name(&self, name: &str) -> String {
        match self {
            Self::Bash => Bash.file_name(name),
            Self::Elvish => Elvish.file_name(name),
            Self::Fish => Fish.file_name(name),
            Self::PowerShell => PowerShell.file_name(name),
            Self::Zsh => Zsh.file_name(name),
            Self::Nushell => Nushell.file_name(name),
        }
    }

    fn generate(&self, cmd: &clap::Command, buf: &mut dyn io::Write) {
        match self {
            Self::Bash => Bash.generate(cmd, buf),
            Self::Elvish => Elvish.generate(cmd, buf),
            Self::Fish => Fish.generate(cmd, buf),
            Self::PowerShell => PowerShell.generate(cmd, buf),
            Self::Zsh => Zsh.generate(cmd, buf),
            Self::Nushell => Nushell.generate(cmd, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommands() {
        let options = Options::try_parse_from([
            "rinth", "project", "versions", "sodium", "-t", "release", "-t", "beta",
            "--format", "yaml",
        ])
        .unwrap();
        assert_eq!(options.output_format, OutputFormat::Yaml);
        let Subcommand::Project {
            action: ProjectAction::Versions { version_types, .. },
        } = options.subcommand
        else {
            panic!("Parsed into the wrong subcommand");
        };
        assert_eq!(version_types, [VersionType::Release, VersionType::Beta]);
    }

    #[test]
    fn hash_algorithms_are_validated() {
        let result = Options::try_parse_from(["rinth", "version", "hash", "abc", "-a", "md5"]);
        assert!(result.is_err());
    }
}

mod cli;

use std::path::{Path, PathBuf};
use std::{fs, io};

use clap::{CommandFactory, Parser};
use color_eyre::Section;
use color_eyre::eyre::Report;
use color_eyre::owo_colors::OwoColorize;
use eyre::Context;
use itertools::Itertools;
use rinth_api::persist::{PersistError, PersistedEntity};
use rinth_api::{AuthToken, Config, Download, Modrinth, Project, TeamMember, User, Version};
use rinth_model::{SearchQuery, VersionFilter};
use serde::Serialize;
use tracing::instrument;

use crate::cli::{
    ConfigAction, OutputFormat, Options, ProjectAction, Subcommand, TagKind, UserAction,
    VersionAction,
};

fn main() -> Result<(), Report> {
    let options = Options::parse();
    color_eyre::install()?;
    install_tracing()?;

    let status = run_with_options(options);
    if let Err(mut report) = status {
        report = annotate_api_error(report);
        if let Some(error) = report.downcast_ref::<PersistError>() {
            match error {
                PersistError::Io { .. } => {
                    report = report
                        .with_note(|| "rinth encountered an I/O error with its config file.")
                        .with_suggestion(|| {
                            "Check --config-dir and the permissions of the directory."
                        });
                }
                PersistError::SerdeYml(_) => {
                    report = report
                        .with_note(|| "The config file could not be parsed.")
                        .with_suggestion(|| {
                            "Compare it against the output of `rinth config show --format yaml`."
                        });
                }
            }
        }

        return Err(report);
    }

    Ok(())
}

fn annotate_api_error(report: Report) -> Report {
    use rinth_api::Error;
    let Some(error) = report.downcast_ref::<Error>() else {
        return report;
    };
    match error {
        Error::MissingAuthorization { .. } => report
            .with_note(|| "This action needs a Modrinth personal access token.")
            .with_suggestion(|| {
                "Pass --token, export MODRINTH_TOKEN or add a `token` to rinth.yml."
            }),
        Error::Unauthorized { .. } => report
            .with_note(|| "Modrinth rejected the token.")
            .with_suggestion(|| "Make sure the token has not expired and has the needed scopes."),
        Error::NotFound { .. } => {
            report.with_suggestion(|| "Double-check the ID or slug you passed.")
        }
        Error::Transport(_) => report
            .with_note(|| "Could not reach the API.")
            .with_suggestion(|| "Check your connection and the configured base URL."),
        Error::MalformedResponse(_) => report
            .with_note(|| "The API answered with something rinth does not understand.")
            .with_suggestion(|| {
                format!("Consider reporting this at {}", env!("CARGO_PKG_REPOSITORY"))
            }),
        _ => report,
    }
}

#[instrument(name = "action_handling", skip_all, fields(subcommand = ?options.subcommand))]
fn run_with_options(options: Options) -> Result<(), Report> {
    let format = options.output_format;
    let config = effective_config(&options);

    match options.subcommand {
        Subcommand::Completions { shell } => {
            let mut command = Options::command();
            let bin_name = env!("CARGO_CRATE_NAME");
            let mut stdout = io::stdout();
            clap_complete::generate(shell, &mut command, bin_name, &mut stdout);
            Ok(())
        }

        Subcommand::Config { action } => match action {
            ConfigAction::Init { overwrite } => init_config(&options.config_dir, overwrite),
            ConfigAction::Show => {
                let config = config?;
                let has_token = config.token.is_some();
                let shown = Config {
                    token: None,
                    ..config
                };
                match format {
                    OutputFormat::Yaml => print_yaml(&shown)?,
                    OutputFormat::Human => {
                        println!("{:>12}: {}", "base_url".bold(), shown.base_url);
                        println!("{:>12}: {:?}", "timeout".bold(), shown.timeout());
                        if let Some(user_agent) = &shown.user_agent {
                            println!("{:>12}: {user_agent}", "user_agent".bold());
                        }
                    }
                }
                tracing::info!(has_token, "The token itself is never printed");
                Ok(())
            }
        },

        subcommand => {
            let modrinth = Modrinth::from_config(&config?)?;
            run_api_command(&modrinth, subcommand, format)
        }
    }
}

fn run_api_command(
    modrinth: &Modrinth,
    subcommand: Subcommand,
    format: OutputFormat,
) -> Result<(), Report> {
    match subcommand {
        Subcommand::Search {
            query,
            facets,
            index,
            limit,
            offset,
        } => {
            let facets: Vec<Vec<String>> = facets
                .iter()
                .map(|group| group.split(',').map(str::trim).map(String::from).collect())
                .collect();
            let query = SearchQuery::builder()
                .maybe_query(query)
                .facets(facets)
                .index(index)
                .limit(limit)
                .offset(offset)
                .build();
            let results = modrinth.search(&query)?;
            match format {
                OutputFormat::Yaml => print_yaml(&results)?,
                OutputFormat::Human => {
                    for hit in &results.hits {
                        println!(
                            "{title} ({slug}) by {author}, {downloads} downloads",
                            title = hit.title.bold().green(),
                            slug = hit.slug.cyan(),
                            author = hit.author.purple(),
                            downloads = hit.downloads.yellow(),
                        );
                        println!("    {}", hit.description.italic());
                    }
                    eprintln!(
                        "Showing {} of {} hits.",
                        results.hits.len(),
                        results.total_hits.bold()
                    );
                }
            }
            Ok(())
        }

        Subcommand::Project { action } => match action {
            ProjectAction::Show { id } => {
                let project = modrinth.get_project(&id)?;
                match format {
                    OutputFormat::Yaml => print_yaml(project.model())?,
                    OutputFormat::Human => print_project(&project),
                }
                Ok(())
            }
            ProjectAction::Versions {
                id,
                loaders,
                game_versions,
                version_types,
            } => {
                let filter = VersionFilter::builder()
                    .loaders(loaders)
                    .game_versions(game_versions)
                    .version_types(version_types)
                    .build();
                let versions = modrinth.get_project(&id)?.get_versions(&filter)?;
                print_versions(&versions, format)
            }
            ProjectAction::Dependencies { id } => {
                let dependencies = modrinth.get_project(&id)?.get_dependencies()?;
                print_projects(&dependencies, format)
            }
            ProjectAction::Members { id } => {
                let members = modrinth.get_project(&id)?.fetch_team_members()?;
                print_members(&members, format)
            }
            ProjectAction::Random { count } => {
                let projects = modrinth.get_random_projects(count)?;
                print_projects(&projects, format)
            }
        },

        Subcommand::Version { action } => match action {
            VersionAction::Show { id } => {
                let version = modrinth.get_version(&id)?;
                print_versions(&[version], format)
            }
            VersionAction::Hash {
                hash,
                algorithm,
                all,
            } => {
                let versions = if all {
                    Version::get_all_from_hash(modrinth, &hash, algorithm)?
                } else {
                    vec![Version::get_from_hash(modrinth, &hash, algorithm)?]
                };
                print_versions(&versions, format)
            }
        },

        Subcommand::Download {
            id,
            project,
            recursive,
            output_dir,
        } => {
            let downloads = if project {
                modrinth.get_project(&id)?.download(recursive)?
            } else {
                modrinth.get_version(&id)?.download(recursive)?
            };
            if downloads.is_empty() {
                tracing::warn!(%id, "Nothing to download");
            }
            save_downloads(&downloads, &output_dir)
        }

        Subcommand::User { action } => match action {
            UserAction::Show { id } => {
                let user = modrinth.get_user(&id)?;
                print_user(&user, format)
            }
            UserAction::Me => {
                let user = modrinth.user_from_auth(None)?;
                print_user(&user, format)
            }
            UserAction::Projects { id } => {
                let projects = modrinth.get_user(&id)?.get_projects()?;
                print_projects(&projects, format)
            }
        },

        Subcommand::Team { id } => {
            let team = modrinth.get_team(&id)?;
            print_members(&team.into_members(), format)
        }

        Subcommand::Tags { kind } => print_tags(modrinth, kind, format),

        Subcommand::Stats => {
            let statistics = modrinth.statistics()?;
            match format {
                OutputFormat::Yaml => print_yaml(&statistics)?,
                OutputFormat::Human => {
                    println!("{:>9} projects", statistics.projects.bold());
                    println!("{:>9} versions", statistics.versions.bold());
                    println!("{:>9} files", statistics.files.bold());
                    println!("{:>9} authors", statistics.authors.bold());
                }
            }
            Ok(())
        }

        Subcommand::Config { .. } | Subcommand::Completions { .. } => {
            unreachable!("handled before the client is built")
        }
    }
}

/// The config file in `--config-dir`, with command-line overrides applied.
fn effective_config(options: &Options) -> Result<Config, Report> {
    let mut config = Config::load_or_default(&options.config_dir)?;
    if let Some(base_url) = &options.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(token) = &options.token {
        let token = AuthToken::try_new(token.clone()).wrap_err("Invalid token")?;
        config.token = Some(token);
    }
    Ok(config)
}

fn init_config(directory: &Path, overwrite: bool) -> Result<(), Report> {
    let path = directory.join(Config::FILE_PATH);
    if !overwrite && fs::exists(&path).is_ok_and(|exists| exists) {
        let error = eyre::eyre!("{} already exists", path.display())
            .with_suggestion(|| "Pass --overwrite to replace it with the defaults.");
        return Err(error);
    }
    Config::default().write_to(directory)?;
    tracing::info!(config_file = ?path, "Done");
    Ok(())
}

#[instrument(skip(downloads), fields(count = downloads.len()))]
fn save_downloads(downloads: &[Download], output_dir: &Path) -> Result<(), Report> {
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create {}", output_dir.display()))?;
    for download in downloads {
        // Only the last component, names come from the server.
        let file_name = Path::new(&download.file_name)
            .file_name()
            .ok_or_else(|| eyre::eyre!("Refusing to write {:?}", download.file_name))?;
        let path: PathBuf = output_dir.join(file_name);
        fs::write(&path, &download.bytes)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = ?path, size = download.bytes.len(), "Saved");
    }
    Ok(())
}

fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<(), Report> {
    print!("{}", serde_yml::to_string(value)?);
    Ok(())
}

fn print_project(project: &Project<'_>) {
    println!(
        "{title} ({slug}, {id}) [{project_type}]",
        title = project.name().bold().green(),
        slug = project.slug().cyan(),
        id = project.id(),
        project_type = project.project_type().blue().bold(),
    );
    println!("    {}", project.description().italic());
    println!(
        "    {downloads} downloads, {followers} followers, licensed under {license}",
        downloads = project.downloads().yellow(),
        followers = project.followers().yellow(),
        license = project.license().id.purple(),
    );
    println!("    categories: {}", project.all_categories().join(", "));
}

fn print_projects(projects: &[Project<'_>], format: OutputFormat) -> Result<(), Report> {
    match format {
        OutputFormat::Yaml => print_yaml(&projects.iter().map(Project::model).collect_vec())?,
        OutputFormat::Human => projects.iter().for_each(print_project),
    }
    Ok(())
}

fn print_versions(versions: &[Version<'_>], format: OutputFormat) -> Result<(), Report> {
    match format {
        OutputFormat::Yaml => print_yaml(&versions.iter().map(Version::model).collect_vec())?,
        OutputFormat::Human => {
            for version in versions {
                println!(
                    "{number:>16} {name} [{version_type}] ({id}, {date})",
                    number = version.version_number().bold().green(),
                    name = version.name(),
                    version_type = version.version_type().blue(),
                    id = version.id().cyan(),
                    date = version.date_published().date_naive(),
                );
                println!(
                    "{:>16} {} on {}",
                    "",
                    version.loaders().join(", ").purple(),
                    version.game_versions().join(", "),
                );
                for file in version.files() {
                    let marker = if file.primary { "*" } else { " " };
                    println!("{:>16} {marker} {} ({} bytes)", "", file.name, file.size);
                }
            }
        }
    }
    Ok(())
}

fn print_user(user: &User<'_>, format: OutputFormat) -> Result<(), Report> {
    match format {
        OutputFormat::Yaml => print_yaml(user.model())?,
        OutputFormat::Human => {
            println!(
                "{username} ({id}) [{role}], joined {created}",
                username = user.username().bold().green(),
                id = user.id().cyan(),
                role = user.role().blue(),
                created = user.created().date_naive(),
            );
            if let Some(bio) = user.bio() {
                println!("    {}", bio.italic());
            }
        }
    }
    Ok(())
}

fn print_members(members: &[TeamMember<'_>], format: OutputFormat) -> Result<(), Report> {
    match format {
        OutputFormat::Yaml => print_yaml(&members.iter().map(TeamMember::model).collect_vec())?,
        OutputFormat::Human => {
            for member in members {
                let user = member.user();
                let pending = if member.is_accepted() { "" } else { " (pending)" };
                println!(
                    "{username:>24} {role}{pending}",
                    username = user.username().bold().green(),
                    role = member.role().blue(),
                );
            }
        }
    }
    Ok(())
}

fn print_tags(modrinth: &Modrinth, kind: TagKind, format: OutputFormat) -> Result<(), Report> {
    let lines: Vec<String> = match (kind, format) {
        (TagKind::Categories, OutputFormat::Yaml) => return print_yaml(&modrinth.categories()?),
        (TagKind::Categories, OutputFormat::Human) => modrinth
            .categories()?
            .into_iter()
            .map(|tag| format!("{} ({}, {})", tag.name, tag.project_type, tag.header))
            .collect(),
        (TagKind::Loaders, OutputFormat::Yaml) => return print_yaml(&modrinth.loaders()?),
        (TagKind::Loaders, OutputFormat::Human) => modrinth
            .loaders()?
            .into_iter()
            .map(|tag| format!("{} ({})", tag.name, tag.supported_project_types.iter().join(", ")))
            .collect(),
        (TagKind::GameVersions, OutputFormat::Yaml) => {
            return print_yaml(&modrinth.game_versions()?);
        }
        (TagKind::GameVersions, OutputFormat::Human) => modrinth
            .game_versions()?
            .into_iter()
            .map(|tag| format!("{} ({})", tag.version, tag.version_type))
            .collect(),
        (TagKind::Licenses, OutputFormat::Yaml) => return print_yaml(&modrinth.licenses()?),
        (TagKind::Licenses, OutputFormat::Human) => modrinth
            .licenses()?
            .into_iter()
            .map(|tag| format!("{}: {}", tag.short, tag.name))
            .collect(),
        (TagKind::DonationPlatforms, OutputFormat::Yaml) => {
            return print_yaml(&modrinth.donation_platforms()?);
        }
        (TagKind::DonationPlatforms, OutputFormat::Human) => modrinth
            .donation_platforms()?
            .into_iter()
            .map(|tag| format!("{}: {}", tag.short, tag.name))
            .collect(),
        (TagKind::ReportTypes, OutputFormat::Yaml) => return print_yaml(&modrinth.report_types()?),
        (TagKind::ReportTypes, OutputFormat::Human) => modrinth.report_types()?,
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn install_tracing() -> Result<(), Report> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    let format_layer = fmt::layer().pretty().without_time().with_writer(io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}

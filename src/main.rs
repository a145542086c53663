//! Command-line front end for grasp label project files.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use clap::{Parser, Subcommand};

    use grasp_label::project::default_output_name;
    use grasp_label::{AppConfig, ConfigError, Project, ProjectError};

    /// Create and inspect grasp annotation projects
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    struct CliArgs {
        /// Configuration file to use instead of the default one
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Create an empty project over the images in a folder
        Init {
            /// Folder to scan for images
            dir: PathBuf,

            /// Project file to write (defaults to a time-stamped name)
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
        /// Print labeling progress of a project
        Summary { project: PathBuf },
        /// Report project images that are missing on disk
        Check { project: PathBuf },
        /// Print the effective configuration
        Config {
            /// Also write it to the default location
            #[arg(long, default_value_t = false)]
            write_default: bool,
        },
    }

    #[derive(Debug, thiserror::Error)]
    enum CliError {
        #[error(transparent)]
        Project(#[from] ProjectError),

        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error("{missing} of {total} images are missing")]
        MissingImages { missing: usize, total: usize },
    }

    pub fn run() -> ExitCode {
        let args = CliArgs::parse();

        let config = match &args.config {
            Some(path) => match AppConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {path:?}: {e}");
                    return ExitCode::FAILURE;
                }
            },
            None => AppConfig::load_from_default_path().unwrap_or_default(),
        };

        // RUST_LOG overrides the configured level
        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let result = match args.command {
            Command::Init { dir, output } => init(&config, &dir, output),
            Command::Summary { project } => summary(&project),
            Command::Check { project } => check(&project),
            Command::Config { write_default } => show_config(&config, write_default),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        }
    }

    fn init(config: &AppConfig, dir: &Path, output: Option<PathBuf>) -> Result<(), CliError> {
        let project = Project::from_folder(dir, &config.preferences.image_extensions)?;
        let output = output.unwrap_or_else(|| {
            let folder = &config.preferences.output_folder;
            let base = if folder.is_empty() {
                dir
            } else {
                Path::new(folder)
            };
            base.join(default_output_name())
        });

        project.save(&output)?;
        println!(
            "Wrote {} with {} images",
            output.display(),
            project.image_count()
        );
        Ok(())
    }

    fn summary(path: &Path) -> Result<(), CliError> {
        let project = Project::load(path)?;

        println!("Image folder: {}", project.image_folder);
        for (name, entry) in &project.image_files {
            let invalid = entry
                .shapes
                .iter()
                .filter(|record| record.to_rect().is_err())
                .count();
            let mark = if entry.labeled { "x" } else { " " };
            if invalid > 0 {
                println!(
                    "[{mark}] {name}: {} shapes ({invalid} invalid)",
                    entry.shapes.len()
                );
            } else {
                println!("[{mark}] {name}: {} shapes", entry.shapes.len());
            }
        }
        println!(
            "{} of {} images labeled, {} shapes",
            project.labeled_count(),
            project.image_count(),
            project.shape_count()
        );
        Ok(())
    }

    fn check(path: &Path) -> Result<(), CliError> {
        let project = Project::load(path)?;
        let report = project.check_files()?;

        for name in &report.missing {
            println!("missing: {}", project.image_path(name).display());
        }
        if report.all_found() {
            println!("All {} images found", report.found.len());
            Ok(())
        } else {
            Err(CliError::MissingImages {
                missing: report.missing.len(),
                total: project.image_count(),
            })
        }
    }

    fn show_config(config: &AppConfig, write_default: bool) -> Result<(), CliError> {
        let json = config.to_json().map_err(ConfigError::from)?;
        println!("{json}");
        if write_default {
            config.save_to_default_path()?;
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

//! gridboard - CLI entry point
//!
//! Every invocation restores the saved layout from the store directory,
//! applies one action through the widget manager and saves again when the
//! layout changed.

use clap::{Parser, Subcommand};
use gridboard::config::{default, loader::ConfigLoader, schema::Config, xdg};
use gridboard::manager::WidgetManager;
use gridboard::store::{FileBackend, PersistentStore};
use gridboard::surface::{occupancy, Container, GridEngine, GridSurface};
use gridboard::widgets::WidgetRegistry;
use gridboard::{logging, DashboardError, WidgetConfigPatch};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type Manager = WidgetManager<GridEngine, FileBackend>;

/// Free-form widget grid dashboard
#[derive(Parser)]
#[command(name = "gridboard")]
#[command(version, about = "Free-form widget grid dashboard")]
struct Cli {
    /// Configuration file (defaults to the XDG location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding layout snapshots (overrides [storage] directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the gridboard CLI
#[derive(Subcommand)]
enum Commands {
    /// List the widget types that can be added
    Types,

    /// List the widgets on the dashboard
    List {
        /// Print the layout snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a widget from the palette
    Add {
        /// Widget type (text, chart, image)
        widget_type: String,
        /// Widget title (defaults to the type's display name)
        #[arg(long)]
        title: Option<String>,
        /// Palette icon stored with the widget
        #[arg(long)]
        icon: Option<String>,
        /// Description stored with the widget
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Remove a widget
    Remove {
        /// Widget id
        id: String,
    },

    /// Move a widget to a grid cell
    Move {
        /// Widget id
        id: String,
        /// Target column
        x: u32,
        /// Target row
        y: u32,
    },

    /// Resize a widget
    Resize {
        /// Widget id
        id: String,
        /// Width in columns
        w: u32,
        /// Height in rows
        h: u32,
    },

    /// Change a widget's title or data
    Update {
        /// Widget id
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Replacement data as a JSON object
        #[arg(long)]
        data: Option<String>,
    },

    /// Remove every widget
    Clear,

    /// Draw the occupancy map and every widget body
    Render,

    /// Manage configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions for the `config` subcommand.
#[derive(Subcommand)]
enum ConfigAction {
    /// Create default configuration file
    Init {
        /// Overwrite existing configuration (creates backup)
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration file
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Config { action } => run_config_command(action, cli.config.as_deref()),
        command => run_dashboard(cli.config.as_deref(), cli.store, command),
    }
}

/// Loads config, opens the dashboard, runs `command` and saves any change.
fn run_dashboard(
    config_path: Option<&Path>,
    store: Option<PathBuf>,
    command: Commands,
) -> ExitCode {
    let config = match ConfigLoader::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging.level);

    let mut manager = match open_dashboard(&config, store) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = run_dashboard_command(&mut manager, command);
    if code != ExitCode::SUCCESS || !manager.has_unsaved_changes() {
        return code;
    }
    if let Err(e) = manager.save() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    code
}

/// Builds the manager over the snapshot directory and restores the layout.
fn open_dashboard(config: &Config, store: Option<PathBuf>) -> Result<Manager, DashboardError> {
    let dir = store.unwrap_or_else(|| config.storage.resolved_directory());
    tracing::debug!(store = %dir.display(), "opening dashboard");
    let mut manager = WidgetManager::new(
        WidgetRegistry::new(),
        GridSurface::new(config.grid.to_options()),
        PersistentStore::with_namespace(FileBackend::new(dir), config.storage.namespace.clone()),
    );
    manager.initialize(&Container::new("dashboard"))?;
    Ok(manager)
}

fn run_dashboard_command(manager: &mut Manager, command: Commands) -> ExitCode {
    match command {
        Commands::Types => {
            for meta in manager.available_widget_types() {
                println!(
                    "{:<6}  {}  {:<13}  {}x{}  {}",
                    meta.widget_type,
                    meta.icon,
                    meta.name,
                    meta.default_size.w,
                    meta.default_size.h,
                    meta.description
                );
            }
        }
        Commands::List { json } => {
            let widgets = manager.surface().all_widgets();
            if json {
                match serde_json::to_string_pretty(&widgets) {
                    Ok(out) => println!("{out}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else if widgets.is_empty() {
                println!("No widgets");
            } else {
                for w in widgets {
                    println!(
                        "{}  {:<6}  {}x{} @ {},{}  {}",
                        w.id,
                        w.widget_type,
                        w.w,
                        w.h,
                        w.x,
                        w.y,
                        w.title
                    );
                }
            }
        }
        Commands::Add {
            widget_type,
            title,
            icon,
            description,
        } => {
            let meta = manager
                .available_widget_types()
                .into_iter()
                .find(|meta| meta.widget_type == widget_type);
            let title = title
                .or_else(|| meta.as_ref().map(|m| m.name.clone()))
                .unwrap_or_else(|| widget_type.clone());
            let icon = icon
                .or_else(|| meta.as_ref().map(|m| m.icon.clone()))
                .unwrap_or_default();
            match manager.add_widget_from_selection(&widget_type, &title, &icon, &description) {
                Ok(id) => println!("{id}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        Commands::Remove { id } => {
            if !require_widget(manager, &id) {
                return ExitCode::FAILURE;
            }
            manager.remove_widget(&id);
        }
        Commands::Move { id, x, y } => {
            if !require_widget(manager, &id) {
                return ExitCode::FAILURE;
            }
            manager.surface_mut().move_widget(&id, x, y);
        }
        Commands::Resize { id, w, h } => {
            if !require_widget(manager, &id) {
                return ExitCode::FAILURE;
            }
            manager.surface_mut().resize_widget(&id, w, h);
        }
        Commands::Update { id, title, data } => {
            if !require_widget(manager, &id) {
                return ExitCode::FAILURE;
            }
            let data = match data
                .as_deref()
                .map(serde_json::from_str::<serde_json::Map<String, serde_json::Value>>)
            {
                None => None,
                Some(Ok(map)) => Some(map),
                Some(Err(e)) => {
                    eprintln!("Error: --data must be a JSON object: {e}");
                    return ExitCode::FAILURE;
                }
            };
            let patch = WidgetConfigPatch {
                title,
                data,
                ..Default::default()
            };
            if patch.is_empty() {
                eprintln!("Error: nothing to update (pass --title or --data)");
                return ExitCode::FAILURE;
            }
            manager.update_widget(&id, patch);
        }
        Commands::Clear => manager.clear_all_widgets(),
        Commands::Render => {
            if let Some(engine) = manager.surface().engine() {
                print!("{}", occupancy(engine));
            }
            for widget in manager.widgets() {
                let config = widget.config();
                println!();
                println!(
                    "== {} [{}] {}x{} @ {},{}",
                    config.title, config.id, config.w, config.h, config.x, config.y
                );
                println!("{}", widget.render());
            }
        }
        Commands::Config { action } => return run_config_command(action, None),
    }
    ExitCode::SUCCESS
}

/// Prints an error and returns `false` when no widget has `id`.
fn require_widget(manager: &Manager, id: &str) -> bool {
    if manager.widget(id).is_some() {
        return true;
    }
    eprintln!("Error: no widget with id '{id}'");
    false
}

fn run_config_command(action: ConfigAction, explicit: Option<&Path>) -> ExitCode {
    let result = match action {
        ConfigAction::Init { force } => {
            let created = match explicit {
                Some(path) => default::create_config(path, force).map(|()| path.to_path_buf()),
                None => default::create_default_config(force),
            };
            created.map(|path| println!("Created configuration at {}", path.display()))
        }
        ConfigAction::Path => {
            let path = explicit.map_or_else(xdg::config_path, Path::to_path_buf);
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Validate => ConfigLoader::load(explicit).map(|config| {
            println!("Configuration is valid");
            println!("{config:#?}");
        }),
    };
    if let Err(e) = result {
        eprintln!("Config error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_defaults() {
        let cli = Cli::try_parse_from(["gridboard", "add", "text"]).unwrap();
        match cli.command {
            Commands::Add {
                widget_type,
                title,
                icon,
                description,
            } => {
                assert_eq!(widget_type, "text");
                assert!(title.is_none());
                assert!(icon.is_none());
                assert_eq!(description, "");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_store_flag_is_global() {
        let cli = Cli::try_parse_from(["gridboard", "list", "--store", "/tmp/board"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/board")));
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["gridboard", "config", "validate", "--config", "board.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("board.toml")));
    }

    #[test]
    fn test_move_requires_coordinates() {
        assert!(Cli::try_parse_from(["gridboard", "move", "widget-1", "4"]).is_err());
        let cli = Cli::try_parse_from(["gridboard", "move", "widget-1", "4", "2"]).unwrap();
        assert!(matches!(cli.command, Commands::Move { x: 4, y: 2, .. }));
    }

    #[test]
    fn test_negative_coordinates_rejected() {
        assert!(Cli::try_parse_from(["gridboard", "move", "widget-1", "--", "-1", "0"]).is_err());
    }

    #[test]
    fn test_config_subcommands() {
        for args in [
            vec!["gridboard", "config", "init"],
            vec!["gridboard", "config", "init", "--force"],
            vec!["gridboard", "config", "path"],
            vec!["gridboard", "config", "validate"],
        ] {
            assert!(Cli::try_parse_from(args).is_ok());
        }
    }
}

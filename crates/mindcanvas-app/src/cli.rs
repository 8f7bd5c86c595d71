//! Argument parsing and the layout run.

use mindcanvas_core::config::ConfigError;
use mindcanvas_core::storage::{MapManager, PlatformStorage, create_file_manager};
use mindcanvas_core::{
    DocumentError, Editor, EditorConfig, LayoutError, LayoutMode, StorageError,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const USAGE: &str = "\
Usage: mindcanvas <layout> <document.json> [--out <path>] [options]
       mindcanvas <layout> --map <name> [--out <path>] [options]

Layouts: radial, horizontal, vertical, tree

Options:
  --out <path>       Write the result here instead of back to the input
  --config <path>    Editor configuration file
  --user <name>      Owner of stored maps (default: local)
  --save-as <name>   Also store the result as a map";

/// User key for maps when none is given.
pub const DEFAULT_USER: &str = "local";

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the diagram comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Map(String),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub mode: LayoutMode,
    pub input: Input,
    pub out: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub user: String,
    pub save_as: Option<String>,
}

impl Args {
    /// Parse arguments, not including the program name.
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut mode = None;
        let mut file = None;
        let mut map = None;
        let mut out = None;
        let mut config = None;
        let mut user = None;
        let mut save_as = None;

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| AppError::Usage(format!("{} needs a value", flag)))
            };
            match arg.as_str() {
                "--out" => out = Some(PathBuf::from(value("--out")?)),
                "--config" => config = Some(PathBuf::from(value("--config")?)),
                "--map" => map = Some(value("--map")?),
                "--user" => user = Some(value("--user")?),
                "--save-as" => save_as = Some(value("--save-as")?),
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("Unknown option {}", flag)));
                }
                _ if mode.is_none() => {
                    mode = Some(arg.parse::<LayoutMode>()?);
                }
                _ if file.is_none() => file = Some(PathBuf::from(&arg)),
                _ => return Err(AppError::Usage(format!("Unexpected argument {}", arg))),
            }
        }

        let mode = mode.ok_or_else(|| AppError::Usage("Missing layout mode".to_string()))?;
        let input = match (file, map) {
            (Some(path), None) => Input::File(path),
            (None, Some(name)) => Input::Map(name),
            (Some(_), Some(_)) => {
                return Err(AppError::Usage("Give either a document or --map, not both".to_string()));
            }
            (None, None) => return Err(AppError::Usage("Missing document".to_string())),
        };

        Ok(Self {
            mode,
            input,
            out,
            config,
            user: user.unwrap_or_else(|| DEFAULT_USER.to_string()),
            save_as,
        })
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub mode: LayoutMode,
    pub nodes: usize,
    pub connections: usize,
}

/// Load the diagram, apply the layout and write the result.
pub fn run(args: &Args) -> Result<Summary, AppError> {
    let config = load_config(args.config.as_deref())?;
    let mut editor = Editor::with_config(&config);
    let mut maps: Option<MapManager<PlatformStorage>> = None;

    match &args.input {
        Input::File(path) => {
            let json = read(path)?;
            editor.import_json(&json)?;
        }
        Input::Map(name) => {
            let manager = open_maps(&mut maps, &config, &args.user)?;
            pollster::block_on(manager.load_into(name, &mut editor))?;
        }
    }

    editor.set_layout(args.mode)?;

    let destination = match (&args.out, &args.input) {
        (Some(path), _) => Some(path.clone()),
        (None, Input::File(path)) => Some(path.clone()),
        (None, Input::Map(_)) => None,
    };
    if let Some(path) = destination {
        let json = editor.export().to_json()?;
        fs::write(&path, json).map_err(|source| AppError::Io { path: path.clone(), source })?;
        log::info!("Wrote {}", path.display());
    }

    let store_as = match (&args.save_as, &args.input, &args.out) {
        (Some(name), _, _) => Some(name.clone()),
        (None, Input::Map(name), None) => Some(name.clone()),
        _ => None,
    };
    if let Some(name) = store_as {
        let manager = open_maps(&mut maps, &config, &args.user)?;
        pollster::block_on(manager.save_current(&name, &mut editor))?;
    }

    Ok(Summary {
        mode: editor.layout_mode(),
        nodes: editor.graph().node_count(),
        connections: editor.graph().connection_count(),
    })
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, AppError> {
    match path.map(Path::to_path_buf).or_else(EditorConfig::default_path) {
        Some(path) => Ok(EditorConfig::load_or_default(&path)?),
        None => Ok(EditorConfig::default()),
    }
}

fn open_maps<'a>(
    slot: &'a mut Option<MapManager<PlatformStorage>>,
    config: &EditorConfig,
    user: &str,
) -> Result<&'a mut MapManager<PlatformStorage>, AppError> {
    if slot.is_none() {
        *slot = Some(create_file_manager(config.storage_dir.clone(), user)?);
    }
    slot.as_mut()
        .ok_or_else(|| AppError::Usage("Map storage unavailable".to_string()))
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_core::Document;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Result<Args, AppError> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    const DOC: &str = r##"{
        "nodes": [
            { "id": 1, "x": 0, "y": 0, "text": "Root", "color": "#333", "childIds": [2, 3] },
            { "id": 2, "x": 0, "y": 0, "text": "Left", "color": "#333", "childIds": [] },
            { "id": 3, "x": 0, "y": 0, "text": "Right", "color": "#333", "childIds": [] }
        ],
        "connections": [{ "source": 1, "target": 2 }, { "source": 1, "target": 3 }],
        "nextId": 4
    }"##;

    #[test]
    fn test_parse_file_input() {
        let parsed = args(&["Tree", "map.json", "--out", "done.json"]).unwrap();
        assert_eq!(parsed.mode, LayoutMode::Tree);
        assert_eq!(parsed.input, Input::File(PathBuf::from("map.json")));
        assert_eq!(parsed.out, Some(PathBuf::from("done.json")));
        assert_eq!(parsed.user, DEFAULT_USER);
    }

    #[test]
    fn test_parse_map_input() {
        let parsed = args(&["radial", "--map", "plans", "--user", "alice"]).unwrap();
        assert_eq!(parsed.input, Input::Map("plans".to_string()));
        assert_eq!(parsed.user, "alice");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(args(&[]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["diagonal", "a.json"]), Err(AppError::Layout(_))));
        assert!(matches!(args(&["tree"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["tree", "a.json", "--out"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["tree", "a.json", "--bogus"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["tree", "a.json", "--map", "m"]), Err(AppError::Usage(_))));
    }

    #[test]
    fn test_run_writes_tree_layout() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("map.json");
        let output = dir.path().join("out.json");
        let config = dir.path().join("config.json");
        fs::write(&input, DOC).unwrap();

        let parsed = Args {
            mode: LayoutMode::Tree,
            input: Input::File(input.clone()),
            out: Some(output.clone()),
            config: Some(config),
            user: DEFAULT_USER.to_string(),
            save_as: None,
        };
        let summary = run(&parsed).unwrap();
        assert_eq!(summary, Summary { mode: LayoutMode::Tree, nodes: 3, connections: 2 });

        let doc = Document::from_json(&fs::read_to_string(&output).unwrap()).unwrap();
        let xy: Vec<(f64, f64)> = doc.nodes.iter().map(|n| (n.x, n.y)).collect();
        assert_eq!(xy, vec![(500.0, 100.0), (400.0, 200.0), (600.0, 200.0)]);
        // Input untouched when --out is given.
        assert_eq!(fs::read_to_string(&input).unwrap(), DOC);
    }

    #[test]
    fn test_run_saves_and_reloads_map() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("map.json");
        let config = dir.path().join("config.json");
        fs::write(&input, DOC).unwrap();
        let storage = dir.path().join("maps");
        fs::write(
            &config,
            format!(r#"{{ "storage_dir": {:?} }}"#, storage.to_string_lossy()),
        )
        .unwrap();

        let save = Args {
            mode: LayoutMode::Vertical,
            input: Input::File(input),
            out: None,
            config: Some(config.clone()),
            user: "alice".to_string(),
            save_as: Some("plans".to_string()),
        };
        run(&save).unwrap();
        assert!(storage.join("users/alice/maps/plans.json").exists());

        let reload = Args {
            mode: LayoutMode::Horizontal,
            input: Input::Map("plans".to_string()),
            out: None,
            config: Some(config),
            user: "alice".to_string(),
            save_as: None,
        };
        let summary = run(&reload).unwrap();
        assert_eq!(summary.nodes, 3);
    }

    #[test]
    fn test_run_rejects_bad_document() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("map.json");
        fs::write(&input, r#"{ "nodes": [], "connections": [{ "source": 1, "target": 2 }], "nextId": 1 }"#)
            .unwrap();
        let parsed = Args {
            mode: LayoutMode::Radial,
            input: Input::File(input.clone()),
            out: None,
            config: Some(dir.path().join("absent.json")),
            user: DEFAULT_USER.to_string(),
            save_as: None,
        };
        assert!(matches!(run(&parsed), Err(AppError::Document(_))));
    }
}

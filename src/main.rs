use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use mathveil::cli::{CliArgs, CliCommand, SettingsAction};
use mathveil::config::{JsonFileStore, Settings, SettingsStore};
use mathveil::config_paths::ConfigPaths;
use mathveil::markers::clean_text;
use mathveil::plugin::MathMarkers;
use mathveil::text::Document;
use mathveil::visibility::VisibilityLayer;

fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    let paths = ConfigPaths::discover();
    mathveil::tracing::init(paths.as_ref().ok());

    let store = match &args.settings {
        Some(path) => JsonFileStore::new(path),
        None => paths?.settings_store(),
    };

    match args.command {
        CliCommand::Clean {
            files,
            check,
            stdout,
        } => clean(&files, check, stdout),
        CliCommand::Render { file } => {
            let settings = load_settings(&store);
            render(&file, &settings)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Settings { action } => {
            settings(store, action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Settings for read-only commands: never writes the store
fn load_settings(store: &JsonFileStore) -> Settings {
    match store.load() {
        Ok(Some(value)) => Settings::from_value(value),
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!("{:#}", e);
            Settings::default()
        }
    }
}

fn clean(files: &[PathBuf], check: bool, stdout: bool) -> Result<ExitCode> {
    let mut dirty = 0;
    for path in files {
        let text = read(path)?;
        let (cleaned, markers) = clean_text(&text);
        tracing::info!("{}: {} markers", path.display(), markers);

        if stdout {
            print!("{}", cleaned);
        } else if markers > 0 {
            dirty += 1;
            if check {
                println!("{}: {} markers", path.display(), markers);
            } else {
                fs::write(path, cleaned)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("cleaned {} ({} markers)", path.display(), markers);
            }
        }
    }

    if check && dirty > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn render(path: &Path, settings: &Settings) -> Result<()> {
    let doc = Document::new(&read(path)?);
    let mut layer = VisibilityLayer::new(settings);
    layer.update(&doc, &[0..doc.len()]);
    print!("{}", layer.render(&doc, 0..doc.len()));
    Ok(())
}

fn settings(store: JsonFileStore, action: SettingsAction) -> Result<()> {
    let path = store.path().to_path_buf();
    if action == SettingsAction::Path {
        println!("{}", path.display());
        return Ok(());
    }

    let mut markers = MathMarkers::load(Box::new(store))?;
    match action {
        SettingsAction::Show | SettingsAction::Path => {}
        SettingsAction::Reset => markers.reset_settings()?,
        SettingsAction::Set { key, value } => {
            let mut updated = markers.settings().clone();
            updated.set_field(&key, &value)?;
            markers.update_settings(|settings| *settings = updated)?;
        }
    }
    println!("{}", serde_json::to_string_pretty(&markers.settings().to_value())?);
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#![forbid(unsafe_code)]

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use showcase_tools::config::{DeploymentMode, RuntimeOverrides, resolve_runtime_config};
use showcase_tools::gateway::{HttpTransport, UreqTransport};
use showcase_tools::logging::init_tracing;
use showcase_tools::models::{Settings, TextColor};
use showcase_tools::session::{Session, config_source};
use showcase_tools::settings::ConfigSource;
use showcase_tools::sheet::{parse_sheet, settings_from_sheet};
use tracing::info;

/// Operator tooling for a channel showcase deployment
#[derive(Parser, Debug)]
#[command(name = "showcase", version, about, long_about = None)]
struct Cli {
    /// Path to the .env file
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    /// Configuration source: `local` or `sheet`
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<DeploymentMode>,
    /// Local settings blob
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// CSV export URL used in sheet mode
    #[arg(long, global = true)]
    sheet_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the feed and print the public snapshot as JSON
    Feed {
        /// Number of video pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Inspect or edit the settings record
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Work with spreadsheet exports
    Sheet {
        #[command(subcommand)]
        action: SheetAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the resolved settings
    Show {
        /// Include the API key
        #[arg(long)]
        reveal: bool,
    },
    /// Edit the local settings blob
    Set(SettingsEdit),
}

#[derive(Subcommand, Debug)]
enum SheetAction {
    /// Parse a downloaded CSV export and print the settings it yields
    Parse { file: PathBuf },
}

#[derive(Args, Debug, Default)]
struct SettingsEdit {
    #[arg(long)]
    channel_id: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    banner: Option<String>,
    #[arg(long, value_parser = parse_color)]
    title_color: Option<TextColor>,
    #[arg(long, value_parser = parse_color)]
    description_color: Option<TextColor>,
    #[arg(long)]
    facebook: Option<String>,
    #[arg(long)]
    twitter: Option<String>,
    #[arg(long)]
    youtube: Option<String>,
}

impl SettingsEdit {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(value) = self.channel_id {
            settings.channel_id = value.trim().to_string();
        }
        if let Some(value) = self.api_key {
            settings.api_key = value.trim().to_string();
        }
        if let Some(value) = self.banner {
            settings.banner_image_url = value;
        }
        if let Some(color) = self.title_color {
            settings.style_settings.title_color = color;
        }
        if let Some(color) = self.description_color {
            settings.style_settings.description_color = color;
        }
        if let Some(value) = self.facebook {
            settings.social_links.facebook = value;
        }
        if let Some(value) = self.twitter {
            settings.social_links.twitter = value;
        }
        if let Some(value) = self.youtube {
            settings.social_links.youtube = value;
        }
        settings
    }
}

fn parse_mode(value: &str) -> Result<DeploymentMode, String> {
    DeploymentMode::parse(value).map_err(|err| err.to_string())
}

fn parse_color(value: &str) -> Result<TextColor, String> {
    TextColor::parse(value).ok_or_else(|| {
        let known: Vec<_> = TextColor::ALL.iter().map(|color| color.class()).collect();
        format!("unknown colour `{value}` (expected one of {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();
    let overrides = RuntimeOverrides {
        mode: cli.mode,
        settings_path: cli.settings,
        sheet_url: cli.sheet_url,
        env_path: cli.env_file,
        ..RuntimeOverrides::default()
    };

    match cli.command {
        Command::Sheet {
            action: SheetAction::Parse { file },
        } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            print_json(&settings_from_sheet(&parse_sheet(&text)))
        }
        Command::Feed { pages } => {
            let config = resolve_runtime_config(overrides)?;
            let session = Session::from_config(&config).await?;
            for _ in 1..pages {
                if !session.load_more().await {
                    break;
                }
            }
            print_json(&session.snapshot().redacted())
        }
        Command::Settings { action } => {
            let config = resolve_runtime_config(overrides)?;
            let transport: Arc<dyn HttpTransport> =
                Arc::new(UreqTransport::new(config.request_timeout));
            let source = config_source(&config, transport);
            match action {
                SettingsAction::Show { reveal } => {
                    let settings = source.resolve().await?;
                    if reveal {
                        print_json(&settings)
                    } else {
                        print_json(&settings.redacted())
                    }
                }
                SettingsAction::Set(edit) => {
                    let ConfigSource::Local(store) = &source else {
                        bail!("settings come from the sheet in this deployment and cannot be edited here");
                    };
                    let updated = edit.apply(store.get());
                    source.save(updated)?;
                    info!(path = %store.path().display(), "settings saved");
                    print_json(&store.get().redacted())
                }
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_tools::models::DEFAULT_CHANNEL_ID;

    #[test]
    fn cli_parses_settings_edit() {
        let cli = Cli::try_parse_from([
            "showcase",
            "--mode",
            "local",
            "settings",
            "set",
            "--channel-id",
            " UCnew ",
            "--title-color",
            "Cyan",
            "--description-color",
            "text-gray-300",
        ])
        .unwrap();
        assert_eq!(cli.mode, Some(DeploymentMode::Local));
        let Command::Settings {
            action: SettingsAction::Set(edit),
        } = cli.command
        else {
            panic!("expected settings set");
        };

        let updated = edit.apply(Settings::default());
        assert_eq!(updated.channel_id, "UCnew");
        assert_eq!(updated.style_settings.title_color, TextColor::Cyan);
        assert_eq!(
            updated.style_settings.description_color,
            TextColor::LightGray
        );
        assert!(updated.api_key.is_empty());
    }

    #[test]
    fn cli_rejects_unknown_colour_and_mode() {
        assert!(
            Cli::try_parse_from(["showcase", "settings", "set", "--title-color", "pink"]).is_err()
        );
        assert!(Cli::try_parse_from(["showcase", "--mode", "both", "feed"]).is_err());
    }

    #[test]
    fn feed_defaults_to_one_page() {
        let cli = Cli::try_parse_from(["showcase", "feed"]).unwrap();
        assert!(matches!(cli.command, Command::Feed { pages: 1 }));
    }

    #[test]
    fn empty_edit_keeps_settings() {
        let settings = SettingsEdit::default().apply(Settings::default());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.channel_id, DEFAULT_CHANNEL_ID);
    }
}

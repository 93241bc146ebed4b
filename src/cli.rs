//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::models::preferences::{FilterType, SortOrder, SortType, ThemeMode};

pub const USAGE: &str = "Usage: gallery [--path DIR | DIR] [--db FILE] [--search QUERY]
               [--filter all|photos|videos|favorites] [--album NAME]
               [--sort date|name|size] [--order asc|desc]
               [--toggle-favorite ID] [--theme light|dark|system]
               [--albums] [--viewport WxH] [--slideshow]";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Directory to scan before listing. Without it the existing index is listed.
    pub path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub search: Option<String>,
    pub filter: FilterType,
    pub album: Option<String>,
    pub sort: Option<SortType>,
    pub order: Option<SortOrder>,
    pub toggle_favorite: Option<i64>,
    pub theme: Option<ThemeMode>,
    pub list_albums: bool,
    /// Viewer size used to report each item's fit-to-view zoom.
    pub viewport: Option<(f64, f64)>,
    /// Print the filtered items one at a time, paced by the slideshow delay.
    pub slideshow: bool,
    pub help: bool,
}

impl CliArgs {
    pub fn from_env() -> Result<Self> {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--path" => {
                    let value = args.next().context("Missing value for --path")?;
                    parsed.path = Some(PathBuf::from(value));
                }
                "--db" => {
                    let value = args.next().context("Missing value for --db")?;
                    parsed.db_path = Some(PathBuf::from(value));
                }
                "--search" => {
                    parsed.search = Some(args.next().context("Missing value for --search")?);
                }
                "--filter" => {
                    let value = args.next().context("Missing value for --filter")?;
                    parsed.filter = value
                        .parse::<FilterType>()
                        .context("Failed to parse --filter")?;
                }
                "--album" => {
                    parsed.album = Some(args.next().context("Missing value for --album")?);
                }
                "--sort" => {
                    let value = args.next().context("Missing value for --sort")?;
                    parsed.sort = Some(
                        value
                            .parse::<SortType>()
                            .context("Failed to parse --sort")?,
                    );
                }
                "--order" => {
                    let value = args.next().context("Missing value for --order")?;
                    parsed.order = Some(
                        value
                            .parse::<SortOrder>()
                            .context("Failed to parse --order")?,
                    );
                }
                "--toggle-favorite" => {
                    let value = args
                        .next()
                        .context("Missing value for --toggle-favorite")?;
                    parsed.toggle_favorite = Some(
                        value
                            .parse::<i64>()
                            .context("Failed to parse --toggle-favorite as a media id")?,
                    );
                }
                "--theme" => {
                    let value = args.next().context("Missing value for --theme")?;
                    parsed.theme = Some(
                        value
                            .parse::<ThemeMode>()
                            .context("Failed to parse --theme")?,
                    );
                }
                "--albums" => parsed.list_albums = true,
                "--slideshow" => parsed.slideshow = true,
                "--viewport" => {
                    let value = args.next().context("Missing value for --viewport")?;
                    parsed.viewport = Some(parse_viewport(&value)?);
                }
                _ => {
                    if arg.starts_with('-') {
                        bail!("Unknown option {}", arg);
                    }
                    if parsed.path.is_some() {
                        bail!("Unexpected argument {}", arg);
                    }
                    parsed.path = Some(PathBuf::from(arg));
                }
            }
        }

        Ok(parsed)
    }
}

fn parse_viewport(value: &str) -> Result<(f64, f64)> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("Expected --viewport as WIDTHxHEIGHT, got {}", value))?;
    let width = w
        .trim()
        .parse::<f64>()
        .context("Failed to parse --viewport width")?;
    let height = h
        .trim()
        .parse::<f64>()
        .context("Failed to parse --viewport height")?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        bail!("--viewport dimensions must be finite and positive, got {}", value);
    }
    Ok((width, height))
}

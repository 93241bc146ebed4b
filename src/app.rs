use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use crate::cli::{CliArgs, USAGE};
use crate::config::AppConfig;
use crate::gesture::GestureEngine;
use crate::models::{MediaItem, MediaStore};
use crate::scanner::FileScanner;
use crate::viewmodel::{GalleryViewModel, Slideshow};

pub struct GalleryApp {
    args: CliArgs,
}

impl GalleryApp {
    pub fn new(args: CliArgs) -> Self {
        Self { args }
    }

    pub fn run(&self) -> i32 {
        match self.try_run() {
            Ok(()) => 0,
            Err(e) => {
                error!("{:#}", e);
                1
            }
        }
    }

    fn try_run(&self) -> Result<()> {
        let args = &self.args;
        if args.help {
            println!("{}", USAGE);
            return Ok(());
        }

        let config = AppConfig::from_env()?;
        let db_path = args.db_path.clone().unwrap_or_else(|| config.db_path.clone());

        if let Some(root) = &args.path {
            Self::scan(root, &db_path, &config)?;
        }

        let store = MediaStore::open(&db_path)?;
        let media = store.get_all_media()?;

        let mut gallery = GalleryViewModel::new(store);
        gallery.begin_loading();
        gallery.set_media(media);

        if args.sort.is_some() || args.order.is_some() {
            let sort_type = args.sort.unwrap_or(gallery.sort_type());
            let sort_order = args.order.unwrap_or(gallery.sort_order());
            gallery.set_sort(sort_type, sort_order);
        }
        if let Some(theme) = args.theme {
            gallery.set_theme_mode(theme);
        }
        if let Some(id) = args.toggle_favorite {
            if gallery.find(id).is_none() {
                bail!("No media with id {}", id);
            }
            let favorite = gallery.toggle_favorite(id);
            info!("Media {} favorite={}", id, favorite);
        }

        gallery.set_filter_type(args.filter);
        gallery.set_album_filter(args.album.clone());
        if let Some(query) = &args.search {
            gallery.set_search_query(query.as_str());
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if args.list_albums {
            for (name, items) in gallery.albums() {
                writeln!(out, "{}\t{}", name, items.len())?;
            }
            return Ok(());
        }
        if args.slideshow {
            return Self::play_slideshow(gallery.filtered_media(), &config, &mut out);
        }

        let mut engine = GestureEngine::new();
        if let Some((width, height)) = args.viewport {
            engine.on_viewport_resized(width, height);
        }

        for item in gallery.filtered_media() {
            let zoom = match args.viewport {
                Some(_) if item.width > 0 && item.height > 0 => {
                    let fit =
                        engine.on_content_bound(f64::from(item.width), f64::from(item.height));
                    format!("\t{}%", fit.zoom_percent())
                }
                Some(_) => "\t-".to_string(),
                None => String::new(),
            };
            writeln!(
                out,
                "{}{}\t{}\t{}\t{}\t{}{}",
                item.id,
                if gallery.is_favorite(item.id) { "*" } else { "" },
                item.name,
                item.formatted_size(),
                describe(item),
                item.bucket_name,
                zoom
            )?;
        }

        info!(
            "Listed {} of {} media items (theme {:?})",
            gallery.filtered_media().len(),
            gallery.all_media().len(),
            gallery.theme_mode()
        );
        Ok(())
    }

    /// Shows each item once, starting from the first, then stops at the wrap.
    fn play_slideshow(
        items: &[MediaItem],
        config: &AppConfig,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut show = Slideshow::new(items.len(), 0).with_delay(config.slideshow_delay_ms);
        if !show.toggle_play_pause() {
            info!("Nothing to show");
            return Ok(());
        }

        loop {
            let item = &items[show.position()];
            writeln!(
                out,
                "[{}/{}] {}",
                show.position() + 1,
                show.len(),
                item.path.display()
            )?;
            out.flush()?;
            std::thread::sleep(show.delay());
            match show.advance() {
                Some(0) | None => break,
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn scan(root: &Path, db_path: &Path, config: &AppConfig) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        let store = MediaStore::open(db_path)?;
        let scanner = FileScanner::with_config(config.scan_config());
        let (_, result) = runtime.block_on(scanner.scan_directory(root, store))?;

        info!(
            "Indexed {:?}: {} files ({} new, {} errors)",
            root, result.total_files, result.new_items, result.error_count
        );
        Ok(())
    }
}

fn describe(item: &MediaItem) -> String {
    if item.is_video() {
        item.formatted_duration()
    } else {
        item.resolution()
    }
}

/// Headless native entry point: replays a scripted viewer session and logs every frame.
///
/// Usage: `folio-native [--realtime] [project-slug] [local-hi-res-image]`
///
/// The first run writes the default configuration to the user config directory.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::Duration;

    use folio::config::AppConfig;
    use folio::constants::{DEFAULT_HERO_SIZE, PRELOAD_TIMEOUT_MS};
    use folio::demo::{demo_script, Session};
    use folio::preload::PreloadThread;
    use folio::project::Catalog;
    use folio_viewer::{ImageSources, ImageViewer, Size};

    let (config, config_problem) = match AppConfig::default_path() {
        Some(path) => match AppConfig::load_or_init(&path) {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(format!("{:?}: {}", path, e))),
        },
        None => (AppConfig::default(), Some("no config directory".to_string())),
    };
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();
    if let Some(problem) = config_problem {
        log::warn!("Using default configuration ({})", problem);
    }
    log::info!("{} native demo (log level {})", config.site_name, config.log_level.name());

    let catalog = match &config.projects_path {
        Some(path) => Catalog::load(path),
        None => Catalog::bundled(),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("Failed to load project catalog: {}", e);
            std::process::exit(1);
        }
    };

    let mut args = std::env::args().skip(1).peekable();
    let realtime = args.next_if(|a| a == "--realtime").is_some();
    let slug = args.next();
    let hi_res = args.next();

    let page = catalog.page(slug.as_deref());
    let project = page.project.clone();
    log::info!(
        "Project {}/{}: {} (prev: {}, next: {})",
        page.index + 1,
        catalog.len(),
        project.title,
        page.prev.map_or("-", |p| p.title.as_str()),
        page.next.map_or("-", |p| p.title.as_str()),
    );

    let primary = project.hero_image().unwrap_or_default().to_string();
    let mut sources = ImageSources::new(primary)
        .with_alt(format!("{} image preview", project.title))
        .with_label(format!("{} preview", project.title));
    if let Some(path) = hi_res {
        sources = sources.with_hi_res(path);
    }

    let captions = project.clone();
    let viewer = match ImageViewer::new(sources, config.viewer.clone()) {
        Ok(viewer) => viewer.on_scroll_percent(move |percent| {
            if let Some(point) = captions.active_info_point(percent) {
                log::info!("Scrolled {}%: {}", percent, point.text);
            }
        }),
        Err(e) => {
            log::error!("Invalid viewer settings: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = if realtime {
        Session::realtime(viewer)
    } else {
        Session::new(viewer)
    };
    let (width, height) = DEFAULT_HERO_SIZE;
    session.viewer_mut().set_natural_size(Size::new(width, height));

    let mut preloader = None;
    if let Some(url) = session.viewer_mut().take_preload_request() {
        match PreloadThread::spawn() {
            Ok(mut thread) => {
                thread.request(url);
                preloader = Some(thread);
            }
            Err(e) => log::warn!("Failed to spawn preload thread: {}", e),
        }
    }

    // The probe lands whenever it finishes, between scripted inputs
    for step in demo_script() {
        session.play(&[step]);
        if let Some(outcome) = preloader.as_mut().and_then(|p| p.take_one_result()) {
            session.viewer_mut().preload_finished(outcome.result);
        }
    }
    if let Some(thread) = preloader.as_mut().filter(|p| p.pending_count() > 0) {
        match thread.wait_one_result(Duration::from_millis(PRELOAD_TIMEOUT_MS)) {
            Some(outcome) => session.viewer_mut().preload_finished(outcome.result),
            None => log::warn!("High-resolution probe timed out"),
        }
    }
    let report = session.finish();
    log::info!(
        "Session done: {} frames, {} surface writes, {} source swaps, final scale {:.2}",
        report.frames,
        report.surface_writes,
        report.source_swaps.len(),
        report.final_state.scale
    );
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}

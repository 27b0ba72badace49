mod loader;

use anyhow::Context;
use loader::FileLoader;
use menu_core::{
    default_items, FrameTimer, GpuRenderer, MenuConfig, MenuEngine, MenuItem, Release, Viewport,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// A gallery file is either a bare item array or `{ "items": [...], "config": {...} }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum GalleryFile {
    Items(Vec<MenuItem>),
    Full {
        #[serde(default)]
        items: Vec<MenuItem>,
        #[serde(default)]
        config: MenuConfig,
    },
}

fn load_gallery(path: &Path) -> anyhow::Result<(Vec<MenuItem>, MenuConfig)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let parsed: GalleryFile =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(match parsed {
        GalleryFile::Items(items) => (items, MenuConfig::default()),
        GalleryFile::Full { items, config } => (items, config),
    })
}

fn format_date(item: &MenuItem) -> String {
    item.date.format("%A, %B %-d, %Y").to_string()
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let gallery_path = std::env::args().nth(1).map(PathBuf::from);
    let (mut items, config) = match &gallery_path {
        Some(path) => load_gallery(path)?,
        None => (Vec::new(), MenuConfig::default()),
    };
    if items.is_empty() {
        log::info!("no gallery items; using the built-in set");
        items = default_items();
    }
    let base_dir = gallery_path
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let event_loop = EventLoop::new().context("creating event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Infinite Menu (native)")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .context("creating window")?,
    );

    let size = window.inner_size();
    let renderer = pollster::block_on(GpuRenderer::new(
        Arc::clone(&window),
        size.width,
        size.height,
    ))
    .context("initialising wgpu")?;

    let mut engine = MenuEngine::new(renderer, items, config);
    engine.add_active_observer(|index: usize, item: &MenuItem| {
        log::info!("active #{index}: {} ({})", item.title, format_date(item));
    });
    engine.add_moving_observer(|moving: bool| {
        log::info!("{}", if moving { "moving" } else { "at rest" });
    });
    let scale = window.scale_factor();
    engine.resize(Viewport::new(
        size.width as f64 / scale,
        size.height as f64 / scale,
        scale,
    ));

    let mut loader = FileLoader::new(base_dir);
    engine.run(&mut loader, |_| {});

    let mut timer = FrameTimer::default();
    let mut cursor = (0.0f32, 0.0f32);

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => {
                    let scale = window.scale_factor();
                    engine.resize(Viewport::new(
                        size.width as f64 / scale,
                        size.height as f64 / scale,
                        scale,
                    ));
                }
                WindowEvent::CursorMoved { position, .. } => {
                    // Engine input is in logical pixels.
                    let scale = window.scale_factor();
                    cursor = ((position.x / scale) as f32, (position.y / scale) as f32);
                    engine.pointer_move(cursor.0, cursor.1);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => engine.pointer_down(cursor.0, cursor.1),
                    ElementState::Released => {
                        if engine.pointer_up(cursor.0, cursor.1) == Release::Tap {
                            if let Some(link) = engine.active_item().and_then(|i| i.link.clone()) {
                                log::info!("open {link}");
                            }
                        }
                    }
                },
                WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                    engine.pointer_cancel();
                }
                WindowEvent::RedrawRequested => {
                    loader.pump();
                    engine.advance(timer.tick());
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => {
                log::info!(
                    "exiting after {} frames, {} image loads still in flight",
                    engine.frame_count(),
                    loader.in_flight()
                );
            }
            _ => {}
        }
    })?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"{"image":"a.png","title":"A","date":"2024-03-01T00:00:00Z"}"#;

    #[test]
    fn gallery_accepts_bare_array() {
        let parsed: GalleryFile = serde_json::from_str(&format!("[{ITEM}]")).unwrap();
        assert!(matches!(parsed, GalleryFile::Items(ref v) if v.len() == 1));
    }

    #[test]
    fn gallery_accepts_items_and_config() {
        let text = format!(r#"{{"items":[{ITEM}],"config":{{"drag_sensitivity":0.01}}}}"#);
        let parsed: GalleryFile = serde_json::from_str(&text).unwrap();
        match parsed {
            GalleryFile::Full { items, config } => {
                assert_eq!(items.len(), 1);
                assert!((config.drag_sensitivity - 0.01).abs() < 1e-6);
            }
            GalleryFile::Items(_) => panic!("expected the object form"),
        }
    }

    #[test]
    fn dates_render_long_form() {
        let parsed: Vec<MenuItem> = serde_json::from_str(&format!("[{ITEM}]")).unwrap();
        assert_eq!(format_date(&parsed[0]), "Friday, March 1, 2024");
    }
}

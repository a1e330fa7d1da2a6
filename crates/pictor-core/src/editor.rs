//! The editor facade.
//!
//! Owns the state, the canvas synchronizer and the compiler, and runs the
//! loop: dispatch → reduce → sync → recompile. Timers are driven by the
//! host through [`Editor::tick`].

use tracing::{debug, info, warn};

use crate::canvas::{
    poll_image, CanvasEvent, CanvasSynchronizer, Debouncer, ImageFetcher, LoadTicket,
    Notification, Sleeper,
};
use crate::compile::{Compiler, Operation, QueryEncoder, TransformationEncoder};
use crate::config::EditorConfig;
use crate::error::{EditorResult, ResourceError};
use crate::geometry::Size;
use crate::state::{reduce, Action, BackgroundPatch, EditorState};

pub struct Editor<E = QueryEncoder> {
    config: EditorConfig,
    source_url: String,
    state: EditorState,
    canvas: CanvasSynchronizer,
    compiler: Compiler<E>,
    operations: Vec<Operation>,
    delivery_url: String,
    in_flight: Option<LoadTicket>,
    canvas_resize: Debouncer<Size>,
    color_commit: Debouncer<String>,
}

impl Editor<QueryEncoder> {
    pub fn new(source_url: impl Into<String>, config: EditorConfig) -> EditorResult<Self> {
        Self::with_encoder(source_url, config, QueryEncoder)
    }
}

impl<E: TransformationEncoder> Editor<E> {
    pub fn with_encoder(
        source_url: impl Into<String>,
        config: EditorConfig,
        encoder: E,
    ) -> EditorResult<Self> {
        config.validate()?;
        let source_url = source_url.into();
        info!(url = %source_url, "creating editor");
        Ok(Self {
            state: EditorState::new(config.history_limit),
            canvas: CanvasSynchronizer::new(&config),
            compiler: Compiler::with_encoder(encoder),
            operations: Vec::new(),
            delivery_url: source_url.clone(),
            in_flight: None,
            canvas_resize: Debouncer::new(config.canvas_resize_debounce_ms),
            color_commit: Debouncer::new(config.color_commit_debounce_ms),
            source_url,
            config,
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn canvas(&self) -> &CanvasSynchronizer {
        &self.canvas
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Operations compiled from the committed snapshot.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn delivery_url(&self) -> &str {
        &self.delivery_url
    }

    /// Apply an action. On error the editor is left exactly as it was.
    pub fn dispatch(&mut self, action: Action) -> EditorResult<()> {
        let next = reduce(&self.state, action)?;

        if next.committed() != self.state.committed() {
            let operations = self.compiler.compile(next.committed())?;
            self.delivery_url = {
                let url = self.compiler.encoder().encode(&operations, &self.source_url);
                debug!(%url, "delivery url changed");
                url
            };
            self.operations = operations;
        }

        self.state = next;
        self.canvas.sync(&self.state);
        Ok(())
    }

    /// Forward a canvas gesture; resulting actions are dispatched in order.
    pub fn handle_canvas_event(&mut self, event: CanvasEvent) -> EditorResult<()> {
        let actions = self.canvas.handle(event, &self.state);
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(())
    }

    /// Record an observed canvas size; applied once it has been stable.
    pub fn observe_canvas_resize(&mut self, size: Size, now_ms: u64) -> u64 {
        self.canvas_resize.schedule(size, now_ms)
    }

    /// Record a colour input value; applied once it has been stable.
    pub fn queue_background_color(&mut self, color: impl Into<String>, now_ms: u64) -> u64 {
        self.color_commit.schedule(color.into(), now_ms)
    }

    /// Earliest time a pending debounced value becomes due.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.canvas_resize.due_at(), self.color_commit.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Release debounced values that are due.
    pub fn tick(&mut self, now_ms: u64) -> EditorResult<()> {
        if let Some(size) = self.canvas_resize.take_due(now_ms) {
            self.dispatch(Action::SetCanvasSize(size))?;
        }
        if let Some(color) = self.color_commit.take_due(now_ms) {
            self.dispatch(Action::SetBackground(BackgroundPatch {
                color: Some(color),
                ..BackgroundPatch::default()
            }))?;
        }
        Ok(())
    }

    /// Drive the loading overlay animation.
    pub fn tick_overlay(&mut self, elapsed_ms: u64) {
        self.canvas.tick_overlay(elapsed_ms);
    }

    /// URL the canvas should currently display.
    pub fn preview_url(&self) -> EditorResult<String> {
        self.compiler
            .preview_url(self.state.committed(), &self.source_url, self.state.tool)
    }

    /// Whether the shown (or loading) image differs from the preview URL.
    pub fn preview_stale(&self) -> EditorResult<bool> {
        let url = self.preview_url()?;
        let shown = self.state.image.as_ref().map(|i| i.url.as_str());
        let loading = self.in_flight.as_ref().map(|t| t.url.as_str());
        Ok(shown != Some(url.as_str()) && loading != Some(url.as_str()))
    }

    /// Start loading the preview image if it is stale.
    pub fn begin_preview_load(&mut self) -> EditorResult<Option<LoadTicket>> {
        if !self.preview_stale()? {
            return Ok(None);
        }
        let ticket = self.canvas.begin_load(self.preview_url()?);
        self.in_flight = Some(ticket.clone());
        Ok(Some(ticket))
    }

    /// Apply a load result. Stale tickets are ignored.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Size, ResourceError>,
    ) -> EditorResult<()> {
        if !self.canvas.is_current(ticket) {
            self.canvas.finish_load(ticket, result);
            return Ok(());
        }
        self.in_flight = None;
        let failure = result.as_ref().err().cloned();
        if let Some(action) = self.canvas.finish_load(ticket, result) {
            self.dispatch(action)?;
        }
        match failure {
            Some(e) => {
                warn!(error = %e, "preview load failed");
                Err(e.into())
            }
            None => Ok(()),
        }
    }

    /// Load the preview with the given fetcher, polling until ready.
    pub async fn load_preview<F, S>(&mut self, fetcher: &F, sleeper: &S) -> EditorResult<()>
    where
        F: ImageFetcher,
        S: Sleeper,
    {
        let Some(ticket) = self.begin_preview_load()? else {
            return Ok(());
        };
        let result = poll_image(&ticket.url, fetcher, sleeper, &self.config.load).await;
        self.finish_load(&ticket, result)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.canvas.take_notifications()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::canvas::testing::{ready, status, InstantSleep, Scripted};
    use crate::canvas::keys;
    use crate::geometry::Rect;
    use crate::state::{AdjustPatch, BackgroundKind, ResizePatch, Tool};

    const SRC: &str = "https://cdn.example.com/demo.jpg";

    fn editor() -> Editor {
        let mut editor = Editor::new(SRC, EditorConfig::default()).unwrap();
        editor
            .dispatch(Action::SetCanvasSize(Size::new(800.0, 600.0)))
            .unwrap();
        editor
    }

    fn loaded() -> Editor {
        let mut e = editor();
        let fetcher = Scripted::new(vec![Ok(ready(1600, 1200))]);
        block_on(e.load_preview(&fetcher, &InstantSleep::default())).unwrap();
        e
    }

    #[test]
    fn test_fresh_editor_delivers_source() {
        let e = editor();
        assert_eq!(e.delivery_url(), SRC);
        assert!(e.operations().is_empty());
    }

    #[test]
    fn test_delivery_url_follows_commits_only() {
        let mut e = editor();
        e.dispatch(Action::SetResize(ResizePatch {
            width: Some(200),
            height: Some(100),
            ..ResizePatch::default()
        }))
        .unwrap();
        assert_eq!(e.delivery_url(), SRC);

        e.dispatch(Action::Commit).unwrap();
        assert_eq!(e.delivery_url(), format!("{SRC}?tr=w-200,h-100"));
        assert_eq!(e.operations().len(), 1);

        e.dispatch(Action::Undo).unwrap();
        assert_eq!(e.delivery_url(), SRC);
        e.dispatch(Action::Redo).unwrap();
        assert_eq!(e.delivery_url(), format!("{SRC}?tr=w-200,h-100"));
    }

    #[test]
    fn test_rejected_action_keeps_state() {
        let mut e = editor();
        let before = e.state().clone();
        let err = e
            .dispatch(Action::SetResize(ResizePatch {
                width: Some(0),
                ..ResizePatch::default()
            }))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn test_load_preview_dispatches_image_loaded() {
        let e = loaded();
        let image = e.state().image.as_ref().unwrap();
        assert_eq!(image.url, SRC);
        assert_eq!(image.size, Size::new(1600.0, 1200.0));
        assert!(!e.preview_stale().unwrap());
        assert!(e.canvas().arena().contains(keys::IMAGE));
    }

    #[test]
    fn test_failed_load_surfaces_error_and_notification() {
        let mut e = editor();
        let fetcher = Scripted::new(vec![Ok(status(401))]);
        let err = block_on(e.load_preview(&fetcher, &InstantSleep::default())).unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(e.take_notifications().len(), 1);
        assert!(!e.canvas().is_loading());
        assert!(e.state().image.is_none());
    }

    #[test]
    fn test_superseded_load_is_ignored() {
        let mut e = loaded();
        e.dispatch(Action::SetResize(ResizePatch {
            width: Some(400),
            ..ResizePatch::default()
        }))
        .unwrap();
        e.dispatch(Action::Commit).unwrap();
        let old = e.begin_preview_load().unwrap().unwrap();

        e.dispatch(Action::SetAdjust(AdjustPatch {
            grayscale: Some(true),
            ..AdjustPatch::default()
        }))
        .unwrap();
        e.dispatch(Action::Commit).unwrap();
        let new = e.begin_preview_load().unwrap().unwrap();
        assert_ne!(old.url, new.url);
        assert!(new.url.ends_with("e-grayscale"));

        e.finish_load(&old, Ok(Size::new(400.0, 300.0))).unwrap();
        assert_eq!(e.state().image.as_ref().unwrap().url, SRC);
        e.finish_load(&new, Ok(Size::new(1600.0, 1200.0))).unwrap();
        assert_eq!(e.state().image.as_ref().unwrap().url, new.url);
    }

    #[test]
    fn test_resize_gesture_round_trip() {
        let mut e = loaded();
        e.dispatch(Action::SelectTool(Tool::Resize)).unwrap();
        e.handle_canvas_event(CanvasEvent::Transform {
            target: keys::RESIZE.into(),
            rect: Rect::new(0.0, 0.0, 400.0, 300.0),
        })
        .unwrap();
        assert_eq!(e.state().options.resize.width, Some(800));
        assert_eq!(e.state().options.resize.height, Some(600));
        // The box is re-laid out from state, centred in the image.
        let rect = e.canvas().arena().get(keys::RESIZE).unwrap().rect;
        assert_eq!(rect, Rect::new(200.0, 150.0, 400.0, 300.0));
    }

    #[test]
    fn test_debounced_canvas_resize_and_color() {
        let mut e = editor();
        e.observe_canvas_resize(Size::new(1000.0, 700.0), 0);
        e.observe_canvas_resize(Size::new(1024.0, 768.0), 100);
        e.queue_background_color("#00ff00", 100);
        assert_eq!(e.next_deadline(), Some(250));

        e.tick(200).unwrap();
        assert_eq!(e.state().canvas, Size::new(800.0, 600.0));
        e.tick(250).unwrap();
        assert_eq!(e.state().canvas, Size::new(1024.0, 768.0));
        assert_eq!(e.state().options.background.color, None);

        e.tick(400).unwrap();
        assert_eq!(e.state().options.background.color.as_deref(), Some("00FF00"));
        assert_eq!(e.state().options.background.kind, BackgroundKind::None);
        assert_eq!(e.next_deadline(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EditorConfig {
            history_limit: 0,
            ..EditorConfig::default()
        };
        assert!(Editor::new(SRC, config).is_err());
    }
}

//! WASM bindings for the editor facade.
//!
//! Loading is host-driven: `begin_preview_load` hands out a ticket, the
//! host fetches the URL and reports each response through
//! `submit_response`, sleeping between attempts as the returned step asks.

use std::collections::BTreeMap;

use pictor_core::canvas::{FetchResponse, LoadAttempts, LoadTicket, PollDecision};
use pictor_core::error::ResourceError;
use pictor_core::geometry::Size;
use pictor_core::{Action, CanvasEvent, Editor, EditorConfig, EditorResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// What the host should do after reporting a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadStep {
    /// The image is shown on the canvas.
    Ready { width: f64, height: f64 },
    /// Fetch the same URL again after the delay.
    Retry { after_ms: u64 },
    /// Loading stopped; a notification was raised.
    Failed { message: String },
    /// The ticket was superseded; drop the response.
    Stale,
}

struct PendingLoad {
    ticket: LoadTicket,
    attempts: LoadAttempts,
}

/// An image editor session bound to one source image.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
    pending: Option<PendingLoad>,
}

/// Maps become plain objects and integers become numbers.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS timestamps arrive as numbers.
fn millis(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor for `source_url`.
    ///
    /// # Arguments
    /// * `source_url` - URL of the untransformed image
    /// * `config_json` - Optional JSON editor settings; missing keys use defaults
    ///
    /// # Errors
    /// Returns error if the settings are malformed or out of range
    #[wasm_bindgen(constructor)]
    pub fn new(source_url: String, config_json: Option<String>) -> Result<JsEditor, JsValue> {
        JsEditor::create(source_url, config_json.as_deref()).map_err(js_err)
    }

    /// Apply an action such as `{ type: 'select_tool', payload: 'crop' }`.
    pub fn dispatch(&mut self, action: JsValue) -> Result<(), JsValue> {
        let action: Action = serde_wasm_bindgen::from_value(action)
            .map_err(|e| JsValue::from_str(&format!("Invalid action: {}", e)))?;
        self.inner.dispatch(action).map_err(js_err)
    }

    /// Forward a canvas event such as a box transform or wheel scroll.
    pub fn handle_canvas_event(&mut self, event: JsValue) -> Result<(), JsValue> {
        let event: CanvasEvent = serde_wasm_bindgen::from_value(event)
            .map_err(|e| JsValue::from_str(&format!("Invalid canvas event: {}", e)))?;
        self.inner.handle_canvas_event(event).map_err(js_err)
    }

    /// Full editor state as a plain object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.state())
    }

    /// URL with every committed transformation applied.
    #[wasm_bindgen(getter)]
    pub fn delivery_url(&self) -> String {
        self.inner.delivery_url().to_string()
    }

    /// URL the canvas should show for the active tool.
    pub fn preview_url(&self) -> Result<String, JsValue> {
        self.inner.preview_url().map_err(js_err)
    }

    /// Compiled operations behind the delivery URL.
    pub fn operations(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.operations())
    }

    /// Scene primitives, back to front.
    pub fn scene(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.canvas().render_order())
    }

    /// Report a canvas size change; applied after the quiet period.
    ///
    /// Returns the debounce generation.
    pub fn observe_canvas_resize(&mut self, width: f64, height: f64, now_ms: f64) -> f64 {
        self.inner
            .observe_canvas_resize(Size::new(width, height), millis(now_ms)) as f64
    }

    /// Queue a background color from a live picker; committed after the
    /// quiet period.
    pub fn queue_background_color(&mut self, color: String, now_ms: f64) -> f64 {
        self.inner.queue_background_color(color, millis(now_ms)) as f64
    }

    /// Earliest time `tick` has work to do, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner.next_deadline().map(|t| t as f64)
    }

    /// Release debounced values due at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.inner.tick(millis(now_ms)).map_err(js_err)
    }

    /// Same as `tick`, using the browser clock.
    pub fn tick_now(&mut self) -> Result<(), JsValue> {
        self.tick(js_sys::Date::now())
    }

    /// Advance the loading overlay animation.
    pub fn tick_overlay(&mut self, elapsed_ms: f64) {
        self.inner.tick_overlay(millis(elapsed_ms));
    }

    /// Start loading the preview if it changed.
    ///
    /// Returns `{ generation, url }`, or `null` when nothing needs
    /// loading.
    pub fn begin_preview_load(&mut self) -> Result<JsValue, JsValue> {
        let ticket = self.begin_load().map_err(js_err)?;
        to_js(&ticket)
    }

    /// Report one HTTP response for the ticket `generation`.
    ///
    /// # Arguments
    /// * `generation` - Ticket generation from `begin_preview_load`
    /// * `status` - HTTP status code
    /// * `headers` - Plain object of response headers
    /// * `body` - Response bytes
    pub fn submit_response(
        &mut self,
        generation: f64,
        status: u16,
        headers: JsValue,
        body: Vec<u8>,
    ) -> Result<JsValue, JsValue> {
        let headers: BTreeMap<String, String> = if headers.is_undefined() || headers.is_null() {
            BTreeMap::new()
        } else {
            serde_wasm_bindgen::from_value(headers)
                .map_err(|e| JsValue::from_str(&format!("Invalid headers: {}", e)))?
        };
        let response = FetchResponse {
            status,
            headers: headers.into_iter().collect(),
            body,
        };
        let step = self.submit(millis(generation), response).map_err(js_err)?;
        if let LoadStep::Failed { message } = &step {
            web_sys::console::warn_1(&JsValue::from_str(message));
        }
        to_js(&step)
    }

    /// Report a network failure for the ticket `generation`.
    pub fn fail_fetch(&mut self, generation: f64, message: String) -> Result<JsValue, JsValue> {
        let step = self
            .fetch_failed(millis(generation), ResourceError::Fetch(message))
            .map_err(js_err)?;
        to_js(&step)
    }

    /// Drain user-facing notifications.
    pub fn take_notifications(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.take_notifications())
    }
}

impl JsEditor {
    pub(crate) fn create(source_url: String, config_json: Option<&str>) -> EditorResult<Self> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(json)?,
            None => EditorConfig::default(),
        };
        Ok(Self {
            inner: Editor::new(source_url, config)?,
            pending: None,
        })
    }

    #[cfg(test)]
    pub(crate) fn editor(&self) -> &Editor {
        &self.inner
    }

    #[cfg(test)]
    pub(crate) fn editor_mut(&mut self) -> &mut Editor {
        &mut self.inner
    }

    pub(crate) fn begin_load(&mut self) -> EditorResult<Option<LoadTicket>> {
        let Some(ticket) = self.inner.begin_preview_load()? else {
            return Ok(None);
        };
        self.pending = Some(PendingLoad {
            attempts: LoadAttempts::new(ticket.url.clone(), &self.inner.config().load),
            ticket: ticket.clone(),
        });
        Ok(Some(ticket))
    }

    pub(crate) fn submit(&mut self, generation: u64, response: FetchResponse) -> EditorResult<LoadStep> {
        match self.pending_for(generation) {
            Some(pending) => {
                let decision = pending.attempts.evaluate(&response);
                self.settle(decision)
            }
            None => Ok(LoadStep::Stale),
        }
    }

    pub(crate) fn fetch_failed(&mut self, generation: u64, error: ResourceError) -> EditorResult<LoadStep> {
        match self.pending_for(generation) {
            Some(pending) => {
                let decision = pending.attempts.fetch_failed(&error);
                self.settle(decision)
            }
            None => Ok(LoadStep::Stale),
        }
    }

    fn pending_for(&mut self, generation: u64) -> Option<&mut PendingLoad> {
        self.pending
            .as_mut()
            .filter(|p| p.ticket.generation == generation)
    }

    fn take_ticket(&mut self) -> Option<LoadTicket> {
        self.pending.take().map(|p| p.ticket)
    }

    fn settle(&mut self, decision: PollDecision) -> EditorResult<LoadStep> {
        match decision {
            PollDecision::Retry { after } => Ok(LoadStep::Retry {
                after_ms: after.as_millis() as u64,
            }),
            PollDecision::Ready(size) => {
                let Some(ticket) = self.take_ticket() else {
                    return Ok(LoadStep::Stale);
                };
                self.inner.finish_load(&ticket, Ok(size))?;
                Ok(LoadStep::Ready {
                    width: size.width,
                    height: size.height,
                })
            }
            PollDecision::Failed(error) => {
                let Some(ticket) = self.take_ticket() else {
                    return Ok(LoadStep::Stale);
                };
                let message = error.to_string();
                // The resource error has already become a notification.
                match self.inner.finish_load(&ticket, Err(error)) {
                    Err(e) if e.is_validation() => Err(e),
                    _ => Ok(LoadStep::Failed { message }),
                }
            }
        }
    }
}

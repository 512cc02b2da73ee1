//! Console state and the controller transitions that drive it.
//!
//! The console never does I/O itself. A transition that needs the backend
//! hands back a [`Command`]; the app runs it with [`execute`] and feeds the
//! resulting [`ConsoleEvent`] into [`Console::apply`].

use std::sync::mpsc::Sender;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::model::{Bin, BinDetail};
use crate::toast::{Severity, Toasts};
use crate::view::{self, BinsView};

pub const CREATE_LABEL: &str = "+ Create New Bin";
pub const CREATING_LABEL: &str = "Creating...";
pub const SAVE_LABEL: &str = "💾 Save Configuration";
pub const SAVING_LABEL: &str = "Saving...";

/// Network work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadBins,
    OpenBin(String),
    CreateBin,
    /// Reload the list, and once that has finished open the given bin.
    ReloadThenOpen(String),
    SaveResponse { id: String, status: u16, body: Value },
}

/// Outcome of a [`Command`], delivered back to the UI thread.
#[derive(Debug)]
pub enum ConsoleEvent {
    BinsLoaded(Result<Vec<Bin>>),
    DetailLoaded(Result<BinDetail>),
    BinCreated(Result<Option<String>>),
    ResponseSaved {
        id: String,
        status: u16,
        body: Value,
        result: Result<()>,
    },
}

/// What the bin grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridState {
    Loading,
    Failed,
    Ready,
}

/// Editable fields of the open bin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorForm {
    pub status_code: String,
    pub body: String,
    pub json_error: Option<String>,
}

/// Somewhere text can be copied to.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard, opened lazily on first use and kept so the contents
/// survive on platforms where the owner must stay alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ConsoleError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ConsoleError::Clipboard(e.to_string())),
            None => Err(ConsoleError::Clipboard("not initialised".to_string())),
        }
    }
}

pub struct Console {
    base_url: String,
    bins: Vec<Bin>,
    grid: GridState,
    current_bin: Option<BinDetail>,
    pub editor: EditorForm,
    creating: bool,
    saving: bool,
    toasts: Toasts,
}

impl Console {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bins: Vec::new(),
            grid: GridState::Loading,
            current_bin: None,
            editor: EditorForm::default(),
            creating: false,
            saving: false,
            toasts: Toasts::default(),
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn grid(&self) -> GridState {
        self.grid
    }

    pub fn bins_view(&self, now: chrono::DateTime<chrono::Utc>) -> BinsView {
        view::bins_view(&self.bins, now)
    }

    pub fn current_bin(&self) -> Option<&BinDetail> {
        self.current_bin.as_ref()
    }

    /// The editor modal is open exactly while a bin is loaded into it.
    pub fn is_modal_open(&self) -> bool {
        self.current_bin.is_some()
    }

    /// Full public URL of the open bin.
    pub fn current_bin_url(&self) -> Option<String> {
        self.current_bin
            .as_ref()
            .map(|bin| format!("{}{}", self.base_url, bin.url))
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn create_label(&self) -> &'static str {
        if self.creating { CREATING_LABEL } else { CREATE_LABEL }
    }

    pub fn save_label(&self) -> &'static str {
        if self.saving { SAVING_LABEL } else { SAVE_LABEL }
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    pub fn load_bins(&mut self) -> Command {
        self.grid = GridState::Loading;
        Command::LoadBins
    }

    pub fn open_bin_editor(&self, id: &str) -> Command {
        Command::OpenBin(id.to_string())
    }

    pub fn create_new_bin(&mut self) -> Option<Command> {
        if self.creating {
            return None;
        }
        self.creating = true;
        Some(Command::CreateBin)
    }

    pub fn save_response_config(&mut self) -> Option<Command> {
        let id = self.current_bin.as_ref()?.id.clone();

        let body_text = self.editor.body.trim().to_string();
        let Some(body) = self.check_body(&body_text) else {
            self.toasts
                .show("Please fix JSON errors before saving", Severity::Error);
            return None;
        };

        let Some(status) = parse_status_code(&self.editor.status_code) else {
            self.toasts.show(
                "Status code must be a number between 100 and 599",
                Severity::Error,
            );
            return None;
        };

        self.saving = true;
        Some(Command::SaveResponse { id, status, body })
    }

    /// Live validation while the body is being typed.
    pub fn on_body_edited(&mut self) {
        let text = self.editor.body.trim().to_string();
        if text.is_empty() {
            self.editor.json_error = None;
        } else {
            self.check_body(&text);
        }
    }

    /// Validate `text`, updating the inline error. Returns the parsed value.
    pub fn check_body(&mut self, text: &str) -> Option<Value> {
        match view::validate_json(text) {
            Ok(value) => {
                self.editor.json_error = None;
                Some(value)
            }
            Err(e) => {
                self.editor.json_error = Some(e.to_string());
                None
            }
        }
    }

    /// Load `detail` into the editor and open the modal. Whatever was open
    /// before is replaced wholesale.
    pub fn render_bin_detail(&mut self, detail: BinDetail) {
        self.editor = EditorForm {
            status_code: detail.response.status.to_string(),
            body: view::pretty_json(&detail.response.body),
            json_error: None,
        };
        self.current_bin = Some(detail);
    }

    /// Close the modal, discarding unsaved edits.
    pub fn close_modal(&mut self) {
        self.current_bin = None;
        self.editor = EditorForm::default();
    }

    /// Escape closes the modal if it is open. Returns whether it did.
    pub fn handle_escape(&mut self) -> bool {
        if !self.is_modal_open() {
            return false;
        }
        self.close_modal();
        true
    }

    pub fn copy_to_clipboard(
        &mut self,
        clipboard: &mut dyn ClipboardSink,
        text: &str,
        label: &str,
    ) {
        match clipboard.set_text(text) {
            Ok(()) => self
                .toasts
                .show(format!("{} copied to clipboard!", label), Severity::Success),
            Err(e) => {
                error!("Failed to copy: {}", e);
                self.toasts.show("Failed to copy to clipboard", Severity::Error);
            }
        }
    }

    /// Report the outcome of a local side effect (browser, file export).
    pub fn report(&mut self, outcome: Result<String>, failure: &str) {
        match outcome {
            Ok(message) => self.toasts.show(message, Severity::Success),
            Err(e) => {
                error!("{}: {}", failure, e);
                self.toasts.show(failure, Severity::Error);
            }
        }
    }

    /// Fold a finished command back into the state, possibly asking for a
    /// follow-up.
    pub fn apply(&mut self, event: ConsoleEvent) -> Option<Command> {
        match event {
            ConsoleEvent::BinsLoaded(Ok(bins)) => {
                info!(count = bins.len(), "Loaded bins");
                self.bins = bins;
                self.grid = GridState::Ready;
                None
            }
            ConsoleEvent::BinsLoaded(Err(e)) => {
                error!("Error loading bins: {}", e);
                self.toasts.show("Failed to load bins", Severity::Error);
                self.grid = GridState::Failed;
                None
            }
            ConsoleEvent::DetailLoaded(Ok(detail)) => {
                info!(id = %detail.id, "Opened bin");
                self.render_bin_detail(detail);
                None
            }
            ConsoleEvent::DetailLoaded(Err(e)) => {
                error!("Error loading bin detail: {}", e);
                self.toasts.show("Failed to load bin details", Severity::Error);
                None
            }
            ConsoleEvent::BinCreated(result) => {
                self.creating = false;
                match result {
                    Ok(Some(id)) => {
                        info!(%id, "Created bin");
                        self.toasts.show("Bin created successfully!", Severity::Success);
                        self.grid = GridState::Loading;
                        Some(Command::ReloadThenOpen(id))
                    }
                    Ok(None) => {
                        warn!("Create succeeded but no bin id was found in the response");
                        None
                    }
                    Err(e) => {
                        error!("Error creating bin: {}", e);
                        self.toasts.show("Failed to create bin", Severity::Error);
                        None
                    }
                }
            }
            ConsoleEvent::ResponseSaved {
                id,
                status,
                body,
                result,
            } => {
                self.saving = false;
                match result {
                    Ok(()) => {
                        info!(%id, status, "Saved response configuration");
                        self.toasts
                            .show("Response configuration saved!", Severity::Success);
                        if let Some(bin) = self.current_bin.as_mut().filter(|bin| bin.id == id) {
                            bin.response.status = status;
                            bin.response.body = body;
                        }
                    }
                    Err(e) => {
                        error!("Error saving response: {}", e);
                        self.toasts.show("Failed to save configuration", Severity::Error);
                    }
                }
                None
            }
        }
    }
}

/// Accepts an HTTP status code in 100..=599.
pub fn parse_status_code(text: &str) -> Option<u16> {
    text.trim()
        .parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
}

/// Run `command` against the backend, sending each outcome on `tx` as soon as
/// it is known.
pub async fn execute(api: &ApiClient, command: Command, tx: &Sender<ConsoleEvent>) {
    let events: Vec<ConsoleEvent> = match command {
        Command::LoadBins => vec![ConsoleEvent::BinsLoaded(api.list_bins().await)],
        Command::OpenBin(id) => vec![ConsoleEvent::DetailLoaded(api.get_bin_detail(&id).await)],
        Command::CreateBin => vec![ConsoleEvent::BinCreated(api.create_bin().await)],
        Command::ReloadThenOpen(id) => {
            let _ = tx.send(ConsoleEvent::BinsLoaded(api.list_bins().await));
            vec![ConsoleEvent::DetailLoaded(api.get_bin_detail(&id).await)]
        }
        Command::SaveResponse { id, status, body } => {
            let result = api.update_bin_response(&id, status, &body).await;
            vec![ConsoleEvent::ResponseSaved {
                id,
                status,
                body,
                result,
            }]
        }
    };

    for event in events {
        // The receiver only goes away when the window has closed.
        let _ = tx.send(event);
    }
}

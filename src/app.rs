use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, RichText};
use egui_extras::{Size, StripBuilder};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::api::ApiClient;
use crate::config::Config;
use crate::console::{self, Command, Console, ConsoleEvent, SystemClipboard};
use crate::error::Result;
use crate::model::LogEntry;
use crate::toast::Severity;
use crate::view::{self, BinCard, BinsView, LogRow};

const ACCENT: Color32 = Color32::from_rgb(231, 99, 49);
const ACTIVE: Color32 = Color32::from_rgb(46, 160, 67);
const ERROR: Color32 = Color32::from_rgb(220, 68, 55);

/// Fires the periodic bin-list reload, whatever the modal is doing.
#[derive(Debug, Clone, Copy)]
struct RefreshTimer {
    every: Duration,
    last: Instant,
}

impl RefreshTimer {
    fn new(every: Duration, now: Instant) -> Self {
        Self { every, last: now }
    }

    fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) >= self.every
    }

    fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.every
            .saturating_sub(now.saturating_duration_since(self.last))
    }
}

/// Things the user asked for during a frame. Collected while painting and
/// handled once painting is done.
enum Action {
    Refresh,
    Create,
    Open(String),
    Close,
    Save,
    BodyEdited,
    CopyId,
    CopyUrl,
    OpenInBrowser,
    ExportLogs,
}

pub struct BinConsoleApp {
    console: Console,
    api: ApiClient,
    runtime: Runtime,
    clipboard: SystemClipboard,

    refresh: RefreshTimer,

    // Communication channel for async requests
    tx: Sender<ConsoleEvent>,
    rx: Receiver<ConsoleEvent>,
}

impl BinConsoleApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &Config,
        api: ApiClient,
        runtime: Runtime,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            console: Console::new(config.base_url()),
            api,
            runtime,
            clipboard: SystemClipboard::default(),
            refresh: RefreshTimer::new(config.refresh_interval(), Instant::now()),
            tx,
            rx,
        };
        app.refresh(&cc.egui_ctx);
        app
    }

    pub fn name() -> &'static str {
        "Bin Console"
    }

    fn dispatch(&self, ctx: &egui::Context, command: Command) {
        debug!(?command, "Dispatching");
        let api = self.api.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            console::execute(&api, command, &tx).await;
            ctx.request_repaint();
        });
    }

    fn refresh(&mut self, ctx: &egui::Context) {
        self.refresh.reset(Instant::now());
        let command = self.console.load_bins();
        self.dispatch(ctx, command);
    }

    fn handle(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Refresh => self.refresh(ctx),
            Action::Create => {
                if let Some(command) = self.console.create_new_bin() {
                    self.dispatch(ctx, command);
                }
            }
            Action::Open(id) => {
                let command = self.console.open_bin_editor(&id);
                self.dispatch(ctx, command);
            }
            Action::Close => self.console.close_modal(),
            Action::Save => {
                if let Some(command) = self.console.save_response_config() {
                    self.dispatch(ctx, command);
                }
            }
            Action::BodyEdited => self.console.on_body_edited(),
            Action::CopyId => {
                if let Some(id) = self.console.current_bin().map(|bin| bin.id.clone()) {
                    self.console.copy_to_clipboard(&mut self.clipboard, &id, "Bin ID");
                }
            }
            Action::CopyUrl => {
                if let Some(url) = self.console.current_bin_url() {
                    self.console.copy_to_clipboard(&mut self.clipboard, &url, "Bin URL");
                }
            }
            Action::OpenInBrowser => {
                if let Some(url) = self.console.current_bin_url() {
                    let outcome = opener::open_browser(&url)
                        .map(|()| "Opened bin URL in browser".to_string())
                        .map_err(Into::into);
                    self.console.report(outcome, "Failed to open browser");
                }
            }
            Action::ExportLogs => {
                let Some(bin) = self.console.current_bin() else {
                    return;
                };
                let Some(path) = rfd::FileDialog::new()
                    .set_file_name(format!("{}-logs.json", bin.id))
                    .add_filter("JSON", &["json"])
                    .save_file()
                else {
                    return;
                };
                let outcome = export_logs(&bin.recent_logs, &path);
                self.console.report(outcome, "Failed to export logs");
            }
        }
    }

    fn render_header(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading("Request Bins");
            ui.label(RichText::new(self.api.base_url()).weak());
            if self.console.grid() == console::GridState::Ready {
                ui.label(RichText::new(bin_count(self.console.bins().len())).weak());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let create_button = egui::Button::new(self.console.create_label())
                    .min_size(egui::vec2(140.0, 30.0));
                let create = ui.add_enabled(!self.console.is_creating(), create_button);
                if create.clicked() {
                    actions.push(Action::Create);
                }
                if ui
                    .add(egui::Button::new("Refresh").min_size(egui::vec2(80.0, 30.0)))
                    .clicked()
                {
                    actions.push(Action::Refresh);
                }
            });
        });
    }

    fn render_bins(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        match self.console.grid() {
            console::GridState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(view::BINS_LOADING);
                });
            }
            console::GridState::Failed => {
                empty_state(ui, "⚠", view::BINS_FAILED);
            }
            console::GridState::Ready => match self.console.bins_view(chrono::Utc::now()) {
                BinsView::Empty => empty_state(ui, "📦", view::BINS_EMPTY),
                BinsView::Cards(cards) => {
                    egui::ScrollArea::vertical()
                        .id_salt("bins_scroll")
                        .auto_shrink([false; 2])
                        .show(ui, |ui| {
                            ui.horizontal_wrapped(|ui| {
                                ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
                                for card in cards {
                                    if render_card(ui, &card).clicked() {
                                        actions.push(Action::Open(card.id.clone()));
                                    }
                                }
                            });
                        });
                }
            },
        }
    }

    fn render_editor(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let Some(bin) = self.console.current_bin() else {
            return;
        };
        let bin_id = bin.id.clone();
        let bin_url = self.console.current_bin_url().unwrap_or_default();
        let rows = view::log_rows(&bin.recent_logs, chrono::Utc::now());
        let saving = self.console.is_saving();
        let save_label = self.console.save_label();
        let editor = &mut self.console.editor;

        let modal = egui::Modal::new(egui::Id::new("bin_editor")).show(ctx, |ui| {
            ui.set_width(820.0);

            ui.horizontal(|ui| {
                ui.strong("Bin Editor");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        actions.push(Action::Close);
                    }
                });
            });
            ui.separator();

            egui::Grid::new("bin_info").num_columns(3).show(ui, |ui| {
                ui.label("Bin ID");
                ui.monospace(&bin_id);
                if ui.small_button("Copy").clicked() {
                    actions.push(Action::CopyId);
                }
                ui.end_row();

                ui.label("Bin URL");
                ui.monospace(&bin_url);
                ui.horizontal(|ui| {
                    if ui.small_button("Copy").clicked() {
                        actions.push(Action::CopyUrl);
                    }
                    if ui.small_button("Open").clicked() {
                        actions.push(Action::OpenInBrowser);
                    }
                });
                ui.end_row();
            });
            ui.add_space(8.0);

            ui.allocate_ui(egui::vec2(820.0, 440.0), |ui| {
                StripBuilder::new(ui)
                    .size(Size::remainder())
                    .size(Size::remainder())
                    .horizontal(|mut strip| {
                        strip.cell(|ui| {
                            render_response_config(ui, editor, saving, save_label, actions);
                        });
                        strip.cell(|ui| {
                            render_logs(ui, &rows, actions);
                        });
                    });
            });
        });

        if modal.should_close() {
            actions.push(Action::Close);
        }
    }

    fn render_toast(&self, ctx: &egui::Context) {
        let Some(toast) = self.console.toasts().visible(Instant::now()) else {
            return;
        };
        let fill = match toast.severity {
            Severity::Success => ACTIVE,
            Severity::Error => ERROR,
        };
        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                    ui.label(RichText::new(&toast.message).color(Color32::WHITE));
                });
            });
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        if self.console.is_creating() || self.console.is_saving() {
            ctx.request_repaint();
            return;
        }

        let now = Instant::now();
        let mut next = self.refresh.remaining(now);
        if let Some(toast) = self.console.toasts().visible(now) {
            next = next.min(toast.remaining(now));
        }
        ctx.request_repaint_after(next);
    }
}

fn render_response_config(
    ui: &mut egui::Ui,
    editor: &mut console::EditorForm,
    saving: bool,
    save_label: &str,
    actions: &mut Vec<Action>,
) {
    egui::Frame::NONE
        .stroke(egui::Stroke::new(1.0, Color32::from_gray(60)))
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.expand_to_include_rect(ui.max_rect());
            ui.strong("Response Configuration");
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                ui.label("Status code:");
                ui.add(
                    egui::TextEdit::singleline(&mut editor.status_code)
                        .desired_width(60.0)
                        .hint_text("200"),
                );
            });
            ui.add_space(6.0);

            ui.label("Body (JSON):");
            egui::ScrollArea::vertical()
                .id_salt("body_scroll")
                .max_height(280.0)
                .show(ui, |ui| {
                    let body = ui.add(
                        egui::TextEdit::multiline(&mut editor.body)
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .desired_rows(14),
                    );
                    if body.changed() {
                        actions.push(Action::BodyEdited);
                    }
                });

            if let Some(message) = &editor.json_error {
                ui.colored_label(ERROR, message);
            }
            ui.add_space(6.0);

            let save = ui.add_enabled(
                !saving,
                egui::Button::new(save_label).min_size(egui::vec2(160.0, 30.0)),
            );
            if save.clicked() {
                actions.push(Action::Save);
            }
        });
}

fn render_logs(ui: &mut egui::Ui, rows: &[LogRow], actions: &mut Vec<Action>) {
    egui::Frame::NONE
        .stroke(egui::Stroke::new(1.0, Color32::from_gray(60)))
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.expand_to_include_rect(ui.max_rect());
            ui.horizontal(|ui| {
                ui.strong("Recent Requests");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!rows.is_empty(), egui::Button::new("Export"))
                        .clicked()
                    {
                        actions.push(Action::ExportLogs);
                    }
                });
            });
            ui.add_space(6.0);

            if rows.is_empty() {
                ui.label(RichText::new(view::LOGS_EMPTY).weak());
                return;
            }

            egui::ScrollArea::vertical()
                .id_salt("logs_scroll")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for (i, row) in rows.iter().enumerate() {
                        ui.group(|ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(&row.method).strong().color(ACCENT));
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| ui.label(RichText::new(&row.when).weak()),
                                );
                            });
                            if !row.headers.is_empty() {
                                egui::CollapsingHeader::new(format!(
                                    "Headers ({})",
                                    row.headers.len()
                                ))
                                .id_salt(("log_headers", i))
                                .show(ui, |ui| {
                                    for (name, value) in &row.headers {
                                        ui.monospace(format!("{}: {}", name, value));
                                    }
                                });
                            }
                            ui.monospace(&row.body);
                        });
                        ui.add_space(4.0);
                    }
                });
        });
}

fn render_card(ui: &mut egui::Ui, card: &BinCard) -> egui::Response {
    let right_to_left = egui::Layout::right_to_left(egui::Align::Center);
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(300.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new(&card.id).monospace().strong());
                ui.with_layout(right_to_left, |ui| {
                    ui.label(RichText::new(format!("● {}", card.status)).color(ACTIVE));
                });
            });
            ui.label(RichText::new(&card.url).monospace().weak());
            ui.horizontal(|ui| {
                ui.small(&card.created);
                ui.with_layout(right_to_left, |ui| ui.small("Click to edit →"));
            });
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
}

fn bin_count(count: usize) -> String {
    match count {
        1 => "1 bin".to_string(),
        n => format!("{} bins", n),
    }
}

fn empty_state(ui: &mut egui::Ui, icon: &str, message: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.label(RichText::new(icon).size(40.0));
        ui.add_space(8.0);
        ui.label(message);
    });
}

/// Write `logs` to `path` as pretty JSON.
fn export_logs(logs: &[LogEntry], path: &Path) -> Result<String> {
    let json = serde_json::to_string_pretty(logs)?;
    std::fs::write(path, json)?;
    Ok(format!("Exported {} request(s) to {}", logs.len(), path.display()))
}

impl eframe::App for BinConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished requests
        while let Ok(event) = self.rx.try_recv() {
            if let Some(next) = self.console.apply(event) {
                self.dispatch(ctx, next);
            }
        }

        if self.refresh.is_due(Instant::now()) {
            self.refresh(ctx);
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.console.handle_escape();
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            self.render_header(ui, &mut actions);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_bins(ui, &mut actions);
        });

        self.render_editor(ctx, &mut actions);
        self.render_toast(ctx);

        for action in actions {
            self.handle(ctx, action);
        }

        self.schedule_repaint(ctx);
    }
}

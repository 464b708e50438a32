//! Main window: header actions, record form, record list and footer.

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

use chrono::{Datelike, Local};
use eframe::egui::{self, Color32, RichText, Ui};
use log::{info, warn};
use vehicle_sheet::app::SheetApp;
use vehicle_sheet::capture::RasterCapture;
use vehicle_sheet::error::ExportError;
use vehicle_sheet::export::{ExportOutcome, ExportSettings, Exporter};
use vehicle_sheet::messages;
use vehicle_sheet::model::VehicleField;

const ACCENT: Color32 = Color32::from_rgb(250, 204, 21);

type ExportResult = Result<ExportOutcome, ExportError>;

/// Blocking dialog currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialog {
    Alert(&'static str),
    ConfirmClear,
}

/// Window state wrapped around the shared [`SheetApp`].
pub struct SheetWindow {
    app: SheetApp,
    settings: ExportSettings,
    /// Receiver for the result of the running export
    export_receiver: Option<Receiver<ExportResult>>,
    dialog: Option<Dialog>,
    /// (message, is_error)
    status_message: Option<(String, bool)>,
}

impl SheetWindow {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ExportSettings) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.animation_time = 0.1;
        cc.egui_ctx.set_style(style);

        Self {
            app: SheetApp::new(),
            settings,
            export_receiver: None,
            dialog: None,
            status_message: None,
        }
    }

    /// Poll for the result of the background export
    fn poll_export(&mut self) {
        let Some(receiver) = &self.export_receiver else {
            return;
        };

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(ExportError::WorkerLost),
        };
        self.export_receiver = None;

        let result = self.app.finish_export(result);
        self.status_message = Some(export_status(&result));
        if let Err(err) = &result {
            self.dialog = Some(Dialog::Alert(err.user_message()));
        }
    }

    fn start_export(&mut self, ctx: &egui::Context) {
        let job = match self.app.begin_export() {
            Ok(job) => job,
            Err(err) => {
                self.dialog = Some(Dialog::Alert(err.user_message()));
                return;
            }
        };

        let (tx, rx) = channel();
        self.export_receiver = Some(rx);
        self.status_message = None;

        let settings = self.settings.clone();
        let ctx = ctx.clone();
        info!("starting export of {} vehicle(s)", job.records().len());
        thread::spawn(move || {
            let result = RasterCapture::from_settings(&settings)
                .map_err(ExportError::from)
                .and_then(|capture| job.run(&Exporter::new(capture, settings)));
            if tx.send(result).is_err() {
                warn!("export finished after the window closed");
            }
            ctx.request_repaint();
        });
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(" R ")
                    .strong()
                    .size(24.0)
                    .color(ACCENT)
                    .background_color(Color32::BLACK),
            );
            ui.vertical(|ui| {
                ui.label(RichText::new("Autohaus Radtke GmbH").strong().size(22.0));
                ui.label(RichText::new("OPEL PROFI-TOOL").small().color(Color32::GRAY));
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.app.is_exporting() {
                    "Erstelle PDF...".to_owned()
                } else {
                    format!("PDF generieren ({})", self.app.records().len())
                };
                let button = egui::Button::new(RichText::new(label).strong());
                if ui.add_enabled(self.app.can_export(), button).clicked() {
                    self.start_export(ui.ctx());
                }
                if self.app.is_exporting() {
                    ui.spinner();
                }

                let clear = RichText::new("Liste leeren").color(Color32::LIGHT_RED);
                if ui.button(clear).clicked() {
                    self.dialog = Some(Dialog::ConfirmClear);
                }
            });
        });
    }

    fn render_form(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Neues Fahrzeug erfassen").strong().size(16.0));
        ui.separator();
        ui.add_space(5.0);

        egui::Grid::new("vehicle_form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                for field in VehicleField::ALL {
                    ui.label(RichText::new(field.form_label()).strong());
                    let mut value = self.app.draft().get(field).to_owned();
                    let edit = if field.is_multiline() {
                        egui::TextEdit::multiline(&mut value).desired_rows(4)
                    } else {
                        egui::TextEdit::singleline(&mut value)
                    };
                    let response = ui.add(
                        edit.hint_text(field.placeholder())
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        self.app.set_field(field, value);
                    }
                    ui.end_row();
                }
            });

        ui.add_space(8.0);

        let can_add = !self.app.draft().is_blank();
        let button = egui::Button::new(
            RichText::new("+ Fahrzeug zur Liste hinzufügen")
                .strong()
                .color(Color32::BLACK),
        )
        .fill(ACCENT);
        if ui.add_enabled(can_add, button).clicked() {
            if let Err(err) = self.app.add_to_list() {
                self.dialog = Some(Dialog::Alert(err.user_message()));
            }
        }
    }

    fn render_list(&mut self, ui: &mut Ui) {
        ui.label(
            RichText::new(format!("AKTUELLE LISTE ({})", self.app.records().len()))
                .strong()
                .color(Color32::GRAY),
        );
        ui.add_space(5.0);

        if self.app.records().is_empty() {
            ui.group(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(
                        RichText::new("Noch keine Fahrzeuge hinzugefügt.").color(Color32::GRAY),
                    );
                    ui.label(
                        RichText::new(
                            "Füllen Sie das Formular aus und klicken Sie auf \"Hinzufügen\".",
                        )
                        .small()
                        .color(Color32::GRAY),
                    );
                    ui.add_space(24.0);
                });
            });
            return;
        }

        // Collect the index to delete (to avoid borrow issues)
        let mut to_delete: Option<usize> = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (index, record) in self.app.records().iter().enumerate() {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(format!("#{}", index + 1))
                                        .small()
                                        .color(Color32::GRAY),
                                );
                                let model = if record.model().is_empty() {
                                    messages::UNKNOWN_MODEL
                                } else {
                                    record.model()
                                };
                                ui.label(RichText::new(model).strong().size(16.0));
                            });
                            let vin = if record.vin().is_empty() {
                                messages::MISSING_VIN
                            } else {
                                record.vin()
                            };
                            ui.label(RichText::new(vin).monospace().small().color(Color32::GRAY));
                        });

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").on_hover_text("Löschen").clicked() {
                                to_delete = Some(index);
                            }
                        });
                    });
                });
            }
        });

        if let Some(index) = to_delete {
            self.app.remove(index);
        }
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.dialog else {
            return;
        };

        let mut close = false;
        let response = egui::Modal::new(egui::Id::new("sheet_dialog")).show(ctx, |ui| {
            ui.set_max_width(360.0);
            match dialog {
                Dialog::Alert(message) => {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                }
                Dialog::ConfirmClear => {
                    ui.label(messages::CONFIRM_CLEAR);
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            self.app.clear();
                            self.status_message = None;
                            close = true;
                        }
                        if ui.button("Abbrechen").clicked() {
                            close = true;
                        }
                    });
                }
            }
        });

        if close || response.should_close() {
            self.dialog = None;
        }
    }
}

/// Status line text for a finished export; details stay in the log.
fn export_status(result: &ExportResult) -> (String, bool) {
    match result {
        Ok(outcome) => (
            format!(
                "PDF gespeichert: {} ({} Seite(n))",
                outcome.path().display(),
                outcome.page_count()
            ),
            false,
        ),
        Err(err) => (err.user_message().to_owned(), true),
    }
}

impl eframe::App for SheetWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_export();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            self.render_header(ui);
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format!(
                        "Autohaus Radtke GmbH • Jan Radtke © {}",
                        Local::now().year()
                    ))
                    .small()
                    .color(Color32::GRAY),
                );
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some((message, is_error)) = &self.status_message {
                let color = if *is_error {
                    Color32::LIGHT_RED
                } else {
                    Color32::LIGHT_GREEN
                };
                ui.label(RichText::new(message).color(color));
                ui.add_space(6.0);
            }

            ui.columns(2, |columns| {
                self.render_form(&mut columns[0]);
                self.render_list(&mut columns[1]);
            });
        });

        self.render_dialog(ctx);
    }
}

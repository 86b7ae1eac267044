// GUI implementation for HK Next Bus using egui/eframe
use crate::hknb_controllers::StopListBinder;
use crate::hknb_models::{EtaDisplay, SampleFeed};
use chrono_tz::Asia::Hong_Kong;
use eframe::egui;
use egui::{Color32, RichText, Ui};
use std::time::{Duration, SystemTime};

// ============================================================================
// Application State
// ============================================================================

pub struct HknbApp {
    // The list binder and its data source
    binder: StopListBinder,
    feed: Option<SampleFeed>,

    // Loading states
    is_loading: bool,
    loading_message: String,
    error_message: Option<String>,

    // Auto-refresh settings
    auto_refresh_enabled: bool,
    last_refresh: Option<SystemTime>,
    refresh_counter: usize,

    // Background task for initialization
    init_promise: Option<poll_promise::Promise<Result<SampleFeed, String>>>,
}

// ============================================================================
// GUI Implementation
// ============================================================================

impl HknbApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, is_english: bool) -> Self {
        let mut app = Self {
            binder: StopListBinder::new(is_english),
            feed: None,
            is_loading: true,
            loading_message: "Initializing...".to_string(),
            error_message: None,
            auto_refresh_enabled: false,
            last_refresh: None,
            refresh_counter: 0,
            init_promise: None,
        };

        // Start loading data in background
        app.start_initialization();

        app
    }

    fn start_initialization(&mut self) {
        let promise = poll_promise::Promise::spawn_thread("init", || {
            match SampleFeed::load() {
                Ok(feed) => Ok(feed),
                Err(e) => Err(format!("{}", e)),
            }
        });
        self.init_promise = Some(promise);
        self.is_loading = true;
        self.loading_message = "Loading route data...".to_string();
    }

    fn check_initialization(&mut self) {
        if let Some(promise) = &self.init_promise {
            if let Some(result) = promise.ready() {
                match result {
                    Ok(feed) => {
                        let mut feed = feed.clone();
                        let stops = feed.stops().to_vec();
                        let frame = feed.next_frame();
                        self.binder.update_data(stops, &frame);
                        self.feed = Some(feed);
                        self.is_loading = false;
                        self.error_message = None;
                    }
                    Err(e) => {
                        self.is_loading = false;
                        self.error_message = Some(format!("Failed to load route data: {}", e));
                    }
                }
                self.init_promise = None;
            }
        }
    }

    /// Feed the binder the next ETA snapshot.
    fn refresh_data(&mut self) {
        if let Some(feed) = self.feed.as_mut() {
            let stops = feed.stops().to_vec();
            let frame = feed.next_frame();
            self.binder.update_data(stops, &frame);
            self.last_refresh = Some(SystemTime::now());
            self.refresh_counter += 1;
        }
    }
}

impl eframe::App for HknbApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check if initialization is complete
        self.check_initialization();

        // Auto-refresh if enabled
        if self.auto_refresh_enabled && !self.is_loading {
            ctx.request_repaint_after(Duration::from_secs(1));
            if let Some(last) = self.last_refresh {
                if last.elapsed().unwrap_or(Duration::from_secs(0)) >= Duration::from_secs(30) {
                    self.refresh_data();
                }
            } else {
                self.refresh_data();
            }
        }

        // Top panel with header and Hong Kong clock
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🚏 HK Next Bus - 香港巴士到站");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let now = chrono::Utc::now().with_timezone(&Hong_Kong);
                    ui.label(now.format("%H:%M:%S").to_string());
                });
            });
        });

        // Show loading screen or main UI
        if self.is_loading {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.label(&self.loading_message);
                    });
                });
            });
            ctx.request_repaint_after(Duration::from_millis(100));
            return;
        }

        // Show error if any
        if let Some(error) = self.error_message.clone() {
            let mut should_retry = false;
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.colored_label(Color32::RED, "❌ Error");
                        ui.label(&error);
                        if ui.button("Retry").clicked() {
                            should_retry = true;
                        }
                    });
                });
            });
            if should_retry {
                self.start_initialization();
            }
            return;
        }

        // Left panel with controls
        egui::SidePanel::left("controls_panel").min_width(180.0).show(ctx, |ui| {
            ui.heading("Controls");
            ui.separator();

            ui.label("Language:");
            let mut english = self.binder.is_english();
            ui.radio_value(&mut english, true, "English");
            ui.radio_value(&mut english, false, "繁體中文");
            if english != self.binder.is_english() {
                self.binder.set_language(english);
            }

            ui.separator();

            ui.checkbox(&mut self.auto_refresh_enabled, "Auto-refresh (30s)");
            if ui.button("🔄 Refresh Now").clicked() {
                self.refresh_data();
            }
            if let Some(last) = self.last_refresh {
                let elapsed = last.elapsed().unwrap_or(Duration::from_secs(0));
                ui.label(format!("Last update: {}s ago", elapsed.as_secs()));
            }

            ui.add_space(20.0);
            ui.separator();
            ui.label("Statistics:");
            if let Some(feed) = &self.feed {
                ui.label(format!("Route: {}", feed.route()));
                ui.label(format!("Stops: {}", self.binder.row_count()));
                ui.label(format!("ETA entries: {}", self.binder.eta_entry_count()));
                ui.label(format!(
                    "Snapshot: {} / {}",
                    feed.current_frame(),
                    feed.frame_count()
                ));
            }
            ui.label(format!("Updates: {}", self.refresh_counter));
            ui.label(format!("Render generation: {}", self.binder.generation()));
        });

        // Central panel with the stop list
        let route = self
            .feed
            .as_ref()
            .map(|f| f.route().to_string())
            .unwrap_or_default();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.strong(format!("Route {} — tap a stop to show its ETA", route));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.binder.row_count() == 0 {
                    ui.label("No stops loaded.");
                } else {
                    for position in 0..self.binder.row_count() {
                        self.show_stop_row(ui, position);
                    }
                }
            });
        });
    }
}

// ============================================================================
// Row Rendering
// ============================================================================

impl HknbApp {
    fn show_stop_row(&mut self, ui: &mut Ui, position: usize) {
        let row = self.binder.render_row(position);
        let service_type = self
            .feed
            .as_ref()
            .map(|f| f.stops()[position].service_type.clone())
            .unwrap_or_default();

        // Connector line above every stop except the first
        if row.top_line_visible {
            ui.label(RichText::new("      │").weak());
        }

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                // Stop dot in KMB red
                ui.colored_label(
                    Color32::from_rgb(210, 40, 40),
                    RichText::new("●").size(16.0),
                );

                if ui
                    .selectable_label(row.expanded, RichText::new(&row.label).size(16.0))
                    .clicked()
                {
                    self.binder.on_row_tapped(position);
                }
            });

            if let (Some(eta), Some(text)) = (row.eta, row.eta_text.as_ref()) {
                ui.horizontal(|ui| {
                    ui.add_space(24.0);
                    ui.colored_label(eta_color(eta), format!("⏱ {}", text));
                });
            }

            ui.label(
                RichText::new(format!("ID: {} | Service type {}", row.row_id, service_type))
                    .weak()
                    .small(),
            );
        });

        // Connector line below every stop except the last
        if row.bottom_line_visible {
            ui.label(RichText::new("      │").weak());
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn eta_color(eta: EtaDisplay) -> Color32 {
    match eta {
        EtaDisplay::Arriving => Color32::from_rgb(255, 0, 0), // Red for at-stop
        EtaDisplay::Minutes(m) if m <= 5 => Color32::from_rgb(255, 165, 0), // Orange for soon
        EtaDisplay::Minutes(_) => Color32::from_rgb(0, 200, 0), // Green for later
        EtaDisplay::NoBuses | EtaDisplay::NoData => Color32::GRAY,
    }
}

// ============================================================================
// Public entry point
// ============================================================================

pub fn run_gui(is_english: bool) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 780.0])
            .with_min_inner_size([360.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "HK Next Bus",
        options,
        Box::new(move |cc| Ok(Box::new(HknbApp::new(cc, is_english)))),
    )
}

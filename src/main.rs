#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::Context;
use clap::{Parser, Subcommand};
use eframe::{egui, App, NativeOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use incident_segmenter::client::SaveReceipt;
use incident_segmenter::config::{self, Config, DEFAULT_CONFIG_FILE};
use incident_segmenter::manifest::Manifest;
use incident_segmenter::types::page::{DocumentId, ImageDescriptor};
use incident_segmenter::zoom::{ImageBox, PointerEvent};
use incident_segmenter::Segmentable;

const THUMBNAIL_WIDTH: f32 = 120.0;
const THUMBNAIL_HEIGHT: f32 = 160.0;

#[derive(Parser, Debug)]
#[command(name = "incident-segmenter", version, about = "Group document pages into incident segments")]
struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Document manifest (JSON) with page images and saved segments
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Review server base URL, overrides the config file
    #[arg(long)]
    server_url: Option<String>,
    /// Cookie header holding the csrftoken, overrides the config file
    #[arg(long)]
    cookie: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the review window (default)
    Gui,
    /// Print the segment list of a document as JSON
    Segments {
        #[arg(long)]
        document: u64,
    },
    /// Save the segment list of a document to the server
    Save {
        #[arg(long)]
        document: u64,
    },
}

struct ReviewApp {
    segmentable: Segmentable,
    manifest: Manifest,
    config: Config,
    selected_document: Option<DocumentId>,
    hovered_page: Option<(DocumentId, usize)>,
    runtime: tokio::runtime::Runtime,
    save_tx: Sender<incident_segmenter::Result<SaveReceipt>>,
    save_rx: Receiver<incident_segmenter::Result<SaveReceipt>>,
    saving: bool,
    status_message: Option<String>,
    error_message: Option<String>,
}

impl ReviewApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        segmentable: Segmentable,
        manifest: Manifest,
        config: Config,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        let (save_tx, save_rx) = channel();
        let selected_document = segmentable.markup().documents().first().copied();
        Self {
            segmentable,
            manifest,
            config,
            selected_document,
            hovered_page: None,
            runtime,
            save_tx,
            save_rx,
            saving: false,
            status_message: None,
            error_message: None,
        }
    }

    fn document_name(&self, document: DocumentId) -> String {
        self.manifest
            .document(document)
            .map(|doc| doc.display_name())
            .unwrap_or_else(|| format!("Document #{}", document))
    }

    fn start_save(&mut self, ctx: &egui::Context, document: DocumentId) {
        let request = self.segmentable.save_request(document);
        let tx = self.save_tx.clone();
        let ctx = ctx.clone();
        self.saving = true;
        self.status_message = Some(format!("Saving {} segments...", request.segments.len()));
        self.error_message = None;
        self.runtime.spawn(async move {
            let result = request.send().await;
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    fn poll_saves(&mut self) {
        while let Ok(result) = self.save_rx.try_recv() {
            self.saving = false;
            match result {
                Ok(receipt) => {
                    self.status_message = Some(format!(
                        "Saved {} segments for document {} ({})",
                        receipt.segments.len(),
                        receipt.document,
                        receipt.status
                    ));
                }
                Err(e) => {
                    tracing::error!(error = %e, "save failed");
                    self.status_message = None;
                    self.error_message = Some(format!("Save failed: {}", e));
                }
            }
        }
    }

    fn revert_to_saved(&mut self, document: DocumentId) {
        let saved = self
            .manifest
            .document(document)
            .and_then(|doc| doc.incident_pgs.clone());
        if let Err(e) = self.segmentable.apply_segments(document, saved.as_ref()) {
            self.error_message = Some(e.to_string());
        }
    }

    fn resolve_image_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.config.server_url(), url)
        } else {
            url.to_string()
        }
    }

    fn pages_panel(&mut self, ui: &mut egui::Ui, document: DocumentId) {
        let pages: Vec<(ImageDescriptor, bool)> = self
            .segmentable
            .locate_pages(document)
            .iter()
            .map(|page| (page.image.clone(), page.is_segment_end()))
            .collect();
        if pages.is_empty() {
            ui.label("This document has no pages.");
            return;
        }

        let segments = self.segmentable.segment_list(document);
        let mut toggled: Option<usize> = None;
        let mut hovered: Option<(usize, PointerEvent)> = None;

        egui::ScrollArea::vertical()
            .id_source("pages_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (incident, segment) in segments.iter().enumerate() {
                    ui.label(format!(
                        "Incident {}: pages {}-{}",
                        incident + 1,
                        segment.start + 1,
                        segment.end + 1
                    ));
                    ui.horizontal_wrapped(|ui| {
                        for position in segment.start..=segment.end {
                            let (image, is_end) = &pages[position];
                            ui.vertical(|ui| {
                                let response = ui.add(
                                    egui::Image::new(self.resolve_image_url(&image.url))
                                        .fit_to_exact_size(egui::vec2(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT))
                                        .sense(egui::Sense::click()),
                                );
                                if response.clicked() {
                                    toggled = Some(position);
                                }
                                if let Some(pointer) = response.hover_pos() {
                                    let rect = response.rect;
                                    hovered = Some((
                                        position,
                                        PointerEvent {
                                            offset_x: (pointer.x - rect.min.x) as f64,
                                            offset_y: (pointer.y - rect.min.y) as f64,
                                            page_x: pointer.x as f64,
                                            page_y: pointer.y as f64,
                                            target: ImageBox {
                                                offset_left: rect.min.x as f64,
                                                offset_top: rect.min.y as f64,
                                                offset_width: rect.width() as f64,
                                                offset_height: rect.height() as f64,
                                            },
                                        },
                                    ));
                                }
                                let caption = format!("p. {}", position + 1);
                                if *is_end {
                                    ui.colored_label(egui::Color32::LIGHT_RED, format!("{} | end", caption));
                                } else {
                                    ui.label(caption);
                                }
                            });
                        }
                    });
                    ui.separator();
                }
            });

        if let Some(position) = toggled {
            if let Err(e) = self.segmentable.toggle_end(document, position) {
                self.error_message = Some(e.to_string());
            }
        }

        match hovered {
            Some((position, event)) => {
                let mut image = pages[position].0.clone();
                image.url = self.resolve_image_url(&image.url);
                self.segmentable.zoom_page(&image, &event);
                self.hovered_page = Some((document, position));
            }
            None => {
                if let Some((_, position)) = self.hovered_page.take() {
                    if let Some((image, _)) = pages.get(position) {
                        let mut image = image.clone();
                        image.url = self.resolve_image_url(&image.url);
                        self.segmentable.zoom_out(&image);
                    }
                }
            }
        }
    }

    fn zoom_panel(&self, ui: &mut egui::Ui) {
        let overlay = self.segmentable.overlay();
        ui.heading("Zoom");
        ui.separator();
        let Some(url) = &overlay.background_image else {
            ui.label("Hover a page to inspect it.");
            return;
        };
        let uv = overlay.uv_window();
        let size = egui::vec2(ui.available_width(), ui.available_width() * 1.3);
        ui.add(
            egui::Image::new(url.as_str())
                .uv(egui::Rect::from_min_max(
                    egui::pos2(uv.min_x as f32, uv.min_y as f32),
                    egui::pos2(uv.max_x as f32, uv.max_y as f32),
                ))
                .fit_to_exact_size(size),
        );
        ui.label(
            egui::RichText::new(format!(
                "#{} size: {} position: {}",
                overlay.id, overlay.background_size, overlay.background_position
            ))
            .monospace()
            .small(),
        );
    }
}

impl App for ReviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_saves();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::left("side_panel_left").min_width(220.0).default_width(280.0).show(ctx, |ui| {
            ui.heading("Documents");
            ui.separator();
            ui.collapsing("Configuration", |ui| {
                ui.label(format!("Server: {}", self.config.server_url()));
                match self.segmentable.csrf_token() {
                    Some(_) => ui.colored_label(egui::Color32::GREEN, "csrftoken cookie set"),
                    None => ui.colored_label(egui::Color32::YELLOW, "no csrftoken cookie"),
                };
            });
            ui.separator();

            let documents = self.segmentable.markup().documents().to_vec();
            if documents.is_empty() {
                ui.label("No documents loaded. Pass --manifest <file.json>.");
            }
            egui::ScrollArea::vertical().id_source("documents_scroll").max_height(300.0).show(ui, |ui| {
                for document in documents {
                    let is_selected = self.selected_document == Some(document);
                    if ui.selectable_label(is_selected, self.document_name(document)).clicked() {
                        self.selected_document = Some(document);
                        self.hovered_page = None;
                    }
                }
            });
            ui.separator();

            if let Some(document) = self.selected_document {
                ui.add_enabled_ui(!self.saving, |ui| {
                    if ui.button("Save Segments").clicked() {
                        self.start_save(ctx, document);
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Revert to Saved").clicked() {
                        self.revert_to_saved(document);
                    }
                    if ui.button("Clear Markers").clicked() {
                        if let Err(e) = self.segmentable.apply_segments(document, None) {
                            self.error_message = Some(e.to_string());
                        }
                    }
                });
                ui.separator();
                ui.label("incident_pgs:");
                let json = self
                    .segmentable
                    .segment_list(document)
                    .to_json()
                    .unwrap_or_else(|e| e.to_string());
                ui.label(egui::RichText::new(json).monospace());
            }

            if let Some(status) = &self.status_message {
                ui.label(status);
            }
            if let Some(err) = &self.error_message {
                ui.colored_label(egui::Color32::RED, err);
            }
        });

        egui::SidePanel::right("zoomed-page").min_width(300.0).default_width(420.0).show(ctx, |ui| {
            self.zoom_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.selected_document {
            Some(document) => {
                ui.heading(self.document_name(document));
                ui.label("Click a page to toggle the end of its incident.");
                ui.separator();
                self.pages_panel(ui, document);
            }
            None => {
                ui.label("Select a document from the list.");
            }
        });
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("incident_segmenter=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = config::load_config_from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(server_url) = cli.server_url {
        config.server_url = server_url;
    }
    if let Some(cookie) = cli.cookie {
        config.cookie = Some(cookie);
    }

    let manifest_path = cli.manifest.or_else(|| config.manifest.clone().map(PathBuf::from));
    let manifest = match &manifest_path {
        Some(path) => Manifest::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Manifest::default(),
    };

    let segmentable = Segmentable::from_manifest(&config, &manifest)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    match cli.command.unwrap_or(Command::Gui) {
        Command::Segments { document } => {
            let document = DocumentId(document);
            if !segmentable.markup().contains_document(document) {
                tracing::warn!(%document, "document not in manifest");
            }
            println!("{}", segmentable.segment_list(document).to_json()?);
            Ok(())
        }
        Command::Save { document } => {
            let receipt = runtime
                .block_on(segmentable.save_segments(DocumentId(document)))
                .with_context(|| format!("saving segments for document {}", document))?;
            println!(
                "saved {} for document {} ({})",
                receipt.segments.to_json()?,
                receipt.document,
                receipt.status
            );
            Ok(())
        }
        Command::Gui => {
            let options = NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([1400.0, 900.0])
                    .with_min_inner_size([900.0, 600.0]),
                ..Default::default()
            };
            eframe::run_native(
                "Incident Segmenter",
                options,
                Box::new(move |cc| Box::new(ReviewApp::new(cc, segmentable, manifest, config, runtime))),
            )
            .map_err(|e| anyhow::anyhow!("failed to run review window: {e}"))
        }
    }
}

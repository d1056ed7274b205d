//! Property plotter demo window

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context as _, Result};
use eframe::egui::{self, Context, Ui};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pp_core::{BinSpec, PlotterSettings};
use pp_data::LayerList;
use pp_render::EguiPlotSurface;
use pp_views::{PlotMode, PropertyPlotter};

mod demo;

const SETTINGS_ENV: &str = "PROPS_PLOTTER_SETTINGS";

struct PlotterApp {
    layers: Arc<LayerList>,
    plotter: PropertyPlotter<EguiPlotSurface>,
    /// Column picked for the next "Add series"
    pending_series: Option<String>,
    /// Bin count shown in the histogram controls
    bins: usize,
    /// Last rejected operation, shown under the controls
    status: Option<String>,
    extra_layers: usize,
}

impl PlotterApp {
    fn new(_cc: &eframe::CreationContext<'_>, layers: Arc<LayerList>, settings: &PlotterSettings) -> Self {
        let plotter = PropertyPlotter::new(layers.clone(), EguiPlotSurface::new("property_plot"), settings);
        let bins = match settings.histogram_bins {
            BinSpec::Fixed(n) => n,
            BinSpec::Auto => 10,
        };

        Self {
            layers,
            plotter,
            pending_series: None,
            bins,
            status: None,
            extra_layers: 0,
        }
    }

    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status = None;
                Some(value)
            }
            Err(err) => {
                self.status = Some(err.to_string());
                None
            }
        }
    }

    fn layer_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layer");
        let current = self.plotter.current_layer_name();
        let mut picked = current.clone();
        egui::ComboBox::from_id_source("layer")
            .selected_text(current.as_deref().unwrap_or("None"))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for name in self.plotter.selectable_layers() {
                    ui.selectable_value(&mut picked, Some(name.clone()), &name);
                }
            });
        if picked != current {
            if let Some(name) = picked {
                let result = self.plotter.select_layer(&name);
                self.report(result);
            }
        }

        ui.horizontal(|ui| {
            if ui.button("Regenerate").clicked() {
                if let Some(layer) = current.as_deref().and_then(|name| self.layers.get(name)) {
                    match demo::points_table(100) {
                        Ok(table) => layer.set_table(Some(table)),
                        Err(err) => error!("{:#}", err),
                    }
                }
            }
            if ui.button("Add layer").clicked() {
                self.extra_layers += 1;
                let name = format!("points {}", self.extra_layers);
                match demo::points_table(50) {
                    Ok(table) => {
                        let result = self.layers.insert(pp_data::Layer::new(name, Some(table)));
                        self.report(result);
                    }
                    Err(err) => error!("{:#}", err),
                }
            }
            if ui.button("Remove layer").clicked() {
                if let Some(name) = &current {
                    self.layers.remove(name);
                }
            }
        });
    }

    fn axis_controls(&mut self, ui: &mut Ui) {
        let columns = self.plotter.columns();
        if columns.is_empty() {
            ui.label("Select a layer with properties");
            return;
        }

        ui.heading("X axis");
        let current_x = self.plotter.current_x();
        let mut picked = current_x.clone();
        egui::ComboBox::from_id_source("x_axis")
            .selected_text(current_x.as_deref().unwrap_or("-"))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for column in &columns {
                    ui.selectable_value(&mut picked, Some(column.clone()), column);
                }
            });
        if picked != current_x {
            if let Some(column) = picked {
                let result = self.plotter.set_x(&column);
                self.report(result);
            }
        }

        if self.plotter.plot_mode() == PlotMode::AggregateContinuous {
            ui.horizontal(|ui| {
                ui.label("Bins");
                let changed = ui.add(egui::DragValue::new(&mut self.bins).clamp_range(1..=200)).changed();
                if changed {
                    self.plotter.set_bins(BinSpec::Fixed(self.bins));
                }
                if ui.button("Auto").clicked() {
                    self.plotter.set_bins(BinSpec::Auto);
                }
            });
        }
    }

    fn series_controls(&mut self, ui: &mut Ui) {
        let columns = self.plotter.columns();
        if columns.is_empty() {
            return;
        }

        ui.heading("Series");
        let mut removed = None;
        for (position, slot) in self.plotter.series().into_iter().enumerate() {
            ui.push_id(slot.id.0, |ui| {
                ui.horizontal(|ui| {
                    let [r, g, b] = slot.color.0;
                    ui.colored_label(egui::Color32::from_rgb(r, g, b), "■");

                    let mut column = slot.column.clone();
                    egui::ComboBox::from_id_source("column")
                        .selected_text(&column)
                        .show_ui(ui, |ui| {
                            for name in &columns {
                                ui.selectable_value(&mut column, name.clone(), name);
                            }
                        });
                    if column != slot.column {
                        let result = self.plotter.set_series_column(position, &column);
                        self.report(result);
                    }

                    let mut style = slot.style;
                    let styles = self.plotter.valid_styles(&slot.column).unwrap_or(&[]);
                    egui::ComboBox::from_id_source("style")
                        .selected_text(style.label())
                        .show_ui(ui, |ui| {
                            for candidate in styles {
                                ui.selectable_value(&mut style, *candidate, candidate.label());
                            }
                        });
                    if style != slot.style {
                        let result = self.plotter.set_series_style(position, style);
                        self.report(result);
                    }

                    if ui.small_button("x").clicked() {
                        removed = Some(position);
                    }
                });
            });
        }
        if let Some(position) = removed {
            let result = self.plotter.remove_series(position);
            self.report(result);
        }

        ui.horizontal(|ui| {
            egui::ComboBox::from_id_source("new_series")
                .selected_text(self.pending_series.as_deref().unwrap_or("Column..."))
                .show_ui(ui, |ui| {
                    for name in &columns {
                        ui.selectable_value(&mut self.pending_series, Some(name.clone()), name);
                    }
                });
            if ui.button("Add series").clicked() {
                if let Some(column) = self.pending_series.clone() {
                    let result = self.plotter.add_series(&column);
                    self.report(result);
                }
            }
        });
    }

    fn selection_controls(&mut self, ui: &mut Ui) {
        let mut selecting = self.plotter.range_selection_enabled();
        let toggle = ui.add_enabled(
            self.plotter.plot_mode() == PlotMode::Series,
            egui::SelectableLabel::new(selecting, "Select Area"),
        );
        if toggle.clicked() {
            selecting = self.plotter.set_range_selection_enabled(!selecting);
            if !selecting {
                self.plotter.with_surface_mut(|surface| surface.clear_region());
            }
        }

        if let Some(layer) = self.plotter.current_layer_name().and_then(|name| self.layers.get(&name)) {
            ui.label(format!("{} rows selected", layer.selected_rows().len()));
        }
        if selecting && ui.button("Clear selection").clicked() {
            self.plotter.with_surface_mut(|surface| surface.clear_region());
            self.plotter.on_drag_cleared();
        }
    }
}

impl eframe::App for PlotterApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("plotter_controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.layer_controls(ui);
                    ui.separator();
                    self.axis_controls(ui);
                    ui.separator();
                    self.series_controls(ui);
                    ui.separator();
                    self.selection_controls(ui);

                    if let Some(status) = &self.status {
                        ui.separator();
                        ui.colored_label(egui::Color32::LIGHT_RED, status);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let selecting = self.plotter.range_selection_enabled();
            if !selecting {
                self.plotter.with_surface_mut(|surface| surface.clear_region());
            }

            let swept = self.plotter.with_surface_mut(|surface| surface.show(ui, selecting));
            if let Some((low, high)) = swept {
                self.plotter.on_drag_region(low, high);
            }
        });
    }
}

fn load_settings() -> Result<PlotterSettings> {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Loading settings from {}", path.display());
            PlotterSettings::from_path(&path).with_context(|| format!("Invalid settings file {}", path.display()))
        }
        None => Ok(PlotterSettings::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting property plotter");
    let settings = load_settings()?;

    let layers = LayerList::new();
    for layer in demo::startup_layers()? {
        layers.insert(layer)?;
    }
    for path in std::env::args_os().skip(1) {
        layers.insert(demo::csv_layer(&PathBuf::from(path))?)?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Property Plotter",
        options,
        Box::new(move |cc| Box::new(PlotterApp::new(cc, layers, &settings))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}

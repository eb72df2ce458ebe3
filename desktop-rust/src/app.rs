use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};

use crate::model::{DisplayState, NoticeLevel};
use qr_station::config::Config;
use qr_station::station::Station;
use qr_station_common::{
    Frame, InputEvent, InputEventSource, RenderSink, ScanMode, UiButtons, Viewport,
};

const MODE_COLOR_OPERATOR: Color32 = Color32::from_rgb(246, 196, 69);
const MODE_COLOR_ITEMS: Color32 = Color32::from_rgb(96, 186, 120);

/// 描画済みフレームを次の画面更新まで保持する
#[derive(Default)]
struct FrameSlot {
    latest: Option<Frame>,
}

impl RenderSink for FrameSlot {
    fn present(&mut self, frame: Frame) {
        self.latest = Some(frame);
    }
}

pub struct StationApp {
    station: Station,
    buttons: UiButtons,
    display: DisplayState,
    station_label: String,
    tick_interval: Duration,
    last_tick: Option<Instant>,
    slot: FrameSlot,
    video: Option<egui::TextureHandle>,
    viewport: Viewport,
}

impl StationApp {
    pub fn new(config: &Config, station: Station) -> anyhow::Result<Self> {
        let mut buttons = UiButtons::new();
        buttons.attach(station.sender())?;

        Ok(Self {
            display: DisplayState::new(station.session().mode()),
            station,
            buttons,
            station_label: config.station_label.clone(),
            tick_interval: config.tick_interval(),
            last_tick: None,
            slot: FrameSlot::default(),
            video: None,
            viewport: config.viewport,
        })
    }

    fn tick(&mut self) {
        let due = self
            .last_tick
            .is_none_or(|t| t.elapsed() >= self.tick_interval);
        if !due {
            return;
        }
        self.last_tick = Some(Instant::now());

        self.station.scan_loop_mut().set_viewport(self.viewport);
        self.station.step(&mut self.slot);
        for event in self.station.take_events() {
            self.display.apply(&event);
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.slot.latest.take() else {
            return;
        };
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgb(size, frame.as_raw());
        match &mut self.video {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.video = Some(ctx.load_texture("video", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(format!("Operator: {}", self.display.operator_label()));
            ui.separator();
            if !self.station_label.is_empty() {
                ui.label(RichText::new(&self.station_label).strong());
                ui.separator();
            }
            let (text, color) = match self.display.mode {
                ScanMode::IdentifyOperator => ("IDENTIFY OPERATOR", MODE_COLOR_OPERATOR),
                ScanMode::CollectItems => ("COLLECT ITEMS", MODE_COLOR_ITEMS),
            };
            ui.label(RichText::new(text).strong().color(Color32::BLACK).background_color(color));
        });
    }

    fn render_items(&self, ui: &mut egui::Ui) {
        ui.heading("Items");
        ui.label(format!("{} items", self.display.items.len()));
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for item in &self.display.items {
                    ui.horizontal(|ui| {
                        if ui.small_button("✕").on_hover_text("Delete").clicked() {
                            self.buttons.remove(item);
                        }
                        ui.label(item);
                    });
                }
            });
    }

    fn render_controls(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Mode").clicked() {
                self.buttons.press(InputEvent::ToggleMode);
            }
            let can_clear = self.station.session().can_clear();
            if ui.add_enabled(can_clear, egui::Button::new("Clear All")).clicked() {
                self.buttons.press(InputEvent::ClearAll);
            }
            if ui.button("Send Data").clicked() {
                self.buttons.press(InputEvent::Submit);
            }

            if let Some(notice) = &self.display.notice {
                ui.separator();
                let color = match notice.level {
                    NoticeLevel::Info => Color32::from_gray(170),
                    NoticeLevel::Warn => Color32::from_rgb(246, 196, 69),
                };
                ui.label(RichText::new(&notice.text).color(color));
            }
        });
    }
}

/// 論理サイズ（point）を物理ピクセルのビューポートに換算
fn physical_viewport(size: egui::Vec2, pixels_per_point: f32) -> Viewport {
    let scaled = size * pixels_per_point;
    Viewport::new(scaled.x.max(0.0).round() as u32, scaled.y.max(0.0).round() as u32)
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    // タイ語・日本語の順にフォールバックを追加
    let candidates = [
        r"C:\Windows\Fonts\tahoma.ttf",
        r"C:\Windows\Fonts\meiryo.ttc",
        "/System/Library/Fonts/Supplemental/Thonburi.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansThai-Regular.ttf",
        "/usr/share/fonts/truetype/tlwg/Garuda.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    let mut loaded = 0;
    for path in candidates {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        let name = format!("fallback_{loaded}");
        fonts.font_data.insert(name.clone(), FontData::from_owned(data));
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push(name.clone());
        }
        loaded += 1;
    }

    if loaded > 0 {
        ctx.set_fonts(fonts);
    } else {
        tracing::warn!("no fallback font found; Thai/Japanese payloads may not render");
    }
}

impl eframe::App for StationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick();
        self.upload_frame(ctx);
        ctx.request_repaint_after(self.tick_interval);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.render_header(ui);
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_controls(ui);
            ui.add_space(4.0);
        });

        egui::SidePanel::right("items")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                self.render_items(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let size = ui.available_size();
            // 次のtickから表示領域の物理ピクセル数で取得・描画する
            self.viewport = physical_viewport(size, ctx.pixels_per_point());
            match &self.video {
                Some(texture) => {
                    ui.add(egui::Image::from_texture((texture.id(), size)));
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("Waiting for camera...").color(Color32::from_gray(170)));
                    });
                }
            }
        });
    }
}

use egui::Context;

use crate::model::CameraView;

/// What the HUD shows for one frame.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub fps: f32,
    pub view: CameraView,
    pub cursor_captured: bool,
}

/// Frame rate averaged over roughly one second.
#[derive(Debug, Default, Clone, Copy)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
        self.fps
    }
}

/// Build the HUD inside an egui pass
pub fn build_ui(ctx: &Context, info: &HudInfo) {
    draw_crosshair(ctx);
    draw_debug_window(ctx, info);
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment(
        [
            egui::Pos2::new(center.x - size, center.y),
            egui::Pos2::new(center.x + size, center.y),
        ],
        stroke,
    );
    painter.line_segment(
        [
            egui::Pos2::new(center.x, center.y - size),
            egui::Pos2::new(center.x, center.y + size),
        ],
        stroke,
    );
}

fn draw_debug_window(ctx: &Context, info: &HudInfo) {
    let p = info.view.position;

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .default_size([160.0, 100.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", info.fps)).small());
            ui.label(egui::RichText::new(format!("Pos: {:.2}, {:.2}, {:.2}", p.x, p.y, p.z)).small());
            ui.label(
                egui::RichText::new(format!("Yaw: {:.1} Pitch: {:.1}", info.view.yaw, info.view.pitch)).small(),
            );
            ui.label(
                egui::RichText::new(if info.cursor_captured { "Mouse: captured" } else { "Mouse: free" }).small(),
            );
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Mouse - Look").small());
            ui.label(egui::RichText::new("Click - Capture mouse").small());
            ui.label(egui::RichText::new("Esc - Release mouse").small());
        });
}

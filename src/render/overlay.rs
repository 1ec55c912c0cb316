//! egui layer drawn on top of the canvas: the HUD text the frame composer
//! emits each tick, plus the diagnostics window when it is open.

use glam::Vec2;
use winit::window::Window;

use super::frame::{Anchor, OverlayText};
use super::GpuState;
use crate::debug::{self, DiagnosticsSnapshot};

/// Output of one egui frame, ready for `prepare` and `render`.
pub struct OverlayOutput {
    pub primitives: Vec<egui::epaint::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

pub struct Overlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    canvas_size: Vec2,
}

impl Overlay {
    pub fn new(window: &Window, gpu: &GpuState, canvas_w: u32, canvas_h: u32) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            canvas_size: Vec2::new(canvas_w.max(1) as f32, canvas_h.max(1) as f32),
        }
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Lay out the HUD text and (optionally) the diagnostics window.
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        texts: &[OverlayText],
        diagnostics: Option<&DiagnosticsSnapshot>,
    ) -> OverlayOutput {
        let raw_input = self.egui_state.take_egui_input(window);
        // Canvas pixels to surface pixels; 1:1 unless the window manager
        // overrode the requested size.
        let scale = Vec2::new(screen_w as f32, screen_h as f32) / self.canvas_size;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            paint_texts(ctx, texts, scale);
            if let Some(snapshot) = diagnostics {
                debug::draw_panel(ctx, snapshot);
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        OverlayOutput {
            primitives,
            textures_delta: full_output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [screen_w, screen_h],
                pixels_per_point,
            },
        }
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output: &OverlayOutput,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            device,
            queue,
            encoder,
            &output.primitives,
            &output.screen_descriptor,
        )
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'static>, output: &OverlayOutput) {
        self.egui_renderer
            .render(render_pass, &output.primitives, &output.screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, output: &OverlayOutput) {
        for id in &output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_texts(ctx: &egui::Context, texts: &[OverlayText], scale: Vec2) {
    let ppp = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("hud_text"),
    ));

    for t in texts {
        let p = t.pos * scale / ppp;
        let align = match t.anchor {
            Anchor::TopLeft => egui::Align2::LEFT_TOP,
            Anchor::Center => egui::Align2::CENTER_CENTER,
        };
        let [r, g, b, a] = t.color.0;
        painter.text(
            egui::pos2(p.x, p.y),
            align,
            &t.text,
            egui::FontId::proportional(t.size * scale.y / ppp),
            egui::Color32::from_rgba_unmultiplied(r, g, b, a),
        );
    }
}

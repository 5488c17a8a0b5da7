//! Transient feedback messages.
//!
//! Toasts stack in the bottom-right corner, fade out near the end of
//! their lifetime and never block input. Mutation failures surface here
//! (except overlap conflicts, which get the dedicated conflict notice).

use std::time::{Duration, Instant};

use egui::{Color32, Context, Pos2, RichText};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Success => "✓",
            ToastLevel::Info => "ℹ",
            ToastLevel::Error => "✗",
        }
    }

    pub fn background_color(&self) -> Color32 {
        match self {
            ToastLevel::Success => Color32::from_rgb(30, 70, 40),
            ToastLevel::Info => Color32::from_rgb(30, 50, 80),
            ToastLevel::Error => Color32::from_rgb(80, 30, 30),
        }
    }

    pub fn text_color(&self) -> Color32 {
        match self {
            ToastLevel::Success => Color32::from_rgb(100, 220, 120),
            ToastLevel::Info => Color32::from_rgb(100, 180, 255),
            ToastLevel::Error => Color32::from_rgb(255, 120, 120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    /// Stable identity assigned by the manager; keeps egui area ids from
    /// shifting as earlier toasts expire out of the stack
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            id: 0,
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration: Duration::from_secs(4),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Error)
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    /// Opacity for the fade-out over the final half second
    pub fn opacity(&self) -> f32 {
        let elapsed = self.created_at.elapsed();
        let fade_start = self.duration.saturating_sub(Duration::from_millis(500));

        if elapsed >= self.duration {
            0.0
        } else if elapsed >= fade_start {
            ((self.duration - elapsed).as_secs_f32() / 0.5).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut toast: Toast) {
        toast.id = self.next_id;
        self.next_id += 1;
        self.toasts.push(toast);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.add(Toast::success(message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Toast::info(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Toast::error(message));
    }

    pub fn cleanup(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn has_toasts(&self) -> bool {
        !self.toasts.is_empty()
    }

    /// Render all active toasts, stacking upward from the bottom-right
    pub fn render(&mut self, ctx: &Context) {
        self.cleanup();

        if self.toasts.is_empty() {
            return;
        }

        // Keep the fade animation moving
        ctx.request_repaint();

        let screen_rect = ctx.screen_rect();
        let toast_width = 320.0;
        let toast_height = 40.0;
        let margin = 10.0;
        let spacing = 5.0;

        for (i, toast) in self.toasts.iter().enumerate() {
            let opacity = toast.opacity();
            if opacity <= 0.0 {
                continue;
            }

            let y_offset = (i as f32) * (toast_height + spacing);
            let pos = Pos2::new(
                screen_rect.right() - toast_width - margin,
                screen_rect.bottom() - toast_height - margin - y_offset,
            );

            egui::Area::new(egui::Id::new(("toast", toast.id)))
                .fixed_pos(pos)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    let bg = toast.level.background_color();
                    let fg = toast.level.text_color();

                    let bg = Color32::from_rgba_unmultiplied(
                        bg.r(),
                        bg.g(),
                        bg.b(),
                        (230.0 * opacity) as u8,
                    );
                    let fg = Color32::from_rgba_unmultiplied(
                        fg.r(),
                        fg.g(),
                        fg.b(),
                        (255.0 * opacity) as u8,
                    );

                    egui::Frame::none()
                        .fill(bg)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                        .stroke(egui::Stroke::new(1.0, fg.gamma_multiply(0.3)))
                        .show(ui, |ui| {
                            ui.set_min_width(toast_width - 24.0);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(toast.level.icon()).color(fg).strong());
                                ui.label(RichText::new(&toast.message).color(fg));
                            });
                        });
                });
        }
    }
}

//! Overlap-conflict notice.
//!
//! When the backend refuses a reschedule with an overlap error, the
//! rejected change is rolled back by reload and this notice lists the
//! appointments that blocked it, each linking to its detail page in the
//! CRM web app. The notice auto-dismisses after a few seconds or when
//! the user closes it.

use std::time::{Duration, Instant};

use chrono::Local;
use egui::{Color32, Context, RichText};

use crate::services::api::contracts::ConflictItem;

const NOTICE_LIFETIME: Duration = Duration::from_secs(7);
/// Cap the list; beyond this a "+N more" suffix stands in
const MAX_LISTED: usize = 3;

#[derive(Debug)]
pub struct ConflictNotice {
    headline: String,
    conflicts: Vec<ConflictItem>,
    created_at: Instant,
}

impl ConflictNotice {
    pub fn new(headline: impl Into<String>, conflicts: Vec<ConflictItem>) -> Self {
        Self {
            headline: headline.into(),
            conflicts,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= NOTICE_LIFETIME
    }

    fn overflow(&self) -> usize {
        self.conflicts.len().saturating_sub(MAX_LISTED)
    }
}

/// Detail-page URL for a conflicting appointment in the CRM web app;
/// the fragment scrolls the dashboard to the appointment row.
pub fn conflict_href(web_base_url: &str, appointment_id: &str) -> String {
    let encoded = urlencoding::encode(appointment_id);
    format!(
        "{}/dashboard/appointments?appointment_id={encoded}#appointment-{encoded}",
        web_base_url.trim_end_matches('/')
    )
}

fn format_conflict_window(item: &ConflictItem) -> String {
    let start = item.starts_at.with_timezone(&Local);
    let end = item.ends_at.with_timezone(&Local);
    format!(
        "{} – {}",
        start.format("%a %H:%M"),
        end.format("%H:%M")
    )
}

#[derive(Debug, Default)]
pub struct ConflictBanner {
    notice: Option<ConflictNotice>,
}

impl ConflictBanner {
    pub fn show_conflict(&mut self, headline: impl Into<String>, conflicts: Vec<ConflictItem>) {
        self.notice = Some(ConflictNotice::new(headline, conflicts));
    }

    pub fn dismiss(&mut self) {
        self.notice = None;
    }

    pub fn is_visible(&self) -> bool {
        self.notice.is_some()
    }

    /// Render at the top of the screen; expires on its own timer
    pub fn render(&mut self, ctx: &Context, web_base_url: &str) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired()) {
            self.notice = None;
        }
        let Some(notice) = &self.notice else {
            return;
        };

        // Keep the expiry timer ticking
        ctx.request_repaint_after(Duration::from_millis(250));

        let mut dismissed = false;
        egui::TopBottomPanel::top("conflict_notice")
            .frame(
                egui::Frame::none()
                    .fill(Color32::from_rgb(84, 36, 44))
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(&notice.headline)
                            .color(Color32::from_rgb(250, 200, 206))
                            .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            dismissed = true;
                        }
                    });
                });

                for item in notice.conflicts.iter().take(MAX_LISTED) {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format_conflict_window(item))
                                .color(Color32::from_rgb(236, 180, 188)),
                        );
                        if ui.link("Open in CRM").clicked() {
                            let href = conflict_href(web_base_url, &item.id);
                            if let Err(err) = webbrowser::open(&href) {
                                log::warn!("Failed to open {href}: {err}");
                            }
                        }
                    });
                }

                let overflow = notice.overflow();
                if overflow > 0 {
                    ui.label(
                        RichText::new(format!("+{overflow} more"))
                            .color(Color32::from_rgb(236, 180, 188))
                            .italics(),
                    );
                }
            });

        if dismissed {
            self.notice = None;
        }
    }
}

//! Week/day calendar grid.
//!
//! Renders one column per visible day with a shared hour gutter, lays
//! out each day's appointments through the column engine, and turns
//! pointer activity into interaction requests for the app layer:
//! click-to-create, click-to-edit, move-drag and resize-drag. The view
//! itself never talks to the network; it only reports what the user
//! asked for.

use chrono::{DateTime, Local, NaiveDate, Timelike, Utc};
use egui::{Align2, Color32, CursorIcon, FontId, Pos2, Rect, Rounding, Sense, Stroke, Vec2};

use crate::models::appointment::Appointment;
use crate::ui_egui::gesture::{DragContext, Gesture, ResizeState};
use crate::utils::date::{combine_day_and_minutes, format_day_header, is_same_local_day};

use super::day_layout::{layout_events_for_day, DayLayoutEvent};
use super::palette::{is_inert, status_colors};
use super::time_grid::{
    minute_from_pointer, minute_to_y, GRID_HEIGHT, PIXELS_PER_MINUTE, SLOT_HEIGHT, SLOT_MINUTES,
    TIME_LABEL_WIDTH, TOTAL_MINUTES,
};

const RESIZE_HANDLE_HEIGHT: f32 = 7.0;
const BLOCK_GAP: f32 = 2.0;

/// What the user asked the grid for this frame
#[derive(Debug, Default)]
pub struct CalendarInteraction {
    /// Empty slot clicked: open the create form at (day, minute)
    pub open_create_at: Option<(NaiveDate, i64)>,
    /// Existing block clicked: open the edit form
    pub open_edit: Option<String>,
    /// Move-drag dropped on a new slot
    pub move_request: Option<TimeChangeRequest>,
    /// Resize-drag released at a new end
    pub resize_request: Option<TimeChangeRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeChangeRequest {
    pub appointment_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Persistent grid state: the active gesture and the initial scroll
pub struct CalendarGrid {
    gesture: Gesture,
    scroll_to_morning: bool,
    /// Pointer position captured once at the top of each render
    pointer: Option<Pos2>,
}

impl Default for CalendarGrid {
    fn default() -> Self {
        Self {
            gesture: Gesture::default(),
            scroll_to_morning: true,
            pointer: None,
        }
    }
}

impl CalendarGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-scroll to the working-hours window on the next render
    pub fn reset_scroll(&mut self) {
        self.scroll_to_morning = true;
    }

    /// A reload can remove the gestured appointment mid-drag (deleted by
    /// another session). Its block is never rendered again, so no
    /// pointer-up handler would ever clear the gesture; release it here
    /// instead of leaving the grid stuck non-idle.
    fn release_gesture_for_vanished(&mut self, appointments: &[Appointment]) {
        let vanished = match self.gesture.appointment_id() {
            Some(id) => !appointments.iter().any(|appointment| appointment.id == id),
            None => false,
        };
        if vanished {
            self.gesture.clear();
        }
    }

    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        days: &[NaiveDate],
        appointments: &[Appointment],
        is_mutating: &dyn Fn(&str) -> bool,
    ) -> CalendarInteraction {
        let mut interaction = CalendarInteraction::default();
        if days.is_empty() {
            return interaction;
        }

        self.pointer = ui
            .ctx()
            .pointer_interact_pos()
            .or_else(|| ui.ctx().pointer_latest_pos());
        self.release_gesture_for_vanished(appointments);
        if !self.gesture.is_idle() {
            // Gesture previews track the pointer, not input events
            ui.ctx().request_repaint();
        }

        self.render_header(ui, days);

        egui::ScrollArea::vertical()
            .id_source("calendar_grid")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let width = ui.available_width();
                let (content_rect, _) =
                    ui.allocate_exact_size(Vec2::new(width, GRID_HEIGHT), Sense::hover());

                if self.scroll_to_morning {
                    // Land on the start of the working day rather than midnight
                    let morning_y = minute_to_y(8 * 60, content_rect.top());
                    ui.scroll_to_rect(
                        Rect::from_min_size(
                            Pos2::new(content_rect.left(), morning_y),
                            Vec2::new(width, SLOT_HEIGHT),
                        ),
                        Some(egui::Align::TOP),
                    );
                    self.scroll_to_morning = false;
                }

                let day_width = (width - TIME_LABEL_WIDTH) / days.len() as f32;
                let column_rects: Vec<(NaiveDate, Rect)> = days
                    .iter()
                    .enumerate()
                    .map(|(i, day)| {
                        let left = content_rect.left() + TIME_LABEL_WIDTH + i as f32 * day_width;
                        (
                            *day,
                            Rect::from_min_size(
                                Pos2::new(left, content_rect.top()),
                                Vec2::new(day_width, GRID_HEIGHT),
                            ),
                        )
                    })
                    .collect();

                self.paint_gutter_and_lines(ui, content_rect, &column_rects);

                for (day, column_rect) in &column_rects {
                    self.render_day_column(
                        ui,
                        *day,
                        *column_rect,
                        appointments,
                        is_mutating,
                        &column_rects,
                        &mut interaction,
                    );
                }

                self.paint_drag_ghost(ui, &column_rects);
            });

        interaction
    }

    fn render_header(&self, ui: &mut egui::Ui, days: &[NaiveDate]) {
        let today = Local::now().date_naive();
        ui.horizontal(|ui| {
            ui.add_space(TIME_LABEL_WIDTH);
            let day_width = (ui.available_width()) / days.len() as f32;
            for day in days {
                let (rect, _) = ui
                    .allocate_exact_size(Vec2::new(day_width, 22.0), Sense::hover());
                let color = if *day == today {
                    Color32::from_rgb(120, 180, 255)
                } else {
                    ui.visuals().text_color()
                };
                ui.painter().text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format_day_header(*day),
                    FontId::proportional(13.0),
                    color,
                );
            }
        });
        ui.separator();
    }

    fn paint_gutter_and_lines(
        &self,
        ui: &egui::Ui,
        content_rect: Rect,
        column_rects: &[(NaiveDate, Rect)],
    ) {
        let painter = ui.painter();
        let faint = Stroke::new(1.0, Color32::from_gray(45));
        let strong = Stroke::new(1.0, Color32::from_gray(70));

        let mut minute = 0;
        while minute < TOTAL_MINUTES {
            let y = minute_to_y(minute, content_rect.top());
            let on_hour = minute % 60 == 0;
            painter.line_segment(
                [
                    Pos2::new(content_rect.left() + TIME_LABEL_WIDTH, y),
                    Pos2::new(content_rect.right(), y),
                ],
                if on_hour { strong } else { faint },
            );
            if on_hour {
                painter.text(
                    Pos2::new(content_rect.left() + TIME_LABEL_WIDTH - 6.0, y),
                    Align2::RIGHT_CENTER,
                    format!("{:02}:00", minute / 60),
                    FontId::proportional(11.0),
                    Color32::from_gray(140),
                );
            }
            minute += SLOT_MINUTES;
        }

        for (_, rect) in column_rects {
            painter.line_segment(
                [rect.left_top(), rect.left_bottom()],
                Stroke::new(1.0, Color32::from_gray(60)),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_day_column(
        &mut self,
        ui: &mut egui::Ui,
        day: NaiveDate,
        column_rect: Rect,
        appointments: &[Appointment],
        is_mutating: &dyn Fn(&str) -> bool,
        column_rects: &[(NaiveDate, Rect)],
        interaction: &mut CalendarInteraction,
    ) {
        let layout = layout_events_for_day(appointments, day);

        let column_id = ui.id().with(("day_column", day));
        let column_response = ui.interact(column_rect, column_id, Sense::click());

        let mut block_rects: Vec<Rect> = Vec::with_capacity(layout.len());
        for event in &layout {
            let rect = self.block_rect(event, column_rect);
            block_rects.push(rect);
            self.render_block(ui, event, rect, is_mutating, column_rects, interaction);
        }

        // Clicks that land on a block belong to the block, not the slot
        if column_response.clicked() && self.gesture.is_idle() {
            if let Some(pointer) = column_response.interact_pointer_pos() {
                let on_block = block_rects.iter().any(|rect| rect.contains(pointer));
                if !on_block {
                    let minute = minute_from_pointer(pointer.y, column_rect);
                    interaction.open_create_at = Some((day, minute));
                }
            }
        }

        self.paint_now_line(ui, day, column_rect);
    }

    fn block_rect(&self, event: &DayLayoutEvent<'_>, column_rect: Rect) -> Rect {
        // An active resize previews live; the stored end is overridden
        let end_min = match self.gesture.resizing() {
            Some(state) if state.appointment_id == event.appointment.id => self
                .pointer_y()
                .map(|y| state.candidate_end(y))
                .unwrap_or(event.end_min),
            _ => event.end_min,
        };

        let col_width = (column_rect.width() - BLOCK_GAP) / event.cols as f32;
        let left = column_rect.left() + BLOCK_GAP / 2.0 + event.col as f32 * col_width;
        let top = minute_to_y(event.start_min, column_rect.top());
        let bottom = minute_to_y(end_min.max(event.start_min + 1), column_rect.top());

        Rect::from_min_max(
            Pos2::new(left + BLOCK_GAP / 2.0, top + 1.0),
            Pos2::new(left + col_width - BLOCK_GAP / 2.0, bottom - 1.0),
        )
    }

    fn render_block(
        &mut self,
        ui: &mut egui::Ui,
        event: &DayLayoutEvent<'_>,
        rect: Rect,
        is_mutating: &dyn Fn(&str) -> bool,
        column_rects: &[(NaiveDate, Rect)],
        interaction: &mut CalendarInteraction,
    ) {
        let appointment = event.appointment;
        let mutating = is_mutating(&appointment.id);
        let being_dragged = self
            .gesture
            .dragging()
            .is_some_and(|context| context.appointment_id == appointment.id);

        let colors = status_colors(appointment.status);
        // Await-response and drag sources render dimmed
        let opacity = if mutating || being_dragged { 0.45 } else { 1.0 };
        let fill = colors.fill.gamma_multiply(opacity);
        let border = colors.border.gamma_multiply(opacity);

        let painter = ui.painter();
        painter.rect_filled(rect, Rounding::same(4.0), fill);
        painter.rect_stroke(rect, Rounding::same(4.0), Stroke::new(1.0, border));
        self.paint_block_label(ui, event, rect, opacity);

        if mutating {
            return;
        }

        let block_id = ui.id().with(("appointment", &appointment.id));
        let draggable = !is_inert(appointment.status);
        let sense = if draggable {
            Sense::click_and_drag()
        } else {
            Sense::click()
        };
        let response = ui.interact(rect, block_id, sense);

        if response.clicked() && self.gesture.is_idle() {
            interaction.open_edit = Some(appointment.id.clone());
        }

        if draggable {
            if response.drag_started() {
                self.gesture.begin_drag(DragContext::from_appointment(appointment));
            }
            if response.drag_stopped() && being_dragged {
                self.finish_move(column_rects, interaction);
            }
        }

        if event.can_resize && draggable {
            self.render_resize_handle(ui, event, rect, interaction);
        }
    }

    fn render_resize_handle(
        &mut self,
        ui: &mut egui::Ui,
        event: &DayLayoutEvent<'_>,
        rect: Rect,
        interaction: &mut CalendarInteraction,
    ) {
        let handle_rect = Rect::from_min_max(
            Pos2::new(rect.left(), rect.bottom() - RESIZE_HANDLE_HEIGHT),
            rect.right_bottom(),
        );
        let handle_id = ui.id().with(("resize_handle", &event.appointment.id));
        let response = ui
            .interact(handle_rect, handle_id, Sense::drag())
            .on_hover_cursor(CursorIcon::ResizeVertical);

        if response.drag_started() && self.gesture.is_idle() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.gesture.begin_resize(ResizeState {
                    appointment_id: event.appointment.id.clone(),
                    day: event.day,
                    start_min: event.start_min,
                    initial_end_min: event.end_min,
                    start_y: pointer.y,
                });
            }
        }

        let resizing_this = self
            .gesture
            .resizing()
            .is_some_and(|state| state.appointment_id == event.appointment.id);
        if response.drag_stopped() && resizing_this {
            self.finish_resize(interaction);
        }
    }

    fn finish_move(&mut self, column_rects: &[(NaiveDate, Rect)], interaction: &mut CalendarInteraction) {
        let Gesture::Dragging(context) = self.gesture.clear() else {
            return;
        };
        let Some(pointer) = self.pointer_pos() else {
            return;
        };
        let Some((day, column_rect)) = column_rects
            .iter()
            .find(|(_, rect)| pointer.x >= rect.left() && pointer.x < rect.right())
        else {
            return;
        };

        let minute = minute_from_pointer(pointer.y, *column_rect);
        let (starts_at, ends_at) = context.dropped_times(*day, minute);
        // Dropping back on the original slot sends nothing
        if context.is_noop_drop(starts_at, ends_at) {
            return;
        }

        interaction.move_request = Some(TimeChangeRequest {
            appointment_id: context.appointment_id,
            starts_at,
            ends_at,
        });
    }

    fn finish_resize(&mut self, interaction: &mut CalendarInteraction) {
        let Gesture::Resizing(state) = self.gesture.clear() else {
            return;
        };
        let Some(pointer) = self.pointer_pos() else {
            return;
        };

        let end_min = state.candidate_end(pointer.y);
        if state.is_noop_release(end_min) {
            return;
        }

        let starts_at = combine_day_and_minutes(state.day, state.start_min).with_timezone(&Utc);
        let ends_at = combine_day_and_minutes(state.day, end_min).with_timezone(&Utc);
        interaction.resize_request = Some(TimeChangeRequest {
            appointment_id: state.appointment_id,
            starts_at,
            ends_at,
        });
    }

    fn paint_block_label(
        &self,
        ui: &egui::Ui,
        event: &DayLayoutEvent<'_>,
        rect: Rect,
        opacity: f32,
    ) {
        let appointment = event.appointment;
        let colors = status_colors(appointment.status);
        let text_color = colors.text.gamma_multiply(opacity);
        let painter = ui.painter().with_clip_rect(rect);

        let time_label = format!(
            "{} – {}",
            appointment.local_start().format("%H:%M"),
            appointment.local_end().format("%H:%M")
        );
        painter.text(
            rect.left_top() + Vec2::new(4.0, 2.0),
            Align2::LEFT_TOP,
            time_label,
            FontId::proportional(10.0),
            text_color,
        );

        if rect.height() > 26.0 {
            painter.text(
                rect.left_top() + Vec2::new(4.0, 14.0),
                Align2::LEFT_TOP,
                &appointment.customer.name,
                FontId::proportional(11.0),
                text_color,
            );
        }
        if rect.height() > 40.0 {
            if let Some(service) = &appointment.service {
                painter.text(
                    rect.left_top() + Vec2::new(4.0, 27.0),
                    Align2::LEFT_TOP,
                    &service.name,
                    FontId::proportional(10.0),
                    text_color.gamma_multiply(0.8),
                );
            }
        }
    }

    /// Translucent preview of the slot a move-drag would land on
    fn paint_drag_ghost(&self, ui: &egui::Ui, column_rects: &[(NaiveDate, Rect)]) {
        let Some(context) = self.gesture.dragging() else {
            return;
        };
        let Some(pointer) = self.pointer_pos() else {
            return;
        };
        let Some((day, column_rect)) = column_rects
            .iter()
            .find(|(_, rect)| pointer.x >= rect.left() && pointer.x < rect.right())
        else {
            return;
        };

        let minute = minute_from_pointer(pointer.y, *column_rect);
        let (starts_at, ends_at) = context.dropped_times(*day, minute);
        let duration = (ends_at - starts_at).num_minutes();

        let top = minute_to_y(minute, column_rect.top());
        let ghost = Rect::from_min_size(
            Pos2::new(column_rect.left() + 2.0, top),
            Vec2::new(
                column_rect.width() - 4.0,
                duration as f32 * PIXELS_PER_MINUTE,
            ),
        );

        let painter = ui.painter();
        painter.rect_filled(
            ghost,
            Rounding::same(4.0),
            Color32::from_rgba_unmultiplied(96, 150, 220, 60),
        );
        painter.rect_stroke(
            ghost,
            Rounding::same(4.0),
            Stroke::new(1.0, Color32::from_rgb(96, 150, 220)),
        );
    }

    fn paint_now_line(&self, ui: &egui::Ui, day: NaiveDate, column_rect: Rect) {
        let now = Local::now();
        if !is_same_local_day(now.with_timezone(&Utc), day) {
            return;
        }

        let minute = (now.hour() * 60 + now.minute()) as i64;
        let y = minute_to_y(minute, column_rect.top());
        let painter = ui.painter();
        painter.line_segment(
            [
                Pos2::new(column_rect.left(), y),
                Pos2::new(column_rect.right(), y),
            ],
            Stroke::new(2.0, Color32::from_rgb(230, 80, 80)),
        );
        painter.circle_filled(
            Pos2::new(column_rect.left() + 3.0, y),
            3.0,
            Color32::from_rgb(230, 80, 80),
        );
    }

    fn pointer_pos(&self) -> Option<Pos2> {
        self.pointer
    }

    fn pointer_y(&self) -> Option<f32> {
        self.pointer.map(|pos| pos.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::models::appointment::{AppointmentStatus, Customer};

    fn appointment(id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            starts_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
            status: AppointmentStatus::Booked,
            cancelled_reason: None,
            notes: None,
            customer: Customer {
                id: "cust-1".to_string(),
                name: "Dana".to_string(),
                phone: None,
            },
            service: None,
            location_id: "loc-1".to_string(),
        }
    }

    #[test]
    fn test_drag_released_when_appointment_vanishes_from_reload() {
        let mut grid = CalendarGrid::new();
        let kept = appointment("appt-1");
        let dragged = appointment("appt-2");
        grid.gesture
            .begin_drag(DragContext::from_appointment(&dragged));

        // While the reload still returns the appointment, the drag lives on
        grid.release_gesture_for_vanished(&[kept.clone(), dragged.clone()]);
        assert!(!grid.gesture.is_idle());

        // Deleted by another session: the gesture is released so the grid
        // goes back to accepting clicks and new drags
        grid.release_gesture_for_vanished(&[kept]);
        assert!(grid.gesture.is_idle());
    }

    #[test]
    fn test_resize_released_when_appointment_vanishes_from_reload() {
        let mut grid = CalendarGrid::new();
        grid.gesture.begin_resize(ResizeState {
            appointment_id: "appt-1".to_string(),
            day: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            start_min: 9 * 60,
            initial_end_min: 10 * 60,
            start_y: 0.0,
        });

        grid.release_gesture_for_vanished(&[]);
        assert!(grid.gesture.is_idle());
    }

    #[test]
    fn test_idle_grid_ignores_reloads() {
        let mut grid = CalendarGrid::new();
        grid.release_gesture_for_vanished(&[]);
        assert!(grid.gesture.is_idle());
    }
}

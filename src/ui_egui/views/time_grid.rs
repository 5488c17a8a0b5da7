//! Time-grid constants and pure pointer/minute math.
//!
//! Everything here is geometry: mapping between minutes past local
//! midnight and vertical pixels in a day column, plus the snapping rules
//! for click-to-create, move-drag and resize-drag.

use egui::Rect;

/// Base slot used for grid lines and move-drag snapping
pub const SLOT_MINUTES: i64 = 30;
/// Finer granularity used while resizing
pub const RESIZE_SNAP_MINUTES: i64 = 15;
/// Shortest duration an appointment may be resized or displayed to
pub const MIN_EVENT_MINUTES: i64 = 15;
pub const TOTAL_MINUTES: i64 = 24 * 60;

/// Pixel height of one base slot; density is constant across the grid
pub const SLOT_HEIGHT: f32 = 28.0;
pub const PIXELS_PER_MINUTE: f32 = SLOT_HEIGHT / SLOT_MINUTES as f32;
pub const GRID_HEIGHT: f32 = TOTAL_MINUTES as f32 * PIXELS_PER_MINUTE;
pub const TIME_LABEL_WIDTH: f32 = 56.0;

/// Floor to the previous multiple of `step`
pub fn floor_to_step(value: f32, step: i64) -> i64 {
    (value / step as f32).floor() as i64 * step
}

/// Round to the nearest multiple of `step`, ties away from zero.
/// Resize snapping depends on nearest (not floor) rounding.
pub fn round_to_step(value: f32, step: i64) -> i64 {
    (value / step as f32).round() as i64 * step
}

/// Map a pointer's vertical position inside a day column to a minute,
/// floored to the base slot and clamped so the result is always a
/// creatable slot, even at the very top or bottom edge.
pub fn minute_from_pointer(pointer_y: f32, column_rect: Rect) -> i64 {
    let offset = (pointer_y - column_rect.top()).clamp(0.0, column_rect.height());
    let raw = offset / column_rect.height() * TOTAL_MINUTES as f32;
    floor_to_step(raw, SLOT_MINUTES).clamp(0, TOTAL_MINUTES - SLOT_MINUTES)
}

/// Snap a raw resize end minute to the 15-minute grid, keeping at least
/// the minimum duration and never extending past the end of the day.
pub fn snapped_resize_end(raw_end: f32, start_min: i64) -> i64 {
    round_to_step(raw_end, RESIZE_SNAP_MINUTES).clamp(start_min + MIN_EVENT_MINUTES, TOTAL_MINUTES)
}

/// Vertical pixel position of a minute within a column starting at `top`
pub fn minute_to_y(minute: i64, top: f32) -> f32 {
    top + minute as f32 * PIXELS_PER_MINUTE
}

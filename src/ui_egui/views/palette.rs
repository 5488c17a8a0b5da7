//! Status colors for appointment blocks.

use egui::Color32;

use crate::models::appointment::AppointmentStatus;

/// Fill and accent colors for one status
#[derive(Debug, Clone, Copy)]
pub struct StatusColors {
    pub fill: Color32,
    pub border: Color32,
    pub text: Color32,
}

/// Booked is blue, completed green, cancelled rose, no-show amber.
pub fn status_colors(status: AppointmentStatus) -> StatusColors {
    match status {
        AppointmentStatus::Booked => StatusColors {
            fill: Color32::from_rgb(37, 72, 128),
            border: Color32::from_rgb(96, 150, 220),
            text: Color32::from_rgb(214, 230, 252),
        },
        AppointmentStatus::Completed => StatusColors {
            fill: Color32::from_rgb(32, 92, 56),
            border: Color32::from_rgb(92, 190, 128),
            text: Color32::from_rgb(214, 246, 224),
        },
        AppointmentStatus::Cancelled => StatusColors {
            fill: Color32::from_rgb(110, 42, 56),
            border: Color32::from_rgb(220, 110, 130),
            text: Color32::from_rgb(250, 218, 226),
        },
        AppointmentStatus::NoShow => StatusColors {
            fill: Color32::from_rgb(112, 82, 24),
            border: Color32::from_rgb(222, 178, 80),
            text: Color32::from_rgb(250, 238, 208),
        },
    }
}

/// Cancelled and no-show blocks render dimmed and are not draggable
pub fn is_inert(status: AppointmentStatus) -> bool {
    matches!(
        status,
        AppointmentStatus::Cancelled | AppointmentStatus::NoShow
    )
}

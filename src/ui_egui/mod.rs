// egui user interface
// App shell, gesture state, dialogs and notifications

pub mod app;
pub mod appointment_form;
pub mod conflict;
pub mod gesture;
pub mod toast;
pub mod views;

pub use app::CalendarApp;

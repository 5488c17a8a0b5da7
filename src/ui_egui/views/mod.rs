// Calendar views
// Grid geometry, day-column layout and the interactive week/day view

pub mod calendar_view;
pub mod day_layout;
pub mod palette;
pub mod time_grid;

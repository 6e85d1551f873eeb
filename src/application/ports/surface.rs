//! Widget surface port interface

use crate::domain::widget::UiState;

/// Port for the visible parts of the widget: the trigger and the status text
pub trait WidgetSurface {
    /// Toggle the trigger's active ("recording") visual state
    fn set_trigger_active(&mut self, active: bool);

    /// Show a new status
    fn set_status(&mut self, state: &UiState);
}

use catalog::ClimateLayerId;

/// What the component is currently showing.
///
/// Exactly one variant holds at a time: property markers and climate
/// overlays are mutually exclusive in the UI this engine drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActiveSelection {
    /// No overlay, markers hidden.
    Idle,
    /// Property markers visible, no overlay. The initial state.
    MarkersShown,
    /// One climate overlay visible, markers hidden.
    LayerActive(ClimateLayerId),
}

/// Input to the selection machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionInput {
    Clear,
    SelectLayer(ClimateLayerId),
    ToggleMarkers,
}

impl ActiveSelection {
    pub fn markers_visible(&self) -> bool {
        matches!(self, ActiveSelection::MarkersShown)
    }

    pub fn active_layer(&self) -> Option<ClimateLayerId> {
        match self {
            ActiveSelection::LayerActive(id) => Some(*id),
            _ => None,
        }
    }

    /// Pure transition function.
    ///
    /// - `Clear` resets to `Idle` from anywhere.
    /// - Selecting the already-active layer clears it.
    /// - The markers toggle leaves `MarkersShown` for `Idle`, and enters it
    ///   from anywhere else (dropping any active layer).
    pub fn apply(self, input: SelectionInput) -> ActiveSelection {
        match input {
            SelectionInput::Clear => ActiveSelection::Idle,
            SelectionInput::SelectLayer(id) => {
                if self == ActiveSelection::LayerActive(id) {
                    ActiveSelection::Idle
                } else {
                    ActiveSelection::LayerActive(id)
                }
            }
            SelectionInput::ToggleMarkers => {
                if self == ActiveSelection::MarkersShown {
                    ActiveSelection::Idle
                } else {
                    ActiveSelection::MarkersShown
                }
            }
        }
    }
}

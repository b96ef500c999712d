use bevy_ecs::resource::Resource;

/// Which surface the renderer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceDisplay {
    #[default]
    Simulated,
    /// The decorative wave overlay. The simulation keeps its own state and
    /// keeps advancing while this is shown.
    Decorative,
}

impl SurfaceDisplay {
    pub fn toggled(self) -> Self {
        match self {
            SurfaceDisplay::Simulated => SurfaceDisplay::Decorative,
            SurfaceDisplay::Decorative => SurfaceDisplay::Simulated,
        }
    }
}

/// Runtime toggles of the surface simulation.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationModes {
    /// Whether simulated time advances.
    pub stepping: bool,
    pub display: SurfaceDisplay,
    /// Whether any water surface is drawn at all.
    pub render_surface: bool,
}

impl Default for SimulationModes {
    fn default() -> Self {
        Self {
            stepping: false,
            display: SurfaceDisplay::Simulated,
            render_surface: true,
        }
    }
}

impl SimulationModes {
    pub fn toggle_stepping(&mut self) {
        self.stepping = !self.stepping;
    }

    pub fn toggle_display(&mut self) {
        self.display = self.display.toggled();
    }

    /// True when the renderer should draw the simulated height field.
    pub fn shows_simulated_surface(&self) -> bool {
        self.render_surface && self.display == SurfaceDisplay::Simulated
    }

    /// True when the renderer should draw the decorative overlay.
    pub fn shows_decorative_surface(&self) -> bool {
        self.render_surface && self.display == SurfaceDisplay::Decorative
    }
}

/// How the viewport shader presents the scene. Serialized as its tag value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewportMode {
    Flat,
    #[default]
    Shaded,
    Wireframe,
}

impl ViewportMode {
    pub fn tag(self) -> u32 {
        match self {
            ViewportMode::Flat => 0,
            ViewportMode::Shaded => 1,
            ViewportMode::Wireframe => 2,
        }
    }
}

/// User adjustable knobs that survive between edits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Maximum BVH depth, typically 0..=30.
    pub max_depth: u32,
    pub viewport_mode: ViewportMode,
    pub downsample_factor: u32,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            max_depth: 10,
            viewport_mode: ViewportMode::Shaded,
            downsample_factor: 1,
        }
    }
}

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MovementConfig {
    /// Metres per frame before the multiplier is applied.
    pub base_speed: f32,
    pub speed_multiplier: f32,
    pub player_height: f32,
    pub player_radius: f32,
    /// Also collide against the object being walked through.
    pub collide_with_worn: bool,
}

impl MovementConfig {
    pub fn move_speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.05,
            speed_multiplier: 1.0,
            player_height: 1.7,
            player_radius: 0.3,
            collide_with_worn: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub url: String,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub movement: MovementConfig,
    /// Scale multiplier applied to the worn object to reach roughly 1:1.
    pub first_person_scale: f32,
    pub ui_debounce: Duration,
    pub gesture_scale_limits: (f32, f32),
    pub models: Vec<ModelEntry>,
    /// Floor number and model url for the interior viewer.
    pub floors: Vec<(u32, String)>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            first_person_scale: 20.0,
            ui_debounce: Duration::from_millis(500),
            gesture_scale_limits: (0.01, 2.0),
            models: vec![
                ModelEntry::new("Tower House", "tower_house_design.glb"),
                ModelEntry::new("Kitchen", "interior-fix2.glb"),
                ModelEntry::new("3 Bedroom House", "3_bedroom_house.glb"),
            ],
            floors: vec![
                (1, "interior-lantai-1.glb".to_string()),
                (2, "interior-lantai-2.glb".to_string()),
            ],
        }
    }
}

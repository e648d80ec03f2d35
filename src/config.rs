// Configuration handed over by the host page as JSON. Every field has a
// default, so an empty object is a complete configuration.

use crate::error::{Result, SurferError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub min: f64,
    pub max: f64,
    /// Input frequency.
    pub scale: f64,
    /// Domain warp strength, 0 disables warping.
    pub warp: f64,
    pub octaves: usize,
    pub lacunarity: f64,
    pub gain: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        NoiseSettings {
            min: -0.01,
            max: 0.01,
            scale: 0.4,
            warp: 0.02,
            octaves: 1,
            lacunarity: 0.5,
            gain: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub x_stops: Vec<String>,
    pub y_stops: Vec<String>,
    pub detail_x: usize,
    pub detail_y: usize,
}

impl Default for GradientConfig {
    fn default() -> Self {
        GradientConfig {
            // blue to red along x velocity, green to yellow along y velocity
            x_stops: vec!["#0000ff".to_owned(), "#ff0000".to_owned()],
            y_stops: vec!["#00ff00".to_owned(), "#ffff00".to_owned()],
            detail_x: 30,
            detail_y: 30,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    pub inner: f64,
    pub outer: f64,
}

/// What happens to a particle that crosses one of the ring boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingContact {
    Respawn,
    Bounce,
}

impl Default for RingContact {
    fn default() -> Self {
        RingContact::Respawn
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub count: usize,
    pub max_speed: f64,
    pub seed: u32,
    pub lifetime_min: f64,
    pub lifetime_max: f64,
    pub ring: Option<RingConfig>,
    pub ring_contact: RingContact,
    /// Strength of the tangential term, 0 turns swirling off.
    pub swirl: f64,
    pub noise: NoiseSettings,
    pub gradient: GradientConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            count: 15000,
            max_speed: 0.02,
            seed: 0,
            lifetime_min: 0.3,
            lifetime_max: 2.1,
            ring: None,
            ring_contact: RingContact::Respawn,
            swirl: 0.0,
            noise: NoiseSettings::default(),
            gradient: GradientConfig::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub half_width: f64,
    pub half_height: f64,
    pub zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            half_width: 4.0,
            half_height: 3.0,
            zoom: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub thrust: f64,
    pub max_speed: f64,
    /// Fraction of velocity kept after one second without thrust.
    pub drag: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            thrust: 6.0,
            max_speed: 3.0,
            drag: 0.25,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    pub orbit_radius: f64,
    pub angular_speed: f64,
    pub capture_radius: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        GoalConfig {
            orbit_radius: 6.0,
            angular_speed: 0.35,
            capture_radius: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub ring: RingConfig,
    pub systems: Vec<SystemConfig>,
    pub camera: CameraConfig,
    pub player: PlayerConfig,
    pub goal: GoalConfig,
    pub boost_multiplier: f64,
    /// Largest frame delta the entry point forwards to the simulation.
    pub max_dt: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        let ring = RingConfig {
            inner: 4.0,
            outer: 8.0,
        };
        let calm = SystemConfig {
            ring: Some(ring),
            ..SystemConfig::default()
        };
        let swirling = SystemConfig {
            seed: 1,
            ring: Some(ring),
            swirl: 0.003,
            ..SystemConfig::default()
        };
        GameConfig {
            ring,
            systems: vec![calm, swirling],
            camera: CameraConfig::default(),
            player: PlayerConfig::default(),
            goal: GoalConfig::default(),
            boost_multiplier: 2.0,
            max_dt: 0.1,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<GameConfig> {
        let config: GameConfig = serde_json::from_str(json)?;
        if config.systems.is_empty() {
            return Err(SurferError::NoSystems);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = GameConfig::from_json("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.systems.len(), 2);
        assert_eq!(config.systems[1].swirl, 0.003);
    }

    #[test]
    fn partial_system_config_fills_in_defaults() {
        let config = GameConfig::from_json(
            r##"{
                "systems": [{
                    "count": 200,
                    "ring": { "inner": 2.0, "outer": 5.0 },
                    "ring_contact": "bounce",
                    "gradient": { "x_stops": ["#fff", "#000"] }
                }]
            }"##,
        )
        .unwrap();
        let system = &config.systems[0];
        assert_eq!(system.count, 200);
        assert_eq!(system.max_speed, 0.02);
        assert_eq!(system.ring_contact, RingContact::Bounce);
        assert_eq!(system.ring, Some(RingConfig { inner: 2.0, outer: 5.0 }));
        assert_eq!(system.gradient.x_stops, vec!["#fff", "#000"]);
        assert_eq!(system.gradient.y_stops, GradientConfig::default().y_stops);
        assert_eq!(system.noise, NoiseSettings::default());
    }

    #[test]
    fn empty_system_list_is_rejected() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "systems": [] }"#),
            Err(SurferError::NoSystems)
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            GameConfig::from_json("{ systems"),
            Err(SurferError::Config(_))
        ));
    }
}

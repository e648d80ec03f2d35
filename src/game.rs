// Per-frame game state: which particle system is active, the player steering
// between the two rings, the goal orbiting the center, and the camera that
// follows the player and bounds the particle flow.

use crate::camera::Camera;
use crate::config::{GameConfig, GoalConfig, PlayerConfig};
use crate::error::{Result, SurferError};
use crate::particle::{confine_to_ring, RingBounds};
use crate::particle_system::{FlowParams, ParticleSystem};
use std::f64::consts::{FRAC_PI_2, PI};
use vecmath::{vec2_add, vec2_len, vec2_scale, vec2_sub, Vector2};

// Speed kept after the player hits a ring wall
const WALL_DAMPING: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Title,
    Playing,
    LevelComplete,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InputModifiers {
    pub boost: bool,
    pub invert: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    /// Desired direction, at most unit length. Set by whatever reads input.
    pub steering: Vector2<f64>,
}

impl Player {
    fn spawn(radius: f64) -> Player {
        Player {
            pos: [radius, 0.0],
            vel: [0.0, 0.0],
            steering: [0.0, 0.0],
        }
    }

    pub fn update(&mut self, dt: f64, config: &PlayerConfig, ring: &RingBounds) {
        let steer_len = vec2_len(self.steering);
        let steer = if steer_len > 1.0 {
            vec2_scale(self.steering, 1.0 / steer_len)
        } else {
            self.steering
        };
        self.vel = vec2_add(self.vel, vec2_scale(steer, config.thrust * dt));
        self.vel = vec2_scale(self.vel, config.drag.max(0.0).powf(dt));

        let speed = vec2_len(self.vel);
        if speed > config.max_speed && speed > 0.0 {
            self.vel = vec2_scale(self.vel, config.max_speed / speed);
        }
        self.pos = vec2_add(self.pos, vec2_scale(self.vel, dt));

        if confine_to_ring(&mut self.pos, &mut self.vel, ring) {
            self.vel = vec2_scale(self.vel, WALL_DAMPING);
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Goal {
    /// Current angle around the origin, radians.
    pub angle: f64,
    pub orbit_radius: f64,
    pub angular_speed: f64,
    pub capture_radius: f64,
}

impl Goal {
    fn new(config: &GoalConfig, angle: f64) -> Goal {
        Goal {
            angle,
            orbit_radius: config.orbit_radius,
            angular_speed: config.angular_speed,
            capture_radius: config.capture_radius,
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        [
            self.orbit_radius * self.angle.cos(),
            self.orbit_radius * self.angle.sin(),
        ]
    }

    pub fn update(&mut self, dt: f64) {
        self.angle = (self.angle + self.angular_speed * dt).rem_euclid(2.0 * PI);
    }

    pub fn captures(&self, pos: Vector2<f64>) -> bool {
        vec2_len(vec2_sub(pos, self.position())) <= self.capture_radius
    }
}

pub struct GameState {
    pub phase: GamePhase,
    pub active_system: usize,
    pub level: u32,
    pub modifiers: InputModifiers,
    pub camera: Camera,
    pub player: Player,
    pub goal: Goal,
    ring: RingBounds,
    player_config: PlayerConfig,
    goal_config: GoalConfig,
    boost_multiplier: f64,
    system_count: usize,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Result<GameState> {
        if config.systems.is_empty() {
            return Err(SurferError::NoSystems);
        }
        let ring = RingBounds::new(config.ring.inner, config.ring.outer)?;
        let camera = &config.camera;
        if ![camera.half_width, camera.half_height, camera.zoom]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
        {
            return Err(SurferError::InvalidCamera {
                half_width: camera.half_width,
                half_height: camera.half_height,
                zoom: camera.zoom,
            });
        }
        if !(config.max_dt.is_finite() && config.max_dt > 0.0) {
            return Err(SurferError::InvalidMaxDt(config.max_dt));
        }
        let spawn_radius = (config.ring.inner + config.ring.outer) / 2.0;

        let mut state = GameState {
            phase: GamePhase::Title,
            active_system: 0,
            level: 0,
            modifiers: InputModifiers::default(),
            camera: Camera::from_config(&config.camera),
            player: Player::spawn(spawn_radius),
            goal: Goal::new(&config.goal, PI),
            ring,
            player_config: config.player,
            goal_config: config.goal,
            boost_multiplier: config.boost_multiplier,
            system_count: config.systems.len(),
        };
        state.frame_camera();
        Ok(state)
    }

    pub fn ring(&self) -> &RingBounds {
        &self.ring
    }

    pub fn speed_multiplier(&self) -> f64 {
        if self.modifiers.boost {
            self.boost_multiplier
        } else {
            1.0
        }
    }

    pub fn flow(&self) -> FlowParams {
        FlowParams {
            speed_multiplier: self.speed_multiplier(),
            invert: self.modifiers.invert,
        }
    }

    pub fn start(&mut self) {
        if self.phase == GamePhase::Title {
            log::info!("game started");
            self.phase = GamePhase::Playing;
        }
    }

    /// Moves on from a completed level to the next particle system, reseeded
    /// with its configured seed plus the level so repeated systems never look
    /// the same.
    pub fn advance(&mut self, systems: &mut [ParticleSystem]) {
        if self.phase != GamePhase::LevelComplete {
            return;
        }
        self.level += 1;
        self.active_system = (self.active_system + 1) % self.system_count.max(1);
        if let Some(system) = systems.get_mut(self.active_system) {
            let seed = system.base_seed().wrapping_add(self.level);
            system.reseed(seed);
        }

        let spawn_radius = (self.ring.inner() + self.ring.outer()) / 2.0;
        let start_angle = self.goal.angle + PI;
        self.player = Player::spawn(spawn_radius);
        self.player.pos = [
            spawn_radius * start_angle.cos(),
            spawn_radius * start_angle.sin(),
        ];
        self.goal = Goal::new(&self.goal_config, self.goal.angle);
        self.phase = GamePhase::Playing;
        self.frame_camera();
        log::info!("level {} on system {}", self.level, self.active_system);
    }

    /// Centers the camera on the player and rolls it so that up points away
    /// from the middle of the ring.
    pub fn frame_camera(&mut self) {
        let [x, y] = self.player.pos;
        self.camera.look_at(x, y);
        if x != 0.0 || y != 0.0 {
            self.camera.rotation = y.atan2(x) - FRAC_PI_2;
        }
    }
}

/// Runs one frame: player and goal (while playing), camera framing, and the
/// active particle system.
pub fn step(state: &mut GameState, systems: &mut [ParticleSystem], dt: f64) {
    if state.phase == GamePhase::Playing {
        let ring = state.ring;
        state.player.update(dt, &state.player_config, &ring);
        state.goal.update(dt);
        if state.goal.captures(state.player.pos) {
            log::info!("level {} complete", state.level);
            state.phase = GamePhase::LevelComplete;
        }
    }
    state.frame_camera();

    let flow = state.flow();
    if let Some(system) = systems.get_mut(state.active_system) {
        let bounds = state.camera.visible_bounds();
        system.update_in_bounds(dt, &bounds, flow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;

    fn config() -> GameConfig {
        let mut config = GameConfig::default();
        for system in config.systems.iter_mut() {
            system.count = 64;
        }
        config
    }

    fn systems(config: &GameConfig) -> Vec<ParticleSystem> {
        config
            .systems
            .iter()
            .map(|c| ParticleSystem::new(c).unwrap())
            .collect()
    }

    #[test]
    fn starts_on_title_with_first_system() {
        let state = GameState::new(&config()).unwrap();
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.active_system, 0);
        assert_eq!(state.player.pos, [6.0, 0.0]);
        assert!((state.goal.position()[0] + 6.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_config_without_systems() {
        let mut config = config();
        config.systems.clear();
        assert!(matches!(GameState::new(&config), Err(SurferError::NoSystems)));
    }

    #[test]
    fn rejects_degenerate_camera() {
        for &zoom in &[0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut bad = config();
            bad.camera.zoom = zoom;
            assert!(matches!(
                GameState::new(&bad),
                Err(SurferError::InvalidCamera { .. })
            ));
        }
        for &extent in &[0.0, -4.0, f64::NAN, f64::INFINITY] {
            let mut bad = config();
            bad.camera.half_width = extent;
            assert!(matches!(
                GameState::new(&bad),
                Err(SurferError::InvalidCamera { .. })
            ));
            let mut bad = config();
            bad.camera.half_height = extent;
            assert!(matches!(
                GameState::new(&bad),
                Err(SurferError::InvalidCamera { .. })
            ));
        }
    }

    #[test]
    fn rejects_non_positive_max_dt() {
        for &max_dt in &[0.0, -0.1, f64::NAN, f64::INFINITY] {
            let mut bad = config();
            bad.max_dt = max_dt;
            assert!(matches!(
                GameState::new(&bad),
                Err(SurferError::InvalidMaxDt(_))
            ));
        }
    }

    #[test]
    fn zoom_from_json_is_checked_at_startup() {
        let config = GameConfig::from_json(r#"{ "camera": { "zoom": 0.0 } }"#).unwrap();
        assert!(GameState::new(&config).is_err());
    }

    #[test]
    fn modifiers_shape_the_flow() {
        let mut state = GameState::new(&config()).unwrap();
        assert_eq!(state.flow(), FlowParams::default());
        state.modifiers.boost = true;
        state.modifiers.invert = true;
        assert_eq!(
            state.flow(),
            FlowParams {
                speed_multiplier: 2.0,
                invert: true
            }
        );
    }

    #[test]
    fn player_stays_between_the_rings() {
        let config = config();
        let mut state = GameState::new(&config).unwrap();
        let mut systems = systems(&config);
        state.start();
        state.player.steering = [1.0, 0.0];
        for _ in 0..600 {
            step(&mut state, &mut systems, 1.0 / 60.0);
            assert!(state.ring().contains(state.player.pos));
        }
        state.player.steering = [-1.0, 0.0];
        for _ in 0..600 {
            step(&mut state, &mut systems, 1.0 / 60.0);
            assert!(state.ring().contains(state.player.pos));
        }
    }

    #[test]
    fn title_phase_freezes_the_player() {
        let config = config();
        let mut state = GameState::new(&config).unwrap();
        let mut systems = systems(&config);
        state.player.steering = [0.0, 1.0];
        for _ in 0..30 {
            step(&mut state, &mut systems, 1.0 / 60.0);
        }
        assert_eq!(state.player.pos, [6.0, 0.0]);
        assert_eq!(state.phase, GamePhase::Title);
    }

    #[test]
    fn camera_follows_and_rolls_with_the_player() {
        let mut state = GameState::new(&config()).unwrap();
        state.player.pos = [0.0, 6.0];
        state.frame_camera();
        assert_eq!(state.camera.position.x, 0.0);
        assert_eq!(state.camera.position.y, 6.0);
        assert!(state.camera.rotation.abs() < 1e-12);
        let bounds = state.camera.visible_bounds();
        assert!(bounds.contains(0.0, 6.0));
    }

    #[test]
    fn reaching_the_goal_completes_and_advances_the_level() {
        let config = config();
        let mut state = GameState::new(&config).unwrap();
        let mut systems = systems(&config);
        state.start();
        state.goal.angular_speed = 0.0;
        state.player.pos = state.goal.position();
        step(&mut state, &mut systems, 1.0 / 60.0);
        assert_eq!(state.phase, GamePhase::LevelComplete);

        let seed_before = systems[1].noise().seed();
        state.advance(&mut systems);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 1);
        assert_eq!(state.active_system, 1);
        assert_ne!(systems[1].noise().seed(), seed_before);
        assert!(!state.goal.captures(state.player.pos));
        assert!(state.ring().contains(state.player.pos));
    }

    #[test]
    fn advance_wraps_around_the_system_list() {
        let mut config = config();
        config.systems = vec![SystemConfig {
            count: 8,
            ..SystemConfig::default()
        }];
        let mut state = GameState::new(&config).unwrap();
        let mut systems = systems(&config);
        state.phase = GamePhase::LevelComplete;
        state.advance(&mut systems);
        assert_eq!(state.active_system, 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn level_seeds_do_not_accumulate() {
        let config = config();
        let mut state = GameState::new(&config).unwrap();
        let mut systems = systems(&config);
        let mut seeds = Vec::new();
        for _ in 0..4 {
            state.phase = GamePhase::LevelComplete;
            state.advance(&mut systems);
            seeds.push(systems[state.active_system].noise().seed());
        }
        // systems alternate 1, 0, 1, 0 with configured seeds 1 and 0
        assert_eq!(seeds, vec![1 + 1, 2, 1 + 3, 4]);
        assert_eq!(systems[1].base_seed(), 1);
    }

    #[test]
    fn goal_orbits_at_its_radius() {
        let mut goal = Goal::new(&GoalConfig::default(), 0.0);
        for _ in 0..1000 {
            goal.update(0.05);
            assert!((vec2_len(goal.position()) - 6.0).abs() < 1e-9);
            assert!(goal.angle < 2.0 * PI);
        }
    }
}

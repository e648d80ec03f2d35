mod utils;

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod game;
pub mod noise_field;
pub mod particle;
pub mod particle_system;
pub mod renderer;
pub mod webgl_helpers;

use crate::config::GameConfig;
use crate::error::SurferError;
use crate::game::{GamePhase, GameState};
use crate::particle_system::ParticleSystem;
use crate::renderer::Renderer;
use crate::utils::Timer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
    utils::init_logging(log::LevelFilter::Info);
}

#[wasm_bindgen]
pub fn set_log_level(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    utils::init_logging(level);
}

/// Everything the page drives once per animation frame: the game state, the
/// pool of particle systems, and the WebGl renderer that draws the active one.
#[wasm_bindgen]
pub struct ParticleSurfer {
    state: GameState,
    systems: Vec<ParticleSystem>,
    renderer: Renderer,
    max_dt: f64,
}

#[wasm_bindgen]
impl ParticleSurfer {
    /// `config_json` may be `"{}"`; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: &HtmlCanvasElement, config_json: &str) -> Result<ParticleSurfer, JsValue> {
        let config = GameConfig::from_json(config_json)?;
        let systems = config
            .systems
            .iter()
            .map(ParticleSystem::new)
            .collect::<error::Result<Vec<_>>>()?;
        let state = GameState::new(&config)?;
        let renderer = Renderer::new(canvas)?;
        log::info!("particle surfer ready with {} systems", systems.len());
        Ok(ParticleSurfer {
            state,
            systems,
            renderer,
            max_dt: config.max_dt,
        })
    }

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn next_level(&mut self) {
        self.state.advance(&mut self.systems);
    }

    /// 0 = title, 1 = playing, 2 = level complete
    pub fn phase(&self) -> u8 {
        match self.state.phase {
            GamePhase::Title => 0,
            GamePhase::Playing => 1,
            GamePhase::LevelComplete => 2,
        }
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn set_steering(&mut self, x: f64, y: f64) {
        self.state.player.steering = [x, y];
    }

    pub fn set_boost(&mut self, boost: bool) {
        self.state.modifiers.boost = boost;
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.state.modifiers.invert = invert;
    }

    /// `delta` in seconds. Long pauses are clamped so particles never jump.
    pub fn update(&mut self, delta: f64) {
        let _timer = Timer::new("ParticleSurfer::update");
        let dt = delta.max(0.0).min(self.max_dt);
        game::step(&mut self.state, &mut self.systems, dt);
    }

    pub fn render(&self) {
        let _timer = Timer::new("ParticleSurfer::render");
        self.renderer.clear_screen();
        if let Some(system) = self.systems.get(self.state.active_system) {
            self.renderer.draw_points(
                system.positions(),
                system.colors(),
                &self.state.camera,
                renderer::PARTICLE_SIZE,
                renderer::PARTICLE_OPACITY,
            );
        }
        self.renderer.draw_markers(
            self.state.player.pos,
            self.state.goal.position(),
            &self.state.camera,
        );
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = width as f64 / height.max(1) as f64;
        let half_height = (self.state.camera.top - self.state.camera.bottom) / 2.0;
        self.state.camera.left = -half_height * aspect;
        self.state.camera.right = half_height * aspect;
        self.renderer.resize(width, height);
    }

    pub fn reseed(&mut self, seed: u32) {
        if let Some(system) = self.systems.get_mut(self.state.active_system) {
            system.reseed(seed);
        }
    }

    /// Both arguments are JSON arrays of hex strings.
    pub fn set_gradients(&mut self, x_stops_json: &str, y_stops_json: &str) -> Result<(), JsValue> {
        let x_stops: Vec<String> = serde_json::from_str(x_stops_json).map_err(SurferError::from)?;
        let y_stops: Vec<String> = serde_json::from_str(y_stops_json).map_err(SurferError::from)?;
        if let Some(system) = self.systems.get_mut(self.state.active_system) {
            if let Err(err) = system.set_gradients(&x_stops, &y_stops) {
                log::warn!("keeping previous color grid: {}", err);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Paints the active color grid into a 2D canvas, one `cell_size`
    /// square per cell.
    pub fn draw_color_grid(
        &self,
        ctx: &CanvasRenderingContext2d,
        cell_size: u32,
    ) -> Result<(), JsValue> {
        let system = match self.systems.get(self.state.active_system) {
            Some(system) => system,
            None => return Ok(()),
        };
        let (width, height, pixels) = system.color_grid().to_rgba_pixels(cell_size as usize);
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&pixels[..]),
            width as u32,
            height as u32,
        )?;
        ctx.put_image_data(&image, 0.0, 0.0)
    }
}

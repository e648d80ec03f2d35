//! Test suite for the Web and headless browsers.

#![cfg(target_arch = "wasm32")]

extern crate wasm_bindgen_test;
use particle_surfer::config::GameConfig;
use particle_surfer::error::SurferError;
use particle_surfer::particle_system::ParticleSystem;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn default_config_builds_every_system() {
    let config = GameConfig::from_json("{}").unwrap();
    for system in &config.systems {
        let system = ParticleSystem::new(system).unwrap();
        assert_eq!(system.positions().len(), system.len() * 3);
    }
}

#[wasm_bindgen_test]
fn errors_surface_as_js_strings() {
    let err: JsValue = SurferError::EmptyPool.into();
    assert_eq!(
        err.as_string().unwrap(),
        "particle system needs at least one particle"
    );
}

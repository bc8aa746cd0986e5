#![cfg(target_arch = "wasm32")]
//! Browser binding for the lava backdrop.
//!
//! The page owns the animation loop and the actual drawing. Each
//! `requestAnimationFrame` tick it calls [`LavaBackground::frame`] and then
//! pulls the packed instance buffer and per-slot meshes for upload.

mod dom;
mod pack;

use backdrop_core::{Background, BackdropError, BlobInstance};
use instant::Instant;
use js_sys::{Float32Array, Function, Uint32Array};
use pack::InstanceBuffer;
use wasm_bindgen::prelude::*;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("backdrop-web starting");
    Ok(())
}

fn js_error(e: BackdropError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn random_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(e) => {
            log::warn!("getrandom failed ({e}); using a fixed seed");
            0x5eed
        }
    }
}

#[wasm_bindgen]
pub struct LavaBackground {
    inner: Background,
    buffer: InstanceBuffer,
    last_frame: Option<Instant>,
    canvas: Option<web::HtmlCanvasElement>,
}

#[wasm_bindgen]
impl LavaBackground {
    /// `seed` is optional; without it every page load looks different.
    #[wasm_bindgen(constructor)]
    pub fn new(
        mode: &str,
        width: u32,
        height: u32,
        seed: Option<u32>,
    ) -> Result<LavaBackground, JsValue> {
        let seed = seed.map(u64::from).unwrap_or_else(random_seed);
        let inner = Background::new(mode, width, height, seed).map_err(js_error)?;
        Ok(Self {
            inner,
            buffer: InstanceBuffer::default(),
            last_frame: None,
            canvas: None,
        })
    }

    /// Size the backdrop from a canvas, syncing its backing store first.
    pub fn from_canvas(
        canvas: web::HtmlCanvasElement,
        mode: &str,
        seed: Option<u32>,
    ) -> Result<LavaBackground, JsValue> {
        let (w, h) = dom::sync_canvas_backing_size(&canvas);
        let mut bg = Self::new(mode, w, h, seed)?;
        bg.canvas = Some(canvas);
        Ok(bg)
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        self.inner.set_mode(mode).map_err(js_error)
    }

    pub fn mode(&self) -> String {
        self.inner.mode().to_string()
    }

    /// Switch to the next theme; returns its name.
    pub fn cycle_mode(&mut self) -> String {
        self.inner.cycle_mode().to_string()
    }

    pub fn next_mode(&self) -> String {
        self.inner.next_mode().to_string()
    }

    /// Label for the theme button, e.g. "large-slow".
    pub fn next_mode_label(&self) -> String {
        self.inner.next_mode().label().to_string()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.inner.resize(width, height);
    }

    /// Re-read the bound canvas size, e.g. from a window `resize` listener.
    pub fn sync_canvas(&mut self) {
        if let Some(canvas) = &self.canvas {
            let (w, h) = dom::sync_canvas_backing_size(canvas);
            self.inner.resize(w, h);
        }
    }

    /// Advance by the wall time since the previous call. Returns the number
    /// of visible blobs.
    pub fn frame(&mut self) -> u32 {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|prev| now.duration_since(prev))
            .unwrap_or_default();
        self.last_frame = Some(now);
        let stats = self.inner.frame(dt, &mut self.buffer);
        stats.visible as u32
    }

    pub fn instance_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn instance_data(&self) -> Float32Array {
        Float32Array::from(self.buffer.as_floats())
    }

    /// Floats per instance in [`Self::instance_data`].
    pub fn instance_stride() -> usize {
        BlobInstance::FLOATS
    }

    pub fn vertex_positions(&self, slot: usize) -> Option<Float32Array> {
        self.inner
            .meshes()
            .get(slot)
            .map(|m| Float32Array::from(m.positions_flat()))
    }

    pub fn vertex_normals(&self, slot: usize) -> Option<Float32Array> {
        self.inner
            .meshes()
            .get(slot)
            .map(|m| Float32Array::from(m.normals_flat()))
    }

    pub fn indices(&self, slot: usize) -> Option<Uint32Array> {
        self.inner
            .meshes()
            .get(slot)
            .map(|m| Uint32Array::from(m.indices()))
    }

    pub fn lighting_data(&self) -> Float32Array {
        Float32Array::from(&pack::pack_lights(&self.inner.scene_setup().lighting)[..])
    }

    pub fn light_stride() -> usize {
        pack::LIGHT_FLOATS
    }

    pub fn environment_preset(&self) -> String {
        self.inner.scene_setup().environment.preset.name().to_string()
    }

    pub fn environment_blur(&self) -> f32 {
        self.inner.scene_setup().environment.blur
    }

    pub fn material_data(&self) -> Float32Array {
        Float32Array::from(&pack::pack_material(&self.inner.scene_setup().material)[..])
    }

    /// Called once after the first frame has been submitted.
    pub fn on_first_frame(&mut self, callback: Function) {
        self.inner.on_first_frame_rendered(move || {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::warn!("first-frame callback failed: {:?}", e);
            }
        });
    }
}

// Facade-level behaviour: frame loop, mode switching and renderer hand-off.

use backdrop_core::*;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Default)]
struct Recorder {
    begun: usize,
    ended: usize,
    mode: Option<BlobMode>,
    instances: Vec<BlobInstance>,
    vertex_counts: Vec<usize>,
}

impl Renderer for Recorder {
    fn begin_frame(&mut self, setup: &SceneSetup) {
        self.begun += 1;
        self.mode = Some(setup.mode);
        self.instances.clear();
        self.vertex_counts.clear();
    }

    fn submit(&mut self, _slot: usize, instance: &BlobInstance, mesh: &BlobMesh) {
        self.instances.push(*instance);
        self.vertex_counts.push(mesh.positions.len());
    }

    fn end_frame(&mut self) {
        self.ended += 1;
    }
}

fn background(mode: &str) -> Background {
    Background::new(mode, 1280, 720, 17).unwrap()
}

#[test]
fn every_blob_is_submitted_each_frame() {
    let mut bg = background("swarm");
    let mut r = Recorder::default();
    let stats = bg.frame(FRAME, &mut r);
    assert_eq!((r.begun, r.ended), (1, 1));
    assert_eq!(r.mode, Some(BlobMode::Swarm));
    assert_eq!(r.instances.len(), 27);
    assert_eq!(stats.visible, 0);
    assert!(r.instances.iter().all(|i| !i.is_visible()));
    // 48-segment sphere: 49 rows of 49 vertices
    assert!(r.vertex_counts.iter().all(|&n| n == 49 * 49));
}

#[test]
fn blobs_become_visible_after_initial_delay() {
    let mut bg = background("standard");
    let mut r = Recorder::default();
    let mut appeared = 0;
    for _ in 0..30 {
        appeared += bg.frame(FRAME, &mut r).appeared;
    }
    assert_eq!(appeared, 7);
    let stats = bg.frame(FRAME, &mut r);
    assert_eq!(stats.visible, 7);
    assert_eq!(stats.deformed, 7);
    for instance in &r.instances[..7] {
        assert!(instance.is_visible());
        // standard material keeps at most 75% of the blob opacity
        assert!(instance.opacity > 0.0 && instance.opacity <= 0.75);
        assert_eq!(instance.emissive_intensity, 0.0);
    }
}

#[test]
fn first_frame_listener_fires_exactly_once() {
    let mut bg = background("molten");
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    bg.on_first_frame_rendered(move || counter.set(counter.get() + 1));
    assert_eq!(fired.get(), 0);

    let mut r = Recorder::default();
    bg.frame(FRAME, &mut r);
    bg.frame(FRAME, &mut r);
    assert_eq!(fired.get(), 1);

    let late = Rc::clone(&fired);
    bg.on_first_frame_rendered(move || late.set(late.get() + 10));
    assert_eq!(fired.get(), 11);
}

#[test]
fn sweeps_run_on_the_interval() {
    let mut bg = background("leviathan");
    let mut r = Recorder::default();
    let mut sweeps = 0;
    for _ in 0..500 {
        if bg.frame(FRAME, &mut r).sweep.is_some() {
            sweeps += 1;
        }
    }
    // 8 s of frames -> sweeps at 3.5 s and 7 s
    assert_eq!(sweeps, 2);
    assert_eq!(bg.meshes().len(), bg.population().len());
}

#[test]
fn set_mode_rebuilds_scene() {
    let mut bg = background("standard");
    let mut r = Recorder::default();
    bg.frame(FRAME, &mut r);

    bg.set_mode("glowing").unwrap();
    assert_eq!(bg.mode(), BlobMode::Bioluminescent);
    assert_eq!(bg.population().len(), 16);
    assert_eq!(bg.meshes().len(), 16);
    assert_eq!(bg.scene_setup().environment.preset, EnvironmentPreset::Forest);

    bg.frame(FRAME, &mut r);
    assert_eq!(r.mode, Some(BlobMode::Bioluminescent));
    assert_eq!(r.instances.len(), 16);
}

#[test]
fn unknown_mode_is_rejected_without_side_effects() {
    let mut bg = background("swarm");
    assert!(bg.set_mode("disco").is_err());
    assert_eq!(bg.mode(), BlobMode::Swarm);
    assert_eq!(bg.meshes().len(), 27);
    assert!(Background::new("disco", 10, 10, 0).is_err());
}

#[test]
fn resize_updates_spawn_viewport() {
    let mut bg = background("standard");
    let wide = bg.population().viewport();
    bg.resize(720, 1280);
    let tall = bg.population().viewport();
    assert!(wide.width > wide.height);
    assert!(tall.width < tall.height);
    assert!((wide.height - tall.height).abs() < 1e-4);
}

#[test]
fn camera_drifts_slowly() {
    let mut bg = background("calm");
    let start = bg.camera().eye;
    let mut r = Recorder::default();
    for _ in 0..100 {
        bg.frame(FRAME, &mut r);
    }
    let eye = bg.camera().eye;
    assert!((eye.length() - start.length()).abs() < 1e-3);
    assert!(eye.x.abs() > 0.0 && eye.x.abs() < 0.5);
}

#[test]
fn catalog_accepts_names_and_labels() {
    assert_eq!(ModeCatalog::resolve("calm").unwrap().mode, BlobMode::Standard);
    assert_eq!(ModeCatalog::resolve(" Large-Slow ").unwrap().mode, BlobMode::Leviathan);
    assert_eq!(ModeCatalog::resolve("ENERGETIC").unwrap().mode, BlobMode::Molten);
    assert_eq!(ModeCatalog::resolve("bioluminescent").unwrap().mode, BlobMode::Bioluminescent);
    assert_eq!(ModeCatalog::resolve("many-small").unwrap().mode, BlobMode::Swarm);
    assert_eq!(
        ModeCatalog::resolve("nope"),
        Err(BackdropError::UnknownMode("nope".into()))
    );
    for config in ModeCatalog::iter() {
        assert!(config.baseline_count <= config.population_count);
        assert!(config.population_count <= config.pool_capacity);
        assert!(!config.palette.is_empty());
        assert_eq!(config.mode.to_string().parse::<BlobMode>().unwrap(), config.mode);
    }
}

#[test]
fn scene_tables_follow_mode() {
    for mode in BlobMode::ALL {
        let setup = SceneSetup::for_mode(mode);
        assert_eq!(setup.lighting.len(), 3);
        assert_eq!(setup.lighting[0].kind, LightKind::Ambient);
        assert_eq!(setup.lighting[1].kind, LightKind::Directional);
        assert_eq!(setup.lighting[2].kind, LightKind::Point);
    }
    assert_eq!(material_for(BlobMode::Leviathan).opacity_factor, 0.65);
    assert_eq!(material_for(BlobMode::Standard).opacity_factor, 0.75);
    assert_eq!(material_for(BlobMode::Swarm).opacity_factor, 0.8);
    assert_eq!(material_for(BlobMode::Swarm).emissive_intensity, 0.0);
    assert_eq!(environment_for(BlobMode::Standard).blur, 0.35);
    assert_eq!(environment_for(BlobMode::Molten).preset, EnvironmentPreset::Sunset);
    assert_eq!(BlobInstance::FLOATS, 16);
}

#[test]
fn cycle_mode_steps_through_themes_and_wraps() {
    let mut bg = background("standard");
    assert_eq!(bg.next_mode(), BlobMode::Leviathan);
    let mut order = Vec::new();
    for _ in 0..BlobMode::ALL.len() {
        order.push(bg.cycle_mode());
        assert_eq!(bg.population().len(), bg.mode().config().population_count);
        assert_eq!(bg.meshes().len(), bg.population().len());
        assert_eq!(bg.scene_setup().mode, bg.mode());
    }
    assert_eq!(
        order,
        [
            BlobMode::Leviathan,
            BlobMode::Molten,
            BlobMode::Bioluminescent,
            BlobMode::Swarm,
            BlobMode::Standard,
        ]
    );
    assert_eq!(bg.mode(), BlobMode::Standard);
}

#[test]
fn frame_counter_and_composer_track_the_loop() {
    let mut bg = background("glowing");
    let mut r = Recorder::default();
    assert_eq!(bg.frame_count(), 0);
    for _ in 0..3 {
        bg.frame(FRAME, &mut r);
    }
    assert_eq!(bg.frame_count(), 3);
    assert_eq!(bg.elapsed(), FRAME * 3);
    assert_eq!(r.begun, 3);

    let blob = &bg.population().blobs()[0];
    let instance = bg.composer().instance(blob);
    assert_eq!(instance, r.instances[0]);
    assert_eq!(bg.population().visible_count(), 0);
}

// Kinematics, repulsion and morphing over a live population.

use backdrop_core::*;
use glam::Vec3;
use std::time::Duration;

fn sample(position: Vec3, scale: f32) -> InteractionSample {
    InteractionSample {
        position,
        scale,
        eligible: true,
    }
}

#[test]
fn repulsion_at_contact_is_opposite_and_equal() {
    let a = sample(Vec3::new(0.0, 0.0, 0.0), 2.0);
    let b = sample(Vec3::new(1.0, 0.0, 0.0), 2.0);
    let (on_a, squish_a) = repulsion_impulse(&a, &b, 1.0 / 60.0).unwrap();
    let (on_b, squish_b) = repulsion_impulse(&b, &a, 1.0 / 60.0).unwrap();
    assert!(on_a.length() > 0.0);
    assert!(on_a.x < 0.0, "a must be pushed away from b");
    assert!(on_b.x > 0.0, "b must be pushed away from a");
    assert!((on_a + on_b).length() < 1e-6);
    assert!((squish_a - squish_b).abs() < 1e-6);
}

#[test]
fn repulsion_is_zero_at_threshold() {
    let a = sample(Vec3::ZERO, 2.0);
    let b = sample(Vec3::new(0.0, 2.0, 0.0), 2.0);
    assert!(repulsion_impulse(&a, &b, 1.0 / 60.0).is_none());
}

#[test]
fn repulsion_scales_with_frame_time() {
    let a = sample(Vec3::ZERO, 2.0);
    let b = sample(Vec3::new(0.0, 0.0, 1.0), 2.0);
    let (slow, _) = repulsion_impulse(&a, &b, 1.0 / 30.0).unwrap();
    let (fast, _) = repulsion_impulse(&a, &b, 1.0 / 60.0).unwrap();
    assert!((slow.length() - 2.0 * fast.length()).abs() < 1e-5);
}

/// Drives a population the way the facade does, without meshes.
fn run(mode: &str, seconds: u64, mut check: impl FnMut(&PopulationManager)) {
    let camera = Camera::default();
    let mut pop = PopulationManager::new(mode, camera.viewport(), Duration::ZERO, 42).unwrap();
    let motion = MotionIntegrator::new(NoiseField::new(42));
    let frustum = camera.frustum();
    let dt = Duration::from_millis(33);
    let sweep = pop.params().sweep_interval;
    let mut next_sweep = sweep;
    let mut now = Duration::ZERO;
    while now < Duration::from_secs(seconds) {
        now += dt;
        if now >= next_sweep {
            pop.tick_lifecycle(now);
            next_sweep += sweep;
        }
        pop.drain_appearances(now);
        motion.step(&mut pop, &frustum, dt, now);
        check(&pop);
    }
}

#[test]
fn opacity_stays_in_range_and_gated_by_appearance() {
    for mode in BlobMode::ALL {
        run(mode.name(), 20, |pop| {
            for blob in pop.blobs() {
                assert!((0.0..=1.0).contains(&blob.opacity), "{}: {}", blob.id, blob.opacity);
                if !blob.has_appeared {
                    assert_eq!(blob.opacity, 0.0, "{} visible before appearing", blob.id);
                }
                assert!(blob.scale >= 0.01);
            }
            assert!(pop.active_count() <= pop.config().pool_capacity);
        });
    }
}

#[test]
fn appeared_blobs_fade_in_and_grow() {
    let mut last = None;
    run("molten", 4, |pop| last = Some((pop.blobs()[0].opacity, pop.blobs()[0].scale)));
    let (opacity, scale) = last.unwrap();
    assert!(opacity > 0.2);
    assert!(scale > 0.1);
}

#[test]
fn blob_in_view_is_marked_observed() {
    let camera = Camera::default();
    let mut pop = PopulationManager::new("standard", camera.viewport(), Duration::ZERO, 5).unwrap();
    pop.drain_appearances(Duration::from_millis(200));
    pop.blobs_mut()[0].position = Vec3::ZERO;
    pop.blobs_mut()[1].position = Vec3::new(500.0, 0.0, 0.0);
    let motion = MotionIntegrator::new(NoiseField::new(5));
    let now = Duration::from_secs(1);
    motion.step(&mut pop, &camera.frustum(), Duration::from_millis(16), now);
    assert_eq!(pop.blobs()[0].last_active, now);
    assert_eq!(pop.blobs()[1].last_active, Duration::ZERO);
}

#[test]
fn unappeared_blobs_do_not_move() {
    let camera = Camera::default();
    let mut pop = PopulationManager::new("standard", camera.viewport(), Duration::ZERO, 1).unwrap();
    let motion = MotionIntegrator::new(NoiseField::new(1));
    let before: Vec<Vec3> = pop.blobs().iter().map(|b| b.position).collect();
    motion.step(&mut pop, &camera.frustum(), Duration::from_millis(16), Duration::from_millis(16));
    for (blob, p) in pop.blobs().iter().zip(before) {
        assert_eq!(blob.position, p);
    }
}

#[test]
fn deformation_leaves_rest_shape_untouched() {
    let mut cache = MeshCache::default();
    let kind = GeometryKind::Icosahedron { detail: 2 };
    let mut mesh = cache.instantiate(kind);
    let rest: Vec<Vec3> = mesh.rest_positions().to_vec();

    let camera = Camera::default();
    let mut pop = PopulationManager::new("bioluminescent", camera.viewport(), Duration::ZERO, 8).unwrap();
    pop.drain_appearances(Duration::from_millis(200));
    let blob = &mut pop.blobs_mut()[0];
    blob.opacity = 0.5;

    let engine = DeformationEngine::new(NoiseField::new(8));
    assert!(engine.deform(blob, &mut mesh, 3.0));
    assert_eq!(mesh.rest_positions(), &rest[..]);
    assert!(mesh.positions.iter().zip(&rest).any(|(p, r)| (*p - *r).length() > 1e-4));
    for n in mesh.normals.as_ref().unwrap() {
        assert!((n.length() - 1.0).abs() < 1e-3);
    }

    let other = cache.instantiate(kind);
    assert_eq!(other.positions, rest);
}

#[test]
fn hidden_blobs_are_not_deformed() {
    let mut mesh = MeshCache::default().instantiate(GeometryKind::Sphere { segments: 16 });
    let camera = Camera::default();
    let pop = PopulationManager::new("swarm", camera.viewport(), Duration::ZERO, 8).unwrap();
    let engine = DeformationEngine::new(NoiseField::new(8));
    assert!(!engine.deform(&pop.blobs()[0], &mut mesh, 1.0));
    assert_eq!(mesh.positions, mesh.rest_positions());
}

/// Two appeared leviathan blobs overlapping at the centre, everything else
/// out of reach, with drift switched off.
fn overlapping_pair() -> PopulationManager {
    let camera = Camera::default();
    let mut pop = PopulationManager::new("leviathan", camera.viewport(), Duration::ZERO, 12).unwrap();
    assert_eq!(pop.drain_appearances(Duration::from_millis(200)), 3);
    let placements = [
        Vec3::new(-0.5, 0.0, 0.0),
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::new(100.0, 0.0, 0.0),
    ];
    for (blob, p) in pop.blobs_mut().iter_mut().zip(placements) {
        blob.position = p;
        blob.velocity = Vec3::ZERO;
        blob.scale = 2.0;
        blob.speed_factor = 0.0;
    }
    pop
}

#[test]
fn step_pushes_overlapping_blobs_apart_symmetrically() {
    let mut pop = overlapping_pair();
    let camera = Camera::default();
    let motion = MotionIntegrator::new(NoiseField::new(12));
    let dt = 0.016;
    motion.step(&mut pop, &camera.frustum(), Duration::from_millis(16), Duration::from_millis(216));

    let (a, b) = (&pop.blobs()[0], &pop.blobs()[1]);
    assert!(a.velocity.x < 0.0, "left blob must move left");
    assert!(b.velocity.x > 0.0, "right blob must move right");
    assert!((a.velocity + b.velocity).length() < 1e-6);
    assert!(a.velocity.y.abs() < 1e-6 && a.velocity.z.abs() < 1e-6);

    // squish accumulates 0.6 of the impulse strength, then decays for one step
    let strength = 0.5f32.powf(1.8) * 0.08 * dt * 60.0;
    let expected = strength * 0.6 * (1.0 - dt * 0.35 * 1.8);
    assert!((a.repulsion_intensity - expected).abs() < 1e-5);
    assert!((a.repulsion_intensity - b.repulsion_intensity).abs() < 1e-7);
    assert_eq!(pop.blobs()[2].repulsion_intensity, 0.0);
}

#[test]
fn collision_squish_amplifies_morphing() {
    let camera = Camera::default();
    let mut pop = PopulationManager::new("bioluminescent", camera.viewport(), Duration::ZERO, 8).unwrap();
    pop.drain_appearances(Duration::from_millis(200));
    let blob = &mut pop.blobs_mut()[0];
    blob.opacity = 0.5;
    blob.morph_intensity = 0.2;
    blob.repulsion_intensity = 0.0;

    let engine = DeformationEngine::new(NoiseField::new(8));
    let kind = GeometryKind::Icosahedron { detail: 2 };
    let mut cache = MeshCache::default();
    let mut calm = cache.instantiate(kind);
    assert!(engine.deform(blob, &mut calm, 2.0));

    blob.repulsion_intensity = 0.2;
    assert!((DeformationEngine::intensity(blob) - 0.5).abs() < 1e-6);
    let mut squished = cache.instantiate(kind);
    assert!(engine.deform(blob, &mut squished, 2.0));

    // displacement is linear in intensity: 0.5 / 0.2
    let rest = calm.rest_positions();
    for ((c, s), r) in calm.positions.iter().zip(&squished.positions).zip(rest) {
        let expected = (*c - *r) * 2.5;
        assert!((*s - *r - expected).length() < 1e-4);
    }
}

#[test]
fn mesh_without_normals_still_deforms() {
    let camera = Camera::default();
    let mut pop = PopulationManager::new("molten", camera.viewport(), Duration::ZERO, 6).unwrap();
    pop.drain_appearances(Duration::from_millis(200));
    let blob = &mut pop.blobs_mut()[0];
    blob.opacity = 0.5;

    let template = MeshTemplate::build(GeometryKind::Icosahedron { detail: 3 });
    assert_eq!(template.kind(), GeometryKind::Icosahedron { detail: 3 });
    let mut mesh = template.instantiate().without_normals();
    assert!(mesh.normals_flat().is_empty());

    let engine = DeformationEngine::new(NoiseField::new(6));
    assert!(engine.deform(blob, &mut mesh, 1.5));
    assert!(mesh.normals.is_none());
    assert!(mesh
        .positions
        .iter()
        .zip(mesh.rest_positions())
        .any(|(p, r)| (*p - *r).length() > 1e-4));
}

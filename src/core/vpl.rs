// Copyright @yucwang 2026

use crate::core::bsdf::TransportMode;
use crate::core::interaction::SurfaceIntersection;
use crate::core::path::sample_emission_seed;
use crate::core::sampler::QmcSampleStream;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VplKind {
    EmitterSeed,
    SurfaceSeed,
}

/// Virtual point light. `emitter` indexes `Scene::emitters()` and is only
/// set for emitter seeds.
#[derive(Debug, Clone)]
pub struct Vpl {
    pub kind: VplKind,
    pub power: RGBSpectrum,
    pub its: SurfaceIntersection,
    pub emitter: Option<usize>,
}

/// Upper bound of the Russian-roulette survival probability per bounce.
const MAX_SURVIVAL: Float = 0.95;

/// Append VPLs to `vpls` until it holds at least `count` entries, one light
/// path per Halton index starting after `offset`. A path that is already
/// running when the target is reached is finished, so the list may
/// overshoot by the tail of one path. Returns the last index used.
///
/// Path vertex depth counts the emitter as 1; a vertex is recorded only
/// while its depth is at most `max_depth` (-1 is unbounded, 0 records
/// nothing). The powers are not normalized: callers must scale every VPL
/// by `1 / returned index`, see `normalize_vpl_power`.
pub fn generate_vpls_into(scene: &dyn Scene,
                          offset: u64,
                          count: usize,
                          max_depth: i32,
                          vpls: &mut Vec<Vpl>) -> u64 {
    if max_depth == 0 || count == 0 {
        return offset;
    }
    if scene.emitters().is_empty() || scene.total_emitted_power().is_black() {
        warn!("VPL generation skipped: the scene does not emit any power.");
        return offset;
    }

    let target = vpls.len() + count;
    let within_depth = |depth: i32| max_depth < 0 || depth <= max_depth;
    let mut index = offset;
    while vpls.len() < target {
        index += 1;
        let mut stream = QmcSampleStream::new(index);
        let seed = match sample_emission_seed(scene, &mut stream) {
            Some(seed) => seed,
            None => break,
        };

        let n = seed.position.n;
        let its = SurfaceIntersection::new(seed.position.p, n, n, Vector2f::zeros(), 0.0);
        vpls.push(Vpl {
            kind: VplKind::EmitterSeed,
            power: seed.position_weight,
            its,
            emitter: Some(seed.emitter_index),
        });

        let mut weight = seed.power();
        let mut ray = seed.ray();
        let mut depth = 2;
        while !weight.is_black() && within_depth(depth) {
            let its = match scene.ray_intersection(&ray) {
                Some(its) => its,
                None => break,
            };
            let bsdf = match its.material() {
                Some(bsdf) => bsdf,
                None => break,
            };

            let u_bsdf = stream.next_2d();
            let (record, bsdf_weight) = match bsdf.sample(&its.wi(), &u_bsdf, TransportMode::Importance) {
                Some(sample) => sample,
                None => break,
            };

            let survival = bsdf_weight.max_component().min(MAX_SURVIVAL);
            if stream.next_1d() >= survival {
                break;
            }
            weight /= survival;

            vpls.push(Vpl {
                kind: VplKind::SurfaceSeed,
                power: weight,
                its: its.clone(),
                emitter: None,
            });
            weight *= bsdf_weight;

            let wi_world: Vector3f = -ray.dir();
            let wo_world = its.to_world(&record.wo);
            // Shading normals must not let light leak through the geometry.
            let geo_n = its.geo_normal();
            if geo_n.dot(&wi_world) * record.wi.z <= 0.0 || geo_n.dot(&wo_world) * record.wo.z <= 0.0 {
                break;
            }
            ray = its.spawn_ray(&wo_world);
            depth += 1;
        }
    }
    index
}

/// Generate at least `count` VPLs starting after Halton index `offset`.
/// Returns the VPLs in path order and the next index.
pub fn generate_vpls(scene: &dyn Scene, offset: u64, count: usize, max_depth: i32) -> (Vec<Vpl>, u64) {
    let mut vpls = Vec::with_capacity(count);
    let next_index = generate_vpls_into(scene, offset, count, max_depth, &mut vpls);
    (vpls, next_index)
}

/// Scale every VPL by `1 / next_index`.
pub fn normalize_vpl_power(vpls: &mut [Vpl], next_index: u64) {
    if next_index == 0 {
        return;
    }
    let scale = 1.0 / next_index as Float;
    for vpl in vpls.iter_mut() {
        vpl.power *= scale;
    }
}

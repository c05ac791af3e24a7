//! End-to-end tests: text in, settled particle cloud out.
//!
//! Everything here runs without a window or GPU.

use glyphfield::glyph::{ink_bounds, sample_mask, AlphaMask, BitmapFont, GlyphRasterizer};
use glyphfield::prelude::*;
use glyphfield::spawn::seeded_rng;

fn small_layout(step: u32) -> LayoutConfig {
    LayoutConfig {
        font: FontSpec::new("builtin", 400, 64.0),
        canvas_width: 600,
        canvas_height: 300,
        sample_step: step,
        ..Default::default()
    }
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn test_hi_yields_points_and_scales_with_step() {
    let mut sampler = GlyphSampler::new(BitmapFont).with_seed(1);
    let fine = sampler.sample("HI", &small_layout(2)).len();
    let coarse = sampler.sample("HI", &small_layout(4)).len();
    assert!(fine > 0);
    let ratio = fine as f32 / coarse as f32;
    assert!((3.0..=5.0).contains(&ratio), "ratio {}", ratio);
}

#[test]
fn test_xy_geometry_repeats_across_runs() {
    let run = |seed| {
        GlyphSampler::new(BitmapFont)
            .with_seed(seed)
            .sample("HELLO\nWORLD", &small_layout(3))
            .into_iter()
            .map(|p| p.truncate())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(1), run(99));
}

#[test]
fn test_points_are_centered_and_scaled() {
    let layout = small_layout(1);
    let points = GlyphSampler::new(BitmapFont).with_seed(5).sample("O", &layout);
    let min = points.iter().fold(Vec2::splat(f32::MAX), |m, p| m.min(p.truncate()));
    let max = points.iter().fold(Vec2::splat(f32::MIN), |m, p| m.max(p.truncate()));
    // box straddles the origin roughly symmetrically
    assert!((min.x + max.x).abs() <= layout.world_scale * 2.0);
    assert!((min.y + max.y).abs() <= layout.world_scale * 2.0);
    // 'O' is at most 64 px wide at 64 px size
    assert!(max.x - min.x <= 64.0 * layout.world_scale);
}

#[test]
fn test_multiline_stacks_vertically() {
    let layout = small_layout(2);
    let one = BitmapFont.render_text_to_alpha_mask("HI", &layout);
    let two = BitmapFont.render_text_to_alpha_mask("HI\nHI", &layout);
    let b1 = ink_bounds(&one, 1, 40).unwrap();
    let b2 = ink_bounds(&two, 1, 40).unwrap();
    assert_eq!(b1.width(), b2.width());
    assert!(b2.height() > 2.0 * b1.height());
    // the block stays vertically centered, up to one glyph row of the 8x8 cell
    assert!((b2.center().y - 150.0).abs() <= 8.0);
}

#[test]
fn test_clipped_text_loses_pixels_silently() {
    let layout = LayoutConfig {
        canvas_width: 40,
        ..small_layout(1)
    };
    let mask = BitmapFont.render_text_to_alpha_mask("MMMMMMMMM", &layout);
    assert_eq!(mask.width(), 40);
    assert!(mask.count_above(40) > 0);
}

#[test]
fn test_blank_surface_gives_no_targets() {
    let mask = AlphaMask::new(32, 32);
    let mut rng = seeded_rng(Some(1));
    assert!(sample_mask(&mask, &small_layout(1), &mut rng).is_empty());
    assert!(glyphfield::glyph::sample("   ", &small_layout(1)).is_empty());
}

#[test]
fn test_invalid_layout_is_clamped_not_rejected() {
    let layout = LayoutConfig {
        sample_step: 0,
        canvas_width: 0,
        canvas_height: 0,
        line_spacing: 0.2,
        ..small_layout(1)
    };
    let clean = layout.sanitized();
    assert_eq!(clean.sample_step, 1);
    assert_eq!((clean.canvas_width, clean.canvas_height), (1, 1));
    assert_eq!(clean.line_spacing, 1.0);
    // a 1x1 surface has a single pixel to sample
    let points = GlyphSampler::new(BitmapFont).sample("HI", &layout);
    assert!(points.len() <= 1, "{} points from a 1x1 surface", points.len());
    assert!(points.iter().all(|p| p.is_finite()));
}

#[test]
fn test_outline_font_samples_at_em_size() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/Cantarell-Regular.ttf");
    let font = OutlineFont::from_file(path).unwrap();
    let layout = LayoutConfig {
        font: FontSpec::new("Cantarell", 400, 100.0),
        ..small_layout(1)
    };
    let points = GlyphSampler::new(font).with_seed(2).sample("H", &layout);
    assert!(!points.is_empty());

    // 'H' is 0.694 em tall
    let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    let max_y = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    let height_px = (max_y - min_y) / layout.world_scale;
    assert!((height_px - 69.4).abs() <= 3.0, "height {} px", height_px);
}

// ============================================================================
// Simulation
// ============================================================================

#[test]
fn test_text_field_settles_onto_targets() {
    let targets = GlyphSampler::new(BitmapFont).with_seed(3).sample("HI", &small_layout(4));
    let n = targets.len() + 50;
    let config = FieldConfig::default().with_particle_count(n).with_seed(3);
    let mut field = ParticleField::new(config, targets);
    assert_eq!(field.bound_count(), n - 50);

    field.set_jitter_amplitude(0.0);
    for _ in 0..500 {
        field.step(0.01);
    }
    assert!(field.residual() < 1e-3, "residual {}", field.residual());
    for i in 0..field.bound_count() {
        assert_eq!(field.mode(i), Some(ParticleMode::Bound));
    }
    for i in field.bound_count()..n {
        assert_eq!(field.mode(i), Some(ParticleMode::Unbound));
    }
}

#[test]
fn test_idle_particles_keep_moving() {
    let config = FieldConfig::default().with_particle_count(5).with_seed(2);
    let mut field = ParticleField::new(config, Vec::new());
    for _ in 0..100 {
        field.step(0.01);
    }
    let before = field.positions().to_vec();
    field.step(0.01);
    assert!(field.positions().iter().zip(&before).all(|(a, b)| a != b));
}

#[test]
fn test_simulation_headless_matches_manual_loop() {
    let layout = small_layout(4);
    let field_config = FieldConfig::default().with_particle_count(1_000).with_seed(8);

    let sim = Simulation::new()
        .with_text("HI")
        .with_layout(layout.clone())
        .with_field(field_config.clone());
    let headless = sim.run_headless(50);

    let targets = GlyphSampler::new(BitmapFont).with_seed(8).sample("HI", &layout);
    let mut manual = ParticleField::new(field_config, targets);
    for _ in 0..50 {
        manual.step(0.01);
    }
    assert_eq!(headless.positions(), manual.positions());
}

#[test]
fn test_scene_round_trip_drives_same_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");

    let scene = SceneConfig {
        text: "OK".into(),
        layout: small_layout(5),
        field: FieldConfig::default().with_particle_count(300).with_seed(4),
        ..Default::default()
    };
    scene.save(&path).unwrap();

    let a = Simulation::from_scene(scene).run_headless(20);
    let b = Simulation::from_scene(SceneConfig::load(&path).unwrap()).run_headless(20);
    assert_eq!(a.positions(), b.positions());
}

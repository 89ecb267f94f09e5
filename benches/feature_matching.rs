use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use screentrace::features::{cross_check_count, FeatureExtractor, FeatureSettings};

fn screen(seed: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(1280, 720, Rgb([240; 3]));
    let mut state = seed;
    let mut next = move |modulo: u32| {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (state >> 8) % modulo
    };
    for _ in 0..60 {
        let (x, y) = (next(1200), next(660));
        let shade = next(256) as u8;
        draw_filled_rect_mut(
            &mut image,
            Rect::at(x as i32, y as i32).of_size(20 + next(60), 12 + next(40)),
            Rgb([shade, 255 - shade, shade / 2]),
        );
    }
    image
}

fn bench_extraction(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(FeatureSettings::default());
    let frame = screen(42);

    c.bench_function("extract_720p_quarter_scale", |b| {
        b.iter(|| extractor.extract_rgb(black_box(&frame)))
    });
}

fn bench_matching(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(FeatureSettings::default().with_resize_factor(1.0));
    let query = extractor.extract_rgb(&screen(42));
    let train = extractor.extract_rgb(&screen(7));

    c.bench_function("cross_check_full_scale", |b| {
        b.iter(|| cross_check_count(black_box(&query), black_box(&train)))
    });
}

criterion_group!(benches, bench_extraction, bench_matching);
criterion_main!(benches);

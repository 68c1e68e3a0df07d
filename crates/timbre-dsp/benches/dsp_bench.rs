//! Criterion benchmarks for timbre-dsp components
//!
//! Run with: cargo bench -p timbre-dsp

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::f32::consts::PI;
use timbre_dsp::envelope::EnvelopeExtractor;
use timbre_dsp::window::apply_window;
use timbre_dsp::{
    AudioBuffer, Complex32, Direction, DspContext, FormantOptions, JoinOptions, LoudnessRange,
    SpectrogramOptions, WindowCache, analyze_loudness, compute_spectrogram, fft_in_place,
    join_correction, track_formants,
};

const SAMPLE_RATE: u32 = 44100;

/// Pulse-rich test signal, loosely voice-like
fn generate_voice(size: usize) -> Vec<f32> {
    let sr = SAMPLE_RATE as f32;
    (0..size)
        .map(|i| {
            let t = i as f32 / sr;
            (1..30)
                .map(|h| {
                    let f = 130.0 * h as f32;
                    (2.0 * PI * f * t).sin() / h as f32
                })
                .sum::<f32>()
                * 0.2
        })
        .collect()
}

// ============================================================================
// Transform
// ============================================================================

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_Forward");

    for size in [256, 512, 1024, 2048, 4096] {
        let input: Vec<Complex32> = generate_voice(size)
            .into_iter()
            .map(|re| Complex32::new(re, 0.0))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            let mut data = input.clone();
            b.iter(|| {
                data.copy_from_slice(input);
                fft_in_place(black_box(&mut data), Direction::Forward).unwrap();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Analysis
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("Envelope");
    let mut windows = WindowCache::new();

    for size in [1024, 2048] {
        let mut frame = Vec::new();
        apply_window(&generate_voice(size), &windows.hann(size), &mut frame);
        let mut extractor = EnvelopeExtractor::new(size, 44).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            b.iter(|| extractor.extract(black_box(frame)).unwrap());
        });
    }

    group.finish();
}

fn bench_formants(c: &mut Criterion) {
    let mut group = c.benchmark_group("Formants");
    group.sample_size(20);

    for seconds in [1usize, 3] {
        let samples = generate_voice(SAMPLE_RATE as usize * seconds);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{seconds}s")),
            &samples,
            |b, samples| {
                b.iter(|| {
                    track_formants(black_box(samples), SAMPLE_RATE, &FormantOptions::default())
                });
            },
        );
    }

    group.finish();
}

fn bench_spectrogram(c: &mut Criterion) {
    let samples = generate_voice(SAMPLE_RATE as usize * 2);
    let options = SpectrogramOptions::default();
    let mut windows = WindowCache::new();

    c.bench_function("Spectrogram_2s", |b| {
        b.iter(|| compute_spectrogram(black_box(&samples), SAMPLE_RATE, &options, &mut windows));
    });
}

fn bench_loudness(c: &mut Criterion) {
    let a = AudioBuffer::mono(generate_voice(SAMPLE_RATE as usize * 5), SAMPLE_RATE);
    let b = AudioBuffer::mono(generate_voice(SAMPLE_RATE as usize * 5), SAMPLE_RATE);

    c.bench_function("Loudness_5s", |bench| {
        bench.iter(|| analyze_loudness(black_box(&a), &LoudnessRange::full()));
    });

    c.bench_function("JoinCorrection", |bench| {
        bench.iter(|| join_correction(black_box(&a), black_box(&b), &JoinOptions::default()));
    });

    let mut ctx = DspContext::default();
    c.bench_function("JoinCorrection_Cached", |bench| {
        bench.iter(|| ctx.join_correction(black_box(&a), black_box(&b), &JoinOptions::default()));
    });
}

criterion_group!(
    benches,
    bench_fft,
    bench_envelope,
    bench_formants,
    bench_spectrogram,
    bench_loudness
);
criterion_main!(benches);

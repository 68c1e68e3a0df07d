//! Integration tests for timbre-dsp.
//!
//! Exercises the public API end to end with synthetic signals whose
//! spectra and levels are known in advance.

use std::f32::consts::PI;

use timbre_dsp::cache::LruCache;
use timbre_dsp::envelope::EnvelopeExtractor;
use timbre_dsp::loudness::analyze_samples;
use timbre_dsp::transform::fft_split;
use timbre_dsp::window::apply_window;
use timbre_dsp::{
    AudioBuffer, Band, Complex32, Direction, DspContext, Error, FormantOptions, JoinOptions,
    LoudnessRange, NormalizationOptions, SpectrogramOptions, WindowCache, fft_in_place,
    find_peaks, join_correction, normalization_gain, normalization_gain_db, track_formants,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a sine wave at a given frequency and amplitude.
fn sine(freq_hz: f32, sample_rate: f32, num_samples: usize, amplitude: f32) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
        .collect()
}

/// Triangular bump of height 1 centred on `center`.
fn triangle(len: usize, center: usize, half_width: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let d = (i as f32 - center as f32).abs();
            (1.0 - d / half_width as f32).max(0.0)
        })
        .collect()
}

// ===========================================================================
// 1. Transform
// ===========================================================================

#[test]
fn forward_inverse_round_trip() {
    let original: Vec<Complex32> = (0..256)
        .map(|i| Complex32::new((i as f32 * 0.37).sin(), (i as f32 * 0.11).cos()))
        .collect();
    let mut data = original.clone();
    fft_in_place(&mut data, Direction::Forward).unwrap();
    fft_in_place(&mut data, Direction::Inverse).unwrap();
    for (a, b) in data.iter().zip(&original) {
        assert!((a - b).norm() < 1e-4, "{a} != {b}");
    }
}

#[test]
fn impulse_has_flat_spectrum() {
    let mut real = vec![0.0f32; 64];
    let mut imag = vec![0.0f32; 64];
    real[0] = 1.0;
    fft_split(&mut real, &mut imag, Direction::Forward).unwrap();
    for (re, im) in real.iter().zip(&imag) {
        let mag = (re * re + im * im).sqrt();
        assert!((mag - 1.0).abs() < 1e-6);
    }
}

#[test]
fn non_power_of_two_is_an_error() {
    let mut data = vec![Complex32::new(0.0, 0.0); 100];
    assert_eq!(
        fft_in_place(&mut data, Direction::Forward),
        Err(Error::NonPowerOfTwo { len: 100 })
    );
}

// ===========================================================================
// 2. Envelope and peaks
// ===========================================================================

#[test]
fn envelope_peak_tracks_sine_frequency() {
    let sample_rate = 16000.0;
    let fft_size = 1024;
    let bin = 100;
    let freq = bin as f32 * sample_rate / fft_size as f32;
    let signal = sine(freq, sample_rate, fft_size, 0.8);

    let mut windows = WindowCache::new();
    let window = windows.hann(fft_size);
    let mut frame = Vec::new();
    apply_window(&signal, &window, &mut frame);

    let mut extractor = EnvelopeExtractor::new(fft_size, 30).unwrap();
    let envelope = extractor.extract(&frame).unwrap();
    let peak = envelope.max_bin().unwrap();
    assert!(peak.abs_diff(bin) <= 1, "peak bin {peak}, expected {bin}");
}

#[test]
fn triangular_bump_gives_single_peak() {
    let envelope = triangle(129, 50, 8);
    let peaks = find_peaks(&envelope, 12800.0, 256, Band::new(0.0, 6000.0));
    assert_eq!(peaks.len(), 1);
    assert!((peaks[0].bin - 50.0).abs() < 0.1);
    assert!((peaks[0].frequency_hz - 2500.0).abs() < 5.0);
}

// ===========================================================================
// 3. Formants and spectrogram
// ===========================================================================

#[test]
fn silent_buffer_yields_zero_formants() {
    let samples = vec![0.0f32; 16000];
    let analysis = track_formants(&samples, 16000, &FormantOptions::default()).unwrap();

    // hop is 160 at 16 kHz
    assert_eq!(analysis.frames.len(), (16000 - 2048) / 160 + 1);
    for frame in &analysis.frames {
        assert_eq!((frame.f1, frame.f2, frame.f3), (0.0, 0.0, 0.0));
        assert_eq!(
            (frame.f1_confidence, frame.f2_confidence, frame.f3_confidence),
            (0.0, 0.0, 0.0)
        );
    }
}

#[test]
fn short_buffer_is_insufficient_data() {
    let samples = vec![0.1f32; 1000];
    let result = track_formants(&samples, 16000, &FormantOptions::default());
    assert!(matches!(result, Err(Error::InsufficientData { .. })));
}

#[test]
fn spectrogram_peak_follows_tone() {
    let mut ctx = DspContext::default();
    let samples = sine(1000.0, 16000.0, 16000, 0.5);
    let spec = ctx
        .spectrogram(&samples, 16000, &SpectrogramOptions::default())
        .unwrap();

    assert_eq!(spec.num_frames, spec.data.len());
    let bin_width = 16000.0 / 2048.0;
    for frame in 0..spec.num_frames {
        let peak = spec.peak_frequency(frame).unwrap();
        assert!((peak - 1000.0).abs() <= bin_width, "frame {frame}: {peak} Hz");
    }
    assert!(spec.data.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
}

// ===========================================================================
// 4. Loudness and gain
// ===========================================================================

#[test]
fn silence_measures_as_silent() {
    let buffer = AudioBuffer::mono(vec![0.0; 4800], 48000);
    let analysis = timbre_dsp::analyze_loudness(&buffer, &LoudnessRange::full());
    assert_eq!(analysis.rms, 0.0);
    assert_eq!(analysis.rms_db, f32::NEG_INFINITY);
    assert!(!analysis.has_content);
    assert_eq!(normalization_gain(&analysis, &NormalizationOptions::default()), 1.0);
}

#[test]
fn full_scale_sine_levels() {
    // 48 whole cycles
    let analysis = analyze_samples(&sine(1000.0, 48000.0, 48000, 1.0));
    assert!((analysis.rms_db + 3.01).abs() < 0.02, "rms_db {}", analysis.rms_db);
    assert!((analysis.crest_factor - 2f32.sqrt()).abs() < 0.01);
}

#[test]
fn quiet_input_gain_hits_ceiling() {
    let amplitude = 10f32.powf(-30.0 / 20.0) * 2f32.sqrt();
    let analysis = analyze_samples(&sine(1000.0, 48000.0, 48000, amplitude));
    assert!((analysis.rms_db + 30.0).abs() < 0.05);

    let gain_db = normalization_gain_db(&analysis, &NormalizationOptions::default());
    assert!((gain_db - 12.0).abs() < 1e-4, "gain {gain_db}");
}

// ===========================================================================
// 5. Join correction
// ===========================================================================

#[test]
fn equal_levels_need_no_correction() {
    let a = AudioBuffer::mono(sine(440.0, 48000.0, 48000, 0.3), 48000);
    let b = AudioBuffer::mono(sine(440.0, 48000.0, 48000, 0.3), 48000);
    let correction = join_correction(&a, &b, &JoinOptions::default());
    assert!((correction.gain_a - 1.0).abs() < 1e-3);
    assert!((correction.gain_b - 1.0).abs() < 1e-3);
    assert!(correction.rms_diff_db.abs() < 0.05);
}

#[test]
fn twenty_db_gap_is_clamped_then_split() {
    let a = AudioBuffer::mono(vec![0.5; 48000], 48000);
    let b = AudioBuffer::mono(vec![0.05; 48000], 48000);
    let correction = join_correction(&a, &b, &JoinOptions::default());

    assert!((correction.rms_diff_db + 20.0).abs() < 0.01);
    assert!((correction.applied_correction_db + 6.0).abs() < 1e-4);
    // A down 3 dB, B up 3 dB
    assert!((20.0 * correction.gain_a.log10() + 3.0).abs() < 1e-3);
    assert!((20.0 * correction.gain_b.log10() - 3.0).abs() < 1e-3);
}

// ===========================================================================
// 6. Caches
// ===========================================================================

#[test]
fn lru_evicts_least_recently_used() {
    let mut cache = LruCache::new(3);
    for k in ["a", "b", "c"] {
        cache.insert(k, ());
    }
    let evicted = cache.insert("d", ());
    assert_eq!(evicted.map(|(k, _)| k), Some("a"));
}

#[test]
fn lru_get_protects_entry() {
    let mut cache = LruCache::new(3);
    for k in ["a", "b", "c"] {
        cache.insert(k, ());
    }
    assert!(cache.get("a").is_some());
    let evicted = cache.insert("d", ());
    assert_eq!(evicted.map(|(k, _)| k), Some("b"));
    assert!(cache.contains_key("a"));
    assert_eq!(cache.len(), 3);
}

#[test]
fn processed_buffer_reused_across_calls() {
    let mut ctx = DspContext::default();
    let source = AudioBuffer::mono(sine(220.0, 48000.0, 4800, 0.5), 48000);
    let params = timbre_dsp::ProcessingParams {
        pitch_semitones: 2.0,
        ..Default::default()
    };

    let mut calls = 0;
    for _ in 0..3 {
        let out = ctx
            .process_cached(&source, &params, |s, _| {
                calls += 1;
                Ok::<_, Error>(s.clone())
            })
            .unwrap();
        assert_eq!(out.len(), 4800);
    }
    assert_eq!(calls, 1);
}

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emg_analytics::config::{AnalysisConfig, ConditioningConfig, DetectionConfig, FeatureConfig};
use emg_analytics::processing::conditioning::SignalConditioner;
use emg_analytics::processing::detection::ContractionDetector;
use emg_analytics::processing::features::SpectralAnalyzer;
use emg_analytics::processing::filters::{BandType, IirFilter};
use emg_analytics::session::{SessionAggregator, SessionInput};
use emg_analytics::types::EmgChannel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLE_RATES: &[u32] = &[1000, 2000, 4000];
const CHANNEL_COUNTS: &[usize] = &[1, 2, 4, 8];
const DURATION_S: f64 = 30.0;

fn synthetic_emg(seed: u64, fs: f64, seconds: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = (fs * seconds) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / fs;
            // 3 s contraction every 5 s
            let gain = if t % 5.0 >= 1.0 && t % 5.0 < 4.0 { 1.0 } else { 0.02 };
            gain * rng.gen_range(-1.0..1.0)
        })
        .collect()
}

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    for &rate in SAMPLE_RATES {
        let fs = rate as f64;
        let signal = synthetic_emg(1, fs, DURATION_S);
        group.throughput(Throughput::Elements(signal.len() as u64));

        group.bench_with_input(BenchmarkId::new("butterworth_filtfilt", rate), &signal, |b, signal| {
            let filter = IirFilter::butterworth(4, 20.0, fs, BandType::Highpass).unwrap();
            b.iter(|| filter.filtfilt(black_box(signal)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("conditioning", rate), &signal, |b, signal| {
            let conditioner = SignalConditioner::new(&ConditioningConfig::default(), fs).unwrap();
            b.iter(|| conditioner.condition(black_box(signal)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");

    for &rate in SAMPLE_RATES {
        let fs = rate as f64;
        let raw = synthetic_emg(2, fs, DURATION_S);
        let envelope = SignalConditioner::new(&ConditioningConfig::default(), fs)
            .unwrap()
            .condition(&raw)
            .unwrap()
            .envelope;
        let detector = ContractionDetector::new(&DetectionConfig::default(), fs);

        group.throughput(Throughput::Elements(envelope.len() as u64));
        group.bench_with_input(BenchmarkId::new("detect", rate), &envelope, |b, envelope| {
            b.iter(|| detector.detect(black_box(envelope), 0.5));
        });
    }

    group.finish();
}

fn benchmark_spectral(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral");

    for &segment in &[128usize, 256, 512, 1024] {
        let config = FeatureConfig {
            welch_segment_samples: segment,
            ..Default::default()
        };
        let analyzer = SpectralAnalyzer::new(&config, 2000.0);
        let signal = synthetic_emg(3, 2000.0, 10.0);

        group.bench_with_input(BenchmarkId::new("welch", segment), &signal, |b, signal| {
            b.iter(|| analyzer.band_spectrum(black_box(signal)));
        });
    }

    group.finish();
}

fn benchmark_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.sample_size(10);

    for &channels in CHANNEL_COUNTS {
        let input = SessionInput::new(
            (0..channels)
                .map(|ch| EmgChannel::new(format!("CH{}", ch + 1), synthetic_emg(ch as u64, 2000.0, DURATION_S), 2000.0))
                .collect(),
        );
        let aggregator = SessionAggregator::new(AnalysisConfig::default());

        group.bench_with_input(BenchmarkId::new("analyze", channels), &input, |b, input| {
            b.iter(|| aggregator.analyze(black_box(input)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_filters,
    benchmark_detection,
    benchmark_spectral,
    benchmark_session
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vacuum_gauge_core::{
    presets, AnalogSample, CalibrationPoint, CalibrationTable, CrossoverState, GaugeProfile,
    GaugeType, Interpolation, PressureUnit, RawSample, ReadingPipeline, ReadingSettings,
    Segment, SignalDecoder, TransferFunction,
};

fn analog(volts: f64) -> RawSample {
    RawSample::Analog(AnalogSample::new(volts, 0))
}

fn bench_single_element(c: &mut Criterion) {
    let profile = presets::pirani_log().unwrap();
    let decoder = SignalDecoder::new(&profile, None);
    let sample = analog(5.0);

    c.bench_function("decode_pirani_log", |b| {
        b.iter(|| {
            let mut state = CrossoverState::default();
            black_box(decoder.decode(black_box(&sample), &mut state))
        });
    });
}

fn bench_piecewise_lookup(c: &mut Criterion) {
    let points: Vec<_> = (0..32)
        .map(|i| CalibrationPoint::new(i as f64 * 0.25, 10f64.powf(i as f64 * 0.2 - 4.0)))
        .collect();
    let table = CalibrationTable::new(&points, Interpolation::LogPressure).unwrap();
    let tf = TransferFunction::new(&[
        Segment::linear(-1.0, 0.0, 1e-4, 1e-4),
        Segment::lookup(0.0, 7.75, table),
    ])
    .unwrap();
    let profile = GaugeProfile::builder("table", GaugeType::Pirani)
        .transfer(tf)
        .build()
        .unwrap();
    let decoder = SignalDecoder::new(&profile, None);
    let sample = analog(4.3);

    c.bench_function("decode_calibration_table", |b| {
        b.iter(|| {
            let mut state = CrossoverState::default();
            black_box(decoder.decode(black_box(&sample), &mut state))
        });
    });
}

fn bench_combination_pipeline(c: &mut Criterion) {
    let settings = ReadingSettings::new(presets::combination().unwrap(), PressureUnit::Torr, 1.0);
    let mut crossover = CrossoverState::default();
    let sample = RawSample::Analog(AnalogSample::dual(3.0, 4.0, 0));

    c.bench_function("pipeline_combination", |b| {
        b.iter(|| {
            let mut pipeline = ReadingPipeline::new(&settings, None, &mut crossover);
            let _ = pipeline.acquisition_request();
            black_box(pipeline.finish(Ok(sample.clone())))
        });
    });
}

criterion_group!(
    benches,
    bench_single_element,
    bench_piecewise_lookup,
    bench_combination_pipeline
);
criterion_main!(benches);

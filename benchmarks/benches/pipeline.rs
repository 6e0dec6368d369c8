use benchmarks::SurveyGenerator;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use waterpoint_features::{FeaturePipeline, PipelineConfig};

fn bench_standard_pipeline(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let pipeline = match FeaturePipeline::standard(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => panic!("default config rejected: {}", e),
    };

    let mut group = c.benchmark_group("standard_pipeline");
    group.sample_size(20);
    for size in [1_000usize, 10_000] {
        let survey = SurveyGenerator::new(1)
            .survey(size, size / 4)
            .expect("synthetic survey");
        group.bench_with_input(BenchmarkId::from_parameter(size), &survey, |b, survey| {
            b.iter_batched(
                || (survey.training.clone(), survey.evaluation.clone()),
                |(training, evaluation)| black_box(pipeline.run(training, evaluation)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_with_label_steps(c: &mut Criterion) {
    let config = PipelineConfig::default()
        .with_projection_columns(["longitude", "latitude", "gps_height", "population"]);
    let survey = SurveyGenerator::new(2).survey(5_000, 1_250).expect("synthetic survey");
    let pipeline = FeaturePipeline::standard(&config)
        .expect("valid config")
        .with_label_steps(&config, &survey.labels)
        .expect("valid config");

    c.bench_function("pipeline_with_label_steps_5000", |b| {
        b.iter_batched(
            || (survey.training.clone(), survey.evaluation.clone()),
            |(training, evaluation)| black_box(pipeline.run(training, evaluation)),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_standard_pipeline, bench_with_label_steps);
criterion_main!(benches);

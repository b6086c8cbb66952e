use criterion::{black_box, criterion_group, criterion_main, Criterion};
use taxwelfare::wages::{LogNormalWages, WageSampler};
use taxwelfare::{CobbDouglasUtility, TaxLottery, TaxSearchOptions, UncertaintyAnalysis};

fn bench_eu_max(c: &mut Criterion) {
    let analysis = UncertaintyAnalysis::new(CobbDouglasUtility::new(0.5, 0.5).unwrap());
    let lottery = TaxLottery::symmetric(0.3, 0.1);
    c.bench_function("labor_supply_eu_max_241", |b| {
        b.iter(|| {
            analysis
                .labor_supply_eu_max(black_box(20.0), &lottery, 50.0, 24.0, 241)
                .unwrap()
        })
    });
}

fn bench_optimal_tax(c: &mut Criterion) {
    let analysis = UncertaintyAnalysis::new(CobbDouglasUtility::new(0.5, 0.5).unwrap());
    let wages = LogNormalWages::standard(42)
        .unwrap()
        .sample_wages(200)
        .unwrap();
    let search = TaxSearchOptions::new(0.05, 0.6, 12);

    let mut group = c.benchmark_group("optimal_tax_rate");
    group.sample_size(10);
    group.bench_function("certain", |b| {
        b.iter(|| analysis.optimal_tax_rate(black_box(&wages), 0.0, &search).unwrap())
    });
    group.bench_function("uncertain", |b| {
        b.iter(|| analysis.optimal_tax_rate(black_box(&wages), 0.1, &search).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_eu_max, bench_optimal_tax);
criterion_main!(benches);

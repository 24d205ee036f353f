//! Feature transform throughput

use claim_data::{ClaimBatch, ClaimRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{ClaimFeatureEngineer, ExperienceImputation, FeatureConfig, Transformer};

fn batch(n: usize) -> ClaimBatch {
    let records = (0..n)
        .map(|i| ClaimRecord {
            billed_amount: Some(100.0 + i as f64),
            length_of_stay: if i % 3 == 0 { None } else { Some((i % 9) as f64) },
            age: Some((i % 100) as f64),
            insurance_type: Some(if i % 2 == 0 { "Medicaid" } else { "Private" }.to_string()),
            visit_type: Some("Inpatient".to_string()),
            department: Some("Cardiology".to_string()),
            admission_type: None,
            diagnosis_code: if i % 5 == 0 { None } else { Some("E11.9".to_string()) },
            years_experience: if i % 4 == 0 { None } else { Some((i % 30) as f64) },
            readmitted_flag: Some(if i % 7 == 0 { "Yes" } else { "No" }.to_string()),
            ..Default::default()
        })
        .collect();
    ClaimBatch::new(records)
}

fn bench_transform(c: &mut Criterion) {
    let engineer = ClaimFeatureEngineer::new(FeatureConfig {
        high_risk_insurance: ["Medicaid".to_string()].into_iter().collect(),
        final_features: [
            "billed_amount",
            "length_of_stay",
            "insurance_type",
            "long_stay_flag",
            "age_bucket",
            "readmitted_flag",
            "high_risk_insurance_flag",
            "has_diagnosis",
            "low_experience_provider",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        years_experience_imputation: ExperienceImputation::BatchMedian,
        years_experience_median: None,
        validation: Default::default(),
    })
    .expect("valid config");

    let single = batch(1);
    let large = batch(10_000);

    c.bench_function("transform_single_claim", |b| {
        b.iter(|| engineer.transform(black_box(&single)))
    });
    c.bench_function("transform_10k_claims", |b| {
        b.iter(|| engineer.transform(black_box(&large)))
    });
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);

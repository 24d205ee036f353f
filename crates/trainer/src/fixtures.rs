//! Synthetic raw tables and configuration for tests

use app_config::{AppConfig, DataConfig, FeaturesConfig, LoggingConfig, ModelConfig, PathsConfig, ServerConfig};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn config(root: &Path) -> AppConfig {
    let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    AppConfig {
        paths: PathsConfig {
            raw_data: root.join("raw"),
            processed_data: root.join("processed"),
            model_dir: root.join("models"),
            new_data_dir: root.join("incoming"),
            output_dir: root.join("scored"),
        },
        data: DataConfig::default(),
        features: FeaturesConfig {
            numeric_features: strings(&[
                "billed_amount",
                "length_of_stay",
                "years_experience",
                "long_stay_flag",
                "readmitted_flag",
                "high_risk_insurance_flag",
                "has_diagnosis",
                "low_experience_provider",
            ]),
            categorical_features: strings(&["insurance_type", "visit_type", "department", "age_bucket"]),
            high_risk_insurance: strings(&["Medicaid", "Self-Pay"]),
            final_features: strings(&[
                "billed_amount",
                "length_of_stay",
                "years_experience",
                "insurance_type",
                "visit_type",
                "department",
                "long_stay_flag",
                "age_bucket",
                "readmitted_flag",
                "high_risk_insurance_flag",
                "has_diagnosis",
                "low_experience_provider",
            ]),
            years_experience_imputation: Default::default(),
            years_experience_median: None,
        },
        validation: Default::default(),
        model: ModelConfig::default(),
        server: ServerConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// Write the five raw tables with `claims` claims; every third is denied
/// and denied claims are Medicaid, readmitted and expensive
pub fn write_raw_tables(dir: &Path, claims: usize) {
    fs::create_dir_all(dir).unwrap();

    let mut claims_csv = String::from("claim_id,patient_id,encounter_id,provider_id,billed_amount,diagnosis_code\n");
    let mut denials_csv = String::from("denial_id,claim_id,denial_reason\n");
    let mut patients_csv = String::from("patient_id,age,insurance_type\n");
    let mut encounters_csv =
        String::from("encounter_id,visit_type,department,admission_type,length_of_stay,readmitted_flag\n");
    let mut providers_csv = String::from("provider_id,department,years_experience\n");

    for i in 0..claims {
        let denied = i % 3 == 0;
        let amount = if denied { 8000 + i * 10 } else { 900 + i * 10 };
        let diagnosis = if i % 5 == 0 { "" } else { "I10" };
        writeln!(claims_csv, "C{i},P{i},E{i},D{},{amount},{diagnosis}", i % 4).unwrap();
        if denied {
            writeln!(denials_csv, "X{i},C{i},coding").unwrap();
        }

        let insurance = if denied { "Medicaid" } else if i % 2 == 0 { "Private" } else { "Medicare" };
        writeln!(patients_csv, "P{i},{},{insurance}", 20 + (i * 7) % 70).unwrap();

        let visit = if i % 2 == 0 { "Inpatient" } else { "Outpatient" };
        let stay = if i % 2 == 0 { (i % 9).to_string() } else { String::new() };
        let readmitted = if denied { "Yes" } else { "No" };
        writeln!(
            encounters_csv,
            "E{i},{visit},Cardiology,Elective,{stay},{readmitted}"
        )
        .unwrap();
    }
    for d in 0..4 {
        let years = if d == 3 { String::new() } else { (2 + d * 6).to_string() };
        writeln!(providers_csv, "D{d},Oncology,{years}").unwrap();
    }

    fs::write(dir.join("claims_and_billing.csv"), claims_csv).unwrap();
    fs::write(dir.join("denials.csv"), denials_csv).unwrap();
    fs::write(dir.join("patients.csv"), patients_csv).unwrap();
    fs::write(dir.join("encounters.csv"), encounters_csv).unwrap();
    fs::write(dir.join("providers.csv"), providers_csv).unwrap();
}

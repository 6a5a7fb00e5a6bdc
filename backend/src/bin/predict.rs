//! Classifies a single OCT scan from the command line.
//!
//! Usage: `octlens-predict <image>`

use octlens::build_pipeline;
use octlens::config::AppConfig;
use shared::{DiseaseClass, PREDICTION_FAILED_MESSAGE};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let Some(image_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: octlens-predict <image>");
        return ExitCode::from(2);
    };

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let pipeline = build_pipeline(&config);
    let index = pipeline.model_prediction(&image_path);
    match DiseaseClass::from_index(i64::from(index)) {
        Some(class) => {
            println!("Prediction: {} ({})", class, class.full_name());
            let caption = class.caption();
            println!("{} {}", caption.lead, caption.emphasis);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{}", PREDICTION_FAILED_MESSAGE);
            ExitCode::FAILURE
        }
    }
}

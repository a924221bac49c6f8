use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use seascan_core::{
    ScanConfig, ScanRecord, Scanner, SuppressionMode, Upload,
    consts::MODEL_PATH_ENV_NAME,
    inference::yolov8::{DetectorConfig, decode_image, save_annotated},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scan")]
#[command(about = "Detect objects in geotagged images")]
struct Args {
    #[arg(required = true, help = "Input image file paths")]
    inputs: Vec<PathBuf>,

    #[arg(short, long, help = "ONNX model path (falls back to $SEASCAN_MODEL)")]
    model: Option<PathBuf>,

    #[arg(short, long, help = "Detector config JSON file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Override the confidence floor")]
    confidence: Option<f32>,

    #[arg(long, help = "Override the NMS IoU threshold")]
    iou: Option<f32>,

    #[arg(long, help = "Only suppress overlapping boxes of the same class")]
    per_class: bool,

    #[arg(long, help = "Fail images that carry no GPS geotag")]
    require_geolocation: bool,

    #[arg(short, long, help = "Directory for images with detections drawn")]
    annotate_dir: Option<PathBuf>,
}

impl Args {
    fn model_path(&self) -> anyhow::Result<PathBuf> {
        match &self.model {
            Some(path) => Ok(path.clone()),
            None => std::env::var(MODEL_PATH_ENV_NAME)
                .map(PathBuf::from)
                .with_context(|| {
                    format!("no --model given and ${} is not set", MODEL_PATH_ENV_NAME)
                }),
        }
    }

    fn detector_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_json_file(path)?,
            None => DetectorConfig::default(),
        };

        if let Some(confidence) = self.confidence {
            config.confidence_floor = confidence;
        }
        if let Some(iou) = self.iou {
            config.iou_threshold = iou;
        }
        if self.per_class {
            config.suppression = SuppressionMode::PerClass;
        }
        config.validate()?;

        Ok(config)
    }
}

fn annotated_path(output_dir: &Path, upload: &Upload, record: &ScanRecord) -> PathBuf {
    let stem = Path::new(&upload.filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| record.id.clone());

    output_dir.join(format!("{}.annotated.png", stem))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let model_path = args.model_path()?;
    let detector_config = args.detector_config()?;
    info!("Model: {}", model_path.display());
    info!(
        "Confidence floor: {}, IoU threshold: {}",
        detector_config.confidence_floor, detector_config.iou_threshold
    );

    let scanner = Scanner::from_model_file(
        &model_path,
        detector_config,
        ScanConfig {
            require_geolocation: args.require_geolocation,
        },
    )?;

    let mut uploads = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        uploads.push(Upload::from_path(path).await?);
    }

    let results = scanner.scan_all(&uploads).await;

    let mut failures = 0;
    for (upload, result) in uploads.iter().zip(results) {
        match result {
            Ok(record) => {
                for (label, count) in record.count_by_label() {
                    info!("{}: {} x {}", record.filename, label, count);
                }
                println!("{}", serde_json::to_string(&record)?);

                if let Some(output_dir) = &args.annotate_dir {
                    let output_path = annotated_path(output_dir, upload, &record);
                    let image = decode_image(&upload.bytes)?;
                    save_annotated(&image, &record.detections, &output_path)?;
                    info!("Saved annotated image to: {}", output_path.display());
                }
            }
            Err(err) => {
                error!("{}: {}", upload.filename, err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, uploads.len());
    }

    info!("Scan completed successfully!");
    Ok(())
}

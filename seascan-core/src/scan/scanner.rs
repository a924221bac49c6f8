use std::{path::Path, sync::Arc};

use bytes::Bytes;
use futures::future;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tokio::{sync::Mutex, task};
use tracing::*;

use crate::{
    detection::record::ScanRecord,
    error::*,
    geo::{
        dms::{GeoCoordinate, normalize},
        exif::read_gps_tags,
    },
    inference::{
        model::Backend,
        yolov8::{DetectorConfig, OrtBackend, YoloSession, Yolov8},
    },
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Fail the scan instead of recording a missing or unusable geotag as
    /// `None`. Detection results are kept either way when this is off.
    pub require_geolocation: bool,
}

/// An uploaded image and the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeascanError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.context(IoReadSnafu {
            path: path.to_string_lossy(),
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self::new(filename, bytes))
    }
}

/// Turns uploads into [`ScanRecord`]s.
///
/// Owns the detection session; the session is created once and shared by
/// every scan, with inference calls serialized through its lock.
pub struct Scanner<B = OrtBackend> {
    detector: Arc<Mutex<YoloSession<B>>>,
    config: ScanConfig,
}

impl Scanner<OrtBackend> {
    pub fn from_model_file<P: AsRef<Path>>(
        path: P,
        detector_config: DetectorConfig,
        config: ScanConfig,
    ) -> Result<Self, SeascanError> {
        let session = YoloSession::from_model_file(path, detector_config)?;

        Ok(Self::new(session, config))
    }
}

impl<B> Scanner<B>
where
    B: Backend<Yolov8> + Send + 'static,
{
    pub fn new(session: YoloSession<B>, config: ScanConfig) -> Self {
        Self {
            detector: Arc::new(Mutex::new(session)),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    #[instrument(skip_all, fields(filename = %upload.filename))]
    pub async fn scan(&self, upload: &Upload) -> Result<ScanRecord, SeascanError> {
        let detector = Arc::clone(&self.detector);
        let bytes = upload.bytes.clone();

        let detections = task::spawn_blocking(move || {
            let mut session = detector.blocking_lock();
            session.detect(&bytes)
        })
        .await
        .context(JoinSnafu)??;

        let geolocation = match locate(&upload.bytes) {
            Ok(coordinate) => Some(coordinate),
            Err(
                err @ (SeascanError::GeolocationMissing { .. }
                | SeascanError::InvalidRational { .. }
                | SeascanError::InvalidHemisphere { .. }
                | SeascanError::CoordinateOutOfRange { .. }),
            ) if !self.config.require_geolocation => {
                warn!("geotag not recorded: {}", err);
                None
            }
            Err(err) => return Err(err),
        };

        info!(detections = detections.len(), "scan finished");

        Ok(ScanRecord::new(&upload.filename, detections, geolocation))
    }

    /// Scans every upload concurrently; results keep the input order.
    pub async fn scan_all(&self, uploads: &[Upload]) -> Vec<Result<ScanRecord, SeascanError>> {
        let scan_tasks = uploads
            .iter()
            .map(|upload| self.scan(upload))
            .collect::<Vec<_>>();

        future::join_all(scan_tasks).await
    }
}

/// Geotag of an encoded image as signed decimal degrees.
pub fn locate(bytes: &[u8]) -> Result<GeoCoordinate, SeascanError> {
    normalize(&read_gps_tags(bytes))
}

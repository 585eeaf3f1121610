//! Optional piecewise-linear recalibration of raw market probabilities.
//!
//! Curves are loaded once from an external JSON resource. Loading is total: any failure leaves the
//! model on the identity mapping, and so does a load that has not completed yet.

use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use inplay::file::read_json_async;
use inplay::numeric::clamp;

/// The key under which global settings are held in the calibration resource.
pub const CONFIG_KEY: &str = "_config";

/// Names a calibratable probability. The string forms are the keys of the calibration resource.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum MarketKey {
    #[strum(serialize = "1_home")]
    Home,
    #[strum(serialize = "1_draw")]
    Draw,
    #[strum(serialize = "1_away")]
    Away,
    #[strum(serialize = "ou25_over")]
    Over25,
    #[strum(serialize = "ou25_under")]
    Under25,
    #[strum(serialize = "ou35_over")]
    Over35,
    #[strum(serialize = "ou35_under")]
    Under35,
    #[strum(serialize = "dc_1x")]
    HomeOrDraw,
    #[strum(serialize = "dc_12")]
    HomeOrAway,
    #[strum(serialize = "dc_x2")]
    DrawOrAway,
    #[strum(serialize = "dnb_home")]
    DrawNoBetHome,
    #[strum(serialize = "dnb_away")]
    DrawNoBetAway,
    #[strum(serialize = "btts_yes")]
    BothScore,
    #[strum(serialize = "btts_no")]
    NotBothScore,
    #[strum(serialize = "corners_over")]
    CornersOver,
    #[strum(serialize = "corners_under")]
    CornersUnder,
    #[strum(serialize = "cards_over")]
    CardsOver,
    #[strum(serialize = "cards_under")]
    CardsUnder,
    #[strum(serialize = "goal_home")]
    GoalHome,
    #[strum(serialize = "goal_away")]
    GoalAway,
    #[strum(serialize = "goal_none")]
    GoalNone,
}

/// A piecewise-linear mapping from raw to calibrated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
impl Curve {
    /// Non-empty, equal-length point arrays with ascending `x`.
    pub fn is_valid(&self) -> bool {
        !self.x.is_empty()
            && self.x.len() == self.y.len()
            && self.x.windows(2).all(|pair| pair[0] <= pair[1])
            && self.x.iter().chain(self.y.iter()).all(|value| value.is_finite())
    }

    /// Maps `p` through the curve, holding the end values outside the curve's domain. Returns
    /// `None` for an invalid curve.
    pub fn interpolate(&self, p: f64) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        let last = self.x.len() - 1;
        if p <= self.x[0] {
            return Some(self.y[0]);
        }
        if p >= self.x[last] {
            return Some(self.y[last]);
        }
        let upper = self.x.partition_point(|&x| x <= p);
        let (x_0, x_1) = (self.x[upper - 1], self.x[upper]);
        let (y_0, y_1) = (self.y[upper - 1], self.y[upper]);
        if x_1 == x_0 {
            return Some(y_0);
        }
        Some(y_0 + (y_1 - y_0) * (p - x_0) / (x_1 - x_0))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveSet {
    pub curves: FxHashMap<MarketKey, Curve>,
    pub confidence_z: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationStatus {
    Pending,
    Identity,
    Loaded,
}

/// The calibration in force. Immutable once constructed; a reload produces a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Calibration {
    /// The load has not completed. Applied as the identity mapping.
    #[default]
    Pending,
    Identity,
    Loaded(CurveSet),
}
impl Calibration {
    pub fn status(&self) -> CalibrationStatus {
        match self {
            Calibration::Pending => CalibrationStatus::Pending,
            Calibration::Identity => CalibrationStatus::Identity,
            Calibration::Loaded(_) => CalibrationStatus::Loaded,
        }
    }

    /// The z-score override from the resource's global settings, if any.
    pub fn confidence_z(&self) -> Option<f64> {
        match self {
            Calibration::Loaded(curve_set) => curve_set.confidence_z,
            _ => None,
        }
    }

    /// Maps a raw probability through the curve for `key`, or passes it through unchanged when no
    /// usable curve exists.
    pub fn apply(&self, key: MarketKey, p: f64) -> f64 {
        match self {
            Calibration::Loaded(curve_set) => curve_set
                .curves
                .get(&key)
                .and_then(|curve| curve.interpolate(p))
                .map(|calibrated| clamp(calibrated, 0.0, 1.0))
                .unwrap_or(p),
            _ => p,
        }
    }

    /// Parses a calibration resource: an object mapping market keys to `{x, y}` curves, with an
    /// optional `_config.confidence_z`. Unknown keys and unusable curves are skipped.
    pub fn from_json(value: Value) -> Result<Self, CalibrationError> {
        let Value::Object(entries) = value else {
            return Err(CalibrationError::NotAnObject);
        };
        let mut curve_set = CurveSet::default();
        for (name, entry) in entries {
            if name == CONFIG_KEY {
                curve_set.confidence_z = entry
                    .get("confidence_z")
                    .and_then(Value::as_f64)
                    .filter(|z| z.is_finite() && *z > 0.0);
                continue;
            }
            let Ok(key) = MarketKey::from_str(&name) else {
                debug!("skipping unknown calibration key '{name}'");
                continue;
            };
            let curve: Curve = serde_json::from_value(entry)
                .map_err(|err| CalibrationError::MalformedCurve(name.clone(), err))?;
            if curve.is_valid() {
                curve_set.curves.insert(key, curve);
            } else {
                debug!("skipping unusable calibration curve '{name}'");
            }
        }
        Ok(Calibration::Loaded(curve_set))
    }
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("calibration resource is not a JSON object")]
    NotAnObject,

    #[error("malformed curve '{0}': {1}")]
    MalformedCurve(String, serde_json::Error),
}

async fn try_load(path: &Path) -> Result<Calibration, CalibrationError> {
    let value: Value = read_json_async(path).await?;
    Calibration::from_json(value)
}

/// Loads the calibration resource at `path`. Never fails: an absent or malformed resource yields
/// [`Calibration::Identity`].
pub async fn load_calibration(path: impl AsRef<Path>) -> Calibration {
    let path = path.as_ref();
    match try_load(path).await {
        Ok(calibration) => {
            if let Calibration::Loaded(curve_set) = &calibration {
                info!(
                    "loaded {} calibration curves from {}, confidence_z: {:?}",
                    curve_set.curves.len(),
                    path.display(),
                    curve_set.confidence_z
                );
            }
            calibration
        }
        Err(err) => {
            info!("calibration unavailable at {} ({err}); using raw probabilities", path.display());
            Calibration::Identity
        }
    }
}

/// Holds the calibration in force. Readers take a snapshot without waiting on any load; a
/// completed load replaces the snapshot wholesale.
#[derive(Debug, Default)]
pub struct CalibrationCell {
    current: RwLock<Arc<Calibration>>,
}
impl CalibrationCell {
    pub fn new(calibration: Calibration) -> Self {
        Self {
            current: RwLock::new(Arc::new(calibration)),
        }
    }

    pub fn snapshot(&self) -> Arc<Calibration> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn install(&self, calibration: Calibration) {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(calibration);
    }

    /// Starts loading from `path` on the current tokio runtime. The cell keeps serving its existing
    /// snapshot until the load completes.
    pub fn spawn_load(self: &Arc<Self>, path: impl AsRef<Path>) -> JoinHandle<()> {
        let cell = Arc::clone(self);
        let path = path.as_ref().to_path_buf();
        tokio::spawn(async move {
            let calibration = load_calibration(&path).await;
            cell.install(calibration);
        })
    }
}

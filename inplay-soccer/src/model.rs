//! The scoring pipeline: snapshot → λ → goal distribution → raw markets → calibrated markets →
//! gated tips.

use serde::Serialize;
use tracing::debug;

use inplay::interval::{effective_sample_size, DEFAULT_Z};

use crate::calibration::{Calibration, CalibrationStatus};
use crate::domain::{MatchSnapshot, PerSide};
use crate::intensity::{Factors, Intensity, Phase};
use crate::market::{derive, AuxiliaryModel, Markets, ScoreProbability};
use crate::scoregrid::GoalDistribution;
use crate::tips::{GoalFraming, Tip};
use crate::{intensity, scoregrid, tips};

/// Model coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub possession_weight: f64,
    pub on_target_weight: f64,
    pub off_target_weight: f64,
    pub corner_weight: f64,
    pub yellow_weight: f64,
    pub red_weight: f64,
    pub efficiency_weight: f64,
    pub tempo_weight: f64,
    pub card_balance_weight: f64,
    /// Dixon-Coles low-score dependence; non-positive disables the correction.
    pub dixon_coles_tau: f64,
    /// Scales the corner and card base rates (0.5–1.5).
    pub referee_intensity: f64,
    /// Wilson z-score unless the calibration resource overrides it.
    pub confidence_z: f64,
    pub max_tips: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            possession_weight: 0.5,
            on_target_weight: 0.10,
            off_target_weight: 0.04,
            corner_weight: 0.05,
            yellow_weight: 0.06,
            red_weight: 0.35,
            efficiency_weight: 0.25,
            tempo_weight: 0.15,
            card_balance_weight: 0.03,
            dixon_coles_tau: 0.12,
            referee_intensity: 1.0,
            confidence_z: DEFAULT_Z,
            max_tips: tips::MAX_TIPS,
        }
    }
}

/// Intermediate values, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub max_k: usize,
    pub lambdas: PerSide<f64>,
    pub factors: Factors,
    pub phase: Phase,
    pub dixon_coles_tau: f64,
    pub corners: AuxiliaryModel,
    pub cards: AuxiliaryModel,
    pub sample_size: f64,
    pub confidence_z: f64,
    pub calibration: CalibrationStatus,
    pub goal_framing: GoalFraming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub raw: Markets,
    pub calibrated: Markets,
    pub correct_scores: Vec<ScoreProbability>,
    pub distribution: GoalDistribution,
    pub meta: Meta,
    pub tips: Vec<Tip>,
}

/// Scores `snapshot` with the default coefficients.
pub fn predict(snapshot: &MatchSnapshot, calibration: &Calibration) -> Prediction {
    predict_with(snapshot, calibration, &Config::default())
}

pub fn predict_with(snapshot: &MatchSnapshot, calibration: &Calibration, config: &Config) -> Prediction {
    let intensity = intensity::estimate(snapshot, config);
    let distribution = scoregrid::build(&intensity.lambdas, config.dixon_coles_tau);
    let derivation = derive(snapshot, &intensity, &distribution, config.referee_intensity);
    let calibrated = derivation.markets.map(|key, prob| calibration.apply(key, prob));

    let sample_size = effective_sample_size(intensity.phase.time_remaining);
    let confidence_z = calibration.confidence_z().unwrap_or(config.confidence_z);
    let tips = tips::generate(
        &tips::Context {
            snapshot,
            lambda_total: intensity.total(),
            corners: &derivation.corners,
            cards: &derivation.cards,
            sample_size,
            z: confidence_z,
        },
        &calibrated,
        &derivation.correct_scores,
        config.max_tips,
    );
    debug!(
        "lambdas: {:?}, max_k: {}, calibration: {:?}, tips: {}",
        intensity.lambdas,
        distribution.max_k,
        calibration.status(),
        tips.len()
    );

    let Intensity { lambdas, phase, factors } = intensity;
    Prediction {
        raw: derivation.markets,
        calibrated,
        correct_scores: derivation.correct_scores,
        meta: Meta {
            max_k: distribution.max_k,
            lambdas,
            factors,
            phase,
            dixon_coles_tau: config.dixon_coles_tau,
            corners: derivation.corners,
            cards: derivation.cards,
            sample_size,
            confidence_z,
            calibration: calibration.status(),
            goal_framing: GoalFraming::of(&snapshot.score()),
        },
        distribution,
        tips,
    }
}

//! Regression metrics.

use log::{error, info, warn};

use crate::error::{PipelineError, Result};

/// Computes the coefficient of determination (R²).
///
/// `R² = 1 - SS_res / SS_tot`, where `SS_tot` is taken about the mean of
/// `y_true`. A perfect prediction scores 1.0, predicting the mean scores 0.0,
/// and worse predictions score below zero.
///
/// R² is not defined for a single sample, so one value scores `NaN`. When
/// `y_true` is constant over two or more samples (`SS_tot == 0`) the score is
/// 1.0 for a perfect prediction and 0.0 otherwise.
///
/// # Errors
///
/// Returns a `Computation` error if the inputs are empty, differ in length,
/// or contain non-finite values.
///
/// # Examples
///
/// ```
/// use local_ml_flow::ml::r2_score;
///
/// let y_true = [3.0, -0.5, 2.0, 7.0];
/// let y_pred = [2.5, 0.0, 2.0, 8.0];
/// let r2 = r2_score(&y_true, &y_pred).unwrap();
/// assert!((r2 - 0.9486081370449679).abs() < 1e-12);
/// ```
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    info!("calculating r2 over {} samples", y_true.len());

    if y_true.is_empty() {
        return Err(fail("cannot score an empty label vector".to_string()));
    }
    if y_true.len() != y_pred.len() {
        return Err(fail(format!(
            "y_true has {} values but y_pred has {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.iter().chain(y_pred).any(|v| !v.is_finite()) {
        return Err(fail("labels contain NaN or infinite values".to_string()));
    }
    if y_true.len() < 2 {
        warn!("r2 is not well-defined with fewer than two samples");
        return Ok(f64::NAN);
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

fn fail(msg: String) -> PipelineError {
    error!("error while calculating r2 - {msg}");
    PipelineError::computation(msg)
}

/// Render a score as a percentage string: `score * 100` followed by `%`.
///
/// The number uses the shortest representation that round-trips and always
/// shows a decimal point or an exponent (`85.0%`, `90.81632653061224%`,
/// `1e+20%`), which keeps stored scores comparable with earlier runs.
pub fn format_percentage(score: f64) -> String {
    format!("{}%", float_repr(score * 100.0))
}

fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

use anyhow::{bail, Result};

use crate::models::CandleSeries;

/// Attach a rolling simple average of volume to every candle.
///
/// Candles at index >= window-1 get the mean of the trailing `window`
/// volumes (inclusive of the candle itself); earlier candles keep `None`.
/// Uses a running sum, so the pass is O(len) regardless of window size.
pub fn enrich_volume_sma(series: &mut CandleSeries, window: usize) -> Result<()> {
    if series.is_empty() {
        bail!("no candle data to enrich");
    }
    if window == 0 {
        bail!("volume average window must be at least 1");
    }

    let mut sum = 0.0;
    for i in 0..series.len() {
        sum += series[i].volume;
        if i >= window {
            sum -= series[i - window].volume;
        }
        let avg = if i + 1 >= window {
            Some(sum / window as f64)
        } else {
            None
        };
        if let Some(candle) = series.get_mut(i) {
            candle.volume_sma = avg;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_volume_candles;

    #[test]
    fn empty_series_is_an_error() {
        let mut series = CandleSeries::default();
        assert!(enrich_volume_sma(&mut series, 3).is_err());
    }

    #[test]
    fn zero_window_is_an_error() {
        let mut series = make_volume_candles(&[(100.0, 101.0, 99.0, 100.5, 10.0)]);
        assert!(enrich_volume_sma(&mut series, 0).is_err());
    }

    #[test]
    fn undefined_before_full_window() {
        let mut series = make_volume_candles(&[
            (100.0, 101.0, 99.0, 100.5, 10.0),
            (100.0, 101.0, 99.0, 100.5, 20.0),
            (100.0, 101.0, 99.0, 100.5, 30.0),
            (100.0, 101.0, 99.0, 100.5, 40.0),
        ]);
        enrich_volume_sma(&mut series, 3).unwrap();

        assert!(series[0].volume_sma.is_none());
        assert!(series[1].volume_sma.is_none());
        assert!(series[2].volume_sma.is_some());
        assert!(series[3].volume_sma.is_some());
    }

    #[test]
    fn matches_direct_trailing_mean() {
        let volumes: Vec<f64> = (1..=30).map(|v| v as f64 * 7.0).collect();
        let data: Vec<(f64, f64, f64, f64, f64)> = volumes
            .iter()
            .map(|&v| (100.0, 101.0, 99.0, 100.5, v))
            .collect();
        let mut series = make_volume_candles(&data);

        let window = 5;
        enrich_volume_sma(&mut series, window).unwrap();

        for i in 0..series.len() {
            match series[i].volume_sma {
                None => assert!(i + 1 < window, "index {i} should have a defined average"),
                Some(avg) => {
                    let direct: f64 =
                        volumes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                    assert!(
                        (avg - direct).abs() < 1e-9,
                        "index {i}: sliding {avg} vs direct {direct}"
                    );
                }
            }
        }
    }

    #[test]
    fn window_of_one_is_the_volume_itself() {
        let mut series = make_volume_candles(&[
            (100.0, 101.0, 99.0, 100.5, 12.0),
            (100.0, 101.0, 99.0, 100.5, 34.0),
        ]);
        enrich_volume_sma(&mut series, 1).unwrap();
        assert_eq!(series[0].volume_sma, Some(12.0));
        assert_eq!(series[1].volume_sma, Some(34.0));
    }
}

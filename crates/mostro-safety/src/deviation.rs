use mostro_price_oracle::PriceOracle;

use crate::error::SafetyError;

/// Inputs needed to evaluate an order against the market price (§4.I
/// "Market-price deviation").
pub struct DeviationCheck<'a> {
    pub fiat_code: &'a str,
    pub premium_percent: Option<i64>,
    pub amount_sats: u64,
    pub fiat_amount: u64,
    pub max_premium_deviation: f64,
}

/// If the oracle is unreachable the check passes (warn, do not block) —
/// this is the one Safety check that fails open rather than closed.
pub async fn check_market_deviation(
    oracle: &dyn PriceOracle,
    check: &DeviationCheck<'_>,
) -> Result<(), SafetyError> {
    let market_price = match oracle.btc_price(check.fiat_code).await {
        Ok(price) => price,
        Err(error) => {
            tracing::warn!(%error, "price oracle unreachable, skipping deviation check");
            return Ok(());
        }
    };

    let deviation_percent = if let Some(premium) = check.premium_percent {
        premium.abs() as f64
    } else if check.amount_sats > 0 && check.fiat_amount > 0 {
        let effective_price = check.fiat_amount as f64 / (check.amount_sats as f64 / 1e8);
        ((effective_price - market_price) / market_price * 100.0).abs()
    } else {
        return Ok(());
    };

    if deviation_percent > check.max_premium_deviation {
        return Err(SafetyError::PriceDeviation {
            deviation_percent,
            max_percent: check.max_premium_deviation,
        });
    }
    Ok(())
}

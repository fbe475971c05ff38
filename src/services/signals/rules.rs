//! Scoring rules expressed as data.
//!
//! Each rule is a condition over the latest (and previous) indicator row, a
//! point weight and a reason template. Rules never look at each other, so
//! any rule can be evaluated and tested alone. Long-biased and short-biased
//! instruments each get their own ordered rule list; the short list mirrors
//! the long one but keeps its own thresholds.

use crate::types::{IndicatorRow, InstrumentRole, RuleCategory, RuleContribution};

/// What a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub latest: &'a IndicatorRow,
    pub previous: &'a IndicatorRow,
}

impl<'a> RuleInput<'a> {
    pub fn new(latest: &'a IndicatorRow, previous: &'a IndicatorRow) -> Self {
        Self { latest, previous }
    }
}

type Condition = fn(&RuleInput) -> bool;
type ReasonTemplate = fn(&RuleInput) -> String;

/// A single scoring rule.
#[derive(Clone)]
pub struct Rule {
    pub id: &'static str,
    pub category: RuleCategory,
    pub points: f64,
    condition: Condition,
    reason: ReasonTemplate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("points", &self.points)
            .finish()
    }
}

impl Rule {
    pub fn new(
        id: &'static str,
        category: RuleCategory,
        points: f64,
        condition: Condition,
        reason: ReasonTemplate,
    ) -> Self {
        Self {
            id,
            category,
            points,
            condition,
            reason,
        }
    }

    /// Whether the rule's condition holds for this input.
    pub fn fires(&self, input: &RuleInput) -> bool {
        (self.condition)(input)
    }

    /// Points and reason when the rule fires with non-zero weight.
    pub fn evaluate(&self, input: &RuleInput) -> Option<RuleContribution> {
        if self.points == 0.0 || !self.fires(input) {
            return None;
        }
        Some(RuleContribution {
            rule_id: self.id.to_string(),
            category: self.category,
            points: self.points,
            reason: (self.reason)(input),
        })
    }
}

/// Ordered rules for one instrument role.
#[derive(Debug, Clone)]
pub struct RuleSet {
    role: InstrumentRole,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn for_role(role: InstrumentRole) -> Self {
        match role {
            InstrumentRole::LongBiased => Self::long_biased(),
            InstrumentRole::ShortBiased => Self::short_biased(),
        }
    }

    pub fn role(&self) -> InstrumentRole {
        self.role
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Recalibrate one rule's weight. Unknown ids are ignored.
    pub fn with_points(mut self, id: &str, points: f64) -> Self {
        if let Some(rule) = self.rules.iter_mut().find(|r| r.id == id) {
            rule.points = points;
        }
        self
    }

    /// Evaluate every rule in order, keeping the ones that fired.
    pub fn evaluate(&self, input: &RuleInput) -> Vec<RuleContribution> {
        self.rules.iter().filter_map(|r| r.evaluate(input)).collect()
    }

    pub fn long_biased() -> Self {
        use RuleCategory::*;
        let rules = vec![
            Rule::new(
                "momentum_strong",
                Momentum,
                25.0,
                |i| gt(i.latest.momentum, 2.0),
                |i| format!("Strong momentum {:+.2}%", v(i.latest.momentum)),
            ),
            Rule::new(
                "momentum_moderate",
                Momentum,
                15.0,
                |i| matches!(i.latest.momentum, Some(m) if m > 1.0 && m <= 2.0),
                |i| format!("Positive momentum {:+.2}%", v(i.latest.momentum)),
            ),
            Rule::new(
                "rsi_oversold_rising",
                Oscillator,
                20.0,
                |i| lt(i.latest.rsi, 35.0) && rising(i.latest.rsi, i.previous.rsi),
                |i| format!("RSI {:.1} oversold and turning up", v(i.latest.rsi)),
            ),
            Rule::new(
                "rsi_bullish_zone",
                Oscillator,
                10.0,
                |i| {
                    matches!(i.latest.rsi, Some(r) if (50.0..70.0).contains(&r))
                        && rising(i.latest.rsi, i.previous.rsi)
                },
                |i| format!("RSI {:.1} rising in bullish zone", v(i.latest.rsi)),
            ),
            Rule::new(
                "macd_bullish_cross",
                Trend,
                15.0,
                |i| gt(i.latest.macd_histogram, 0.0) && le(i.previous.macd_histogram, 0.0),
                |_| "MACD crossed above signal".to_string(),
            ),
            Rule::new(
                "macd_histogram_rising",
                Trend,
                10.0,
                |i| rising(i.latest.macd_histogram, i.previous.macd_histogram),
                |i| format!("MACD histogram rising ({:+.4})", v(i.latest.macd_histogram)),
            ),
            Rule::new(
                "price_above_ema_vwap",
                Trend,
                10.0,
                |i| match (i.latest.ema_fast, i.latest.vwap) {
                    (Some(ema), Some(vwap)) => i.latest.close > ema && ema > vwap,
                    _ => false,
                },
                |i| {
                    format!(
                        "Price ${:.2} above EMA ${:.2} and VWAP ${:.2}",
                        i.latest.close,
                        v(i.latest.ema_fast),
                        v(i.latest.vwap)
                    )
                },
            ),
            Rule::new(
                "ema_stack_bullish",
                Trend,
                10.0,
                |i| match (i.latest.ema_fast, i.latest.ema_medium, i.latest.ema_slow) {
                    (Some(f), Some(m), Some(s)) => f > m && m > s,
                    _ => false,
                },
                |_| "EMAs stacked bullish (fast > medium > slow)".to_string(),
            ),
            Rule::new(
                "volume_confirmation",
                Volume,
                10.0,
                |i| gt(i.latest.volume_ratio, 1.5),
                |i| format!("Volume {:.1}x average", v(i.latest.volume_ratio)),
            ),
            Rule::new(
                "near_support",
                Levels,
                10.0,
                |i| matches!(i.latest.support, Some(s) if i.latest.close <= s * 1.01),
                |i| format!("Near support ${:.2}", v(i.latest.support)),
            ),
            Rule::new(
                "stoch_oversold_turn",
                Oscillator,
                5.0,
                |i| match (i.latest.stoch_k, i.latest.stoch_d) {
                    (Some(k), Some(d)) => k < 20.0 && k > d,
                    _ => false,
                },
                |i| format!("Stochastic %K {:.1} oversold, crossing up", v(i.latest.stoch_k)),
            ),
            Rule::new(
                "williams_oversold",
                Oscillator,
                5.0,
                |i| lt(i.latest.williams_r, -80.0),
                |i| format!("Williams %R {:.1} oversold", v(i.latest.williams_r)),
            ),
            Rule::new(
                "bollinger_lower_zone",
                Volatility,
                5.0,
                |i| lt(i.latest.bb_position, 0.2),
                |i| format!("Price in lower Bollinger zone ({:.2})", v(i.latest.bb_position)),
            ),
            Rule::new(
                "ema_slope_up",
                Trend,
                5.0,
                |i| rising(i.latest.ema_fast, i.previous.ema_fast),
                |_| "Short EMA sloping up".to_string(),
            ),
        ];
        Self {
            role: InstrumentRole::LongBiased,
            rules,
        }
    }

    pub fn short_biased() -> Self {
        use RuleCategory::*;
        let rules = vec![
            Rule::new(
                "momentum_strong",
                Momentum,
                25.0,
                |i| lt(i.latest.momentum, -2.0),
                |i| format!("Strong downside momentum {:+.2}%", v(i.latest.momentum)),
            ),
            Rule::new(
                "momentum_moderate",
                Momentum,
                15.0,
                |i| matches!(i.latest.momentum, Some(m) if m < -1.0 && m >= -2.0),
                |i| format!("Negative momentum {:+.2}%", v(i.latest.momentum)),
            ),
            Rule::new(
                "rsi_overbought_falling",
                Oscillator,
                20.0,
                |i| gt(i.latest.rsi, 65.0) && falling(i.latest.rsi, i.previous.rsi),
                |i| format!("RSI {:.1} overbought and rolling over", v(i.latest.rsi)),
            ),
            Rule::new(
                "rsi_bearish_zone",
                Oscillator,
                10.0,
                |i| {
                    matches!(i.latest.rsi, Some(r) if r > 30.0 && r <= 50.0)
                        && falling(i.latest.rsi, i.previous.rsi)
                },
                |i| format!("RSI {:.1} falling in bearish zone", v(i.latest.rsi)),
            ),
            Rule::new(
                "macd_bearish_cross",
                Trend,
                15.0,
                |i| lt(i.latest.macd_histogram, 0.0) && ge(i.previous.macd_histogram, 0.0),
                |_| "MACD crossed below signal".to_string(),
            ),
            Rule::new(
                "macd_histogram_falling",
                Trend,
                10.0,
                |i| falling(i.latest.macd_histogram, i.previous.macd_histogram),
                |i| format!("MACD histogram falling ({:+.4})", v(i.latest.macd_histogram)),
            ),
            Rule::new(
                "price_below_ema_vwap",
                Trend,
                10.0,
                |i| match (i.latest.ema_fast, i.latest.vwap) {
                    (Some(ema), Some(vwap)) => i.latest.close < ema && ema < vwap,
                    _ => false,
                },
                |i| {
                    format!(
                        "Price ${:.2} below EMA ${:.2} and VWAP ${:.2}",
                        i.latest.close,
                        v(i.latest.ema_fast),
                        v(i.latest.vwap)
                    )
                },
            ),
            Rule::new(
                "ema_stack_bearish",
                Trend,
                10.0,
                |i| match (i.latest.ema_fast, i.latest.ema_medium, i.latest.ema_slow) {
                    (Some(f), Some(m), Some(s)) => f < m && m < s,
                    _ => false,
                },
                |_| "EMAs stacked bearish (fast < medium < slow)".to_string(),
            ),
            Rule::new(
                "volume_confirmation",
                Volume,
                10.0,
                |i| gt(i.latest.volume_ratio, 1.5),
                |i| format!("Volume {:.1}x average", v(i.latest.volume_ratio)),
            ),
            Rule::new(
                "near_resistance",
                Levels,
                10.0,
                |i| matches!(i.latest.resistance, Some(r) if i.latest.close >= r * 0.99),
                |i| format!("Near resistance ${:.2}", v(i.latest.resistance)),
            ),
            Rule::new(
                "stoch_overbought_turn",
                Oscillator,
                5.0,
                |i| match (i.latest.stoch_k, i.latest.stoch_d) {
                    (Some(k), Some(d)) => k > 80.0 && k < d,
                    _ => false,
                },
                |i| format!("Stochastic %K {:.1} overbought, crossing down", v(i.latest.stoch_k)),
            ),
            Rule::new(
                "williams_overbought",
                Oscillator,
                5.0,
                |i| gt(i.latest.williams_r, -20.0),
                |i| format!("Williams %R {:.1} overbought", v(i.latest.williams_r)),
            ),
            Rule::new(
                "bollinger_upper_zone",
                Volatility,
                5.0,
                |i| gt(i.latest.bb_position, 0.8),
                |i| format!("Price in upper Bollinger zone ({:.2})", v(i.latest.bb_position)),
            ),
            Rule::new(
                "ema_slope_down",
                Trend,
                5.0,
                |i| falling(i.latest.ema_fast, i.previous.ema_fast),
                |_| "Short EMA sloping down".to_string(),
            ),
        ];
        Self {
            role: InstrumentRole::ShortBiased,
            rules,
        }
    }
}

fn v(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

fn gt(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(x) if x > threshold)
}

fn ge(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(x) if x >= threshold)
}

fn lt(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(x) if x < threshold)
}

fn le(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(x) if x <= threshold)
}

fn rising(current: Option<f64>, previous: Option<f64>) -> bool {
    matches!((current, previous), (Some(c), Some(p)) if c > p)
}

fn falling(current: Option<f64>, previous: Option<f64>) -> bool {
    matches!((current, previous), (Some(c), Some(p)) if c < p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> IndicatorRow {
        IndicatorRow {
            close: 100.0,
            volume: 1000.0,
            ..Default::default()
        }
    }

    fn fires(set: &RuleSet, id: &str, latest: &IndicatorRow, previous: &IndicatorRow) -> bool {
        set.get(id)
            .expect("rule exists")
            .fires(&RuleInput::new(latest, previous))
    }

    #[test]
    fn test_rule_order_is_stable() {
        let ids: Vec<&str> = RuleSet::long_biased().rules().iter().map(|r| r.id).collect();
        assert_eq!(ids[0], "momentum_strong");
        assert_eq!(ids[1], "momentum_moderate");
        assert_eq!(ids.last(), Some(&"ema_slope_up"));
        assert_eq!(RuleSet::short_biased().rules().len(), ids.len());
    }

    #[test]
    fn test_momentum_bands_are_exclusive() {
        let set = RuleSet::long_biased();
        let prev = row();
        let strong = IndicatorRow { momentum: Some(2.5), ..row() };
        let moderate = IndicatorRow { momentum: Some(1.5), ..row() };
        let edge = IndicatorRow { momentum: Some(2.0), ..row() };
        assert!(fires(&set, "momentum_strong", &strong, &prev));
        assert!(!fires(&set, "momentum_moderate", &strong, &prev));
        assert!(fires(&set, "momentum_moderate", &moderate, &prev));
        assert!(!fires(&set, "momentum_strong", &edge, &prev));
        assert!(fires(&set, "momentum_moderate", &edge, &prev));
    }

    #[test]
    fn test_long_rsi_oversold_needs_rising() {
        let set = RuleSet::long_biased();
        let prev = IndicatorRow { rsi: Some(28.0), ..row() };
        let up = IndicatorRow { rsi: Some(31.0), ..row() };
        let down = IndicatorRow { rsi: Some(25.0), ..row() };
        assert!(fires(&set, "rsi_oversold_rising", &up, &prev));
        assert!(!fires(&set, "rsi_oversold_rising", &down, &prev));
    }

    #[test]
    fn test_short_rsi_overbought_needs_falling() {
        let set = RuleSet::short_biased();
        let prev = IndicatorRow { rsi: Some(72.0), ..row() };
        let down = IndicatorRow { rsi: Some(68.0), ..row() };
        assert!(fires(&set, "rsi_overbought_falling", &down, &prev));
        assert!(!fires(&set, "rsi_overbought_falling", &prev, &down));
    }

    #[test]
    fn test_macd_crossovers() {
        let long = RuleSet::long_biased();
        let short = RuleSet::short_biased();
        let neg = IndicatorRow { macd_histogram: Some(-0.1), ..row() };
        let pos = IndicatorRow { macd_histogram: Some(0.2), ..row() };
        assert!(fires(&long, "macd_bullish_cross", &pos, &neg));
        assert!(!fires(&long, "macd_bullish_cross", &pos, &pos));
        assert!(fires(&short, "macd_bearish_cross", &neg, &pos));
        assert!(fires(&short, "macd_histogram_falling", &neg, &pos));
    }

    #[test]
    fn test_price_vs_ema_and_vwap() {
        let long = RuleSet::long_biased();
        let prev = row();
        let above = IndicatorRow {
            ema_fast: Some(99.0),
            vwap: Some(98.0),
            ..row()
        };
        let mixed = IndicatorRow {
            ema_fast: Some(99.0),
            vwap: Some(99.5),
            ..row()
        };
        assert!(fires(&long, "price_above_ema_vwap", &above, &prev));
        assert!(!fires(&long, "price_above_ema_vwap", &mixed, &prev));
    }

    #[test]
    fn test_levels_rules() {
        let long = RuleSet::long_biased();
        let short = RuleSet::short_biased();
        let prev = row();
        let at_support = IndicatorRow { support: Some(99.5), ..row() };
        let at_resistance = IndicatorRow { resistance: Some(100.5), ..row() };
        let far = IndicatorRow {
            support: Some(90.0),
            resistance: Some(110.0),
            ..row()
        };
        assert!(fires(&long, "near_support", &at_support, &prev));
        assert!(!fires(&long, "near_support", &far, &prev));
        assert!(fires(&short, "near_resistance", &at_resistance, &prev));
        assert!(!fires(&short, "near_resistance", &far, &prev));
    }

    #[test]
    fn test_missing_values_never_fire() {
        let empty = row();
        for set in [RuleSet::long_biased(), RuleSet::short_biased()] {
            assert!(set.evaluate(&RuleInput::new(&empty, &empty)).is_empty());
        }
    }

    #[test]
    fn test_zero_point_rule_does_not_contribute() {
        let set = RuleSet::long_biased().with_points("volume_confirmation", 0.0);
        let hot = IndicatorRow { volume_ratio: Some(3.0), ..row() };
        let prev = row();
        assert!(set.get("volume_confirmation").unwrap().fires(&RuleInput::new(&hot, &prev)));
        assert!(set.evaluate(&RuleInput::new(&hot, &prev)).is_empty());
    }

    #[test]
    fn test_contribution_reason_text() {
        let set = RuleSet::long_biased();
        let hot = IndicatorRow { volume_ratio: Some(2.0), ..row() };
        let prev = row();
        let c = set
            .get("volume_confirmation")
            .unwrap()
            .evaluate(&RuleInput::new(&hot, &prev))
            .unwrap();
        assert_eq!(c.reason, "Volume 2.0x average");
        assert_eq!(c.points, 10.0);
        assert_eq!(c.category, RuleCategory::Volume);
    }
}

//! Insight Engine - evaluates trend, variability and parameter rules

use std::collections::HashMap;

use crate::models::{ParameterId, Stats, Trend};

use super::types::InsightRule;

/// Normalized spread above which variability is reported as high
const HIGH_VARIABILITY: f64 = 0.5;

/// Normalized spread below which variability is reported as low
const LOW_VARIABILITY: f64 = 0.2;

fn always(_: &Stats) -> bool {
    true
}

const CORRELATE_COMBUSTION: InsightRule = InsightRule::new(
    "combustion_sources",
    always,
    "Consider correlating with industrial activity and traffic patterns.",
);

/// Built-in rules, evaluated in order; the first match wins
fn builtin_rules() -> Vec<(ParameterId, Vec<InsightRule>)> {
    vec![
        (
            ParameterId::Ndvi,
            vec![
                InsightRule::new(
                    "healthy_vegetation",
                    |s| s.mean > 0.5,
                    "Healthy vegetation cover detected in the selected area.",
                ),
                InsightRule::new(
                    "sparse_vegetation",
                    |s| s.mean < 0.2,
                    "Sparse vegetation or bare soil detected. Consider monitoring for land degradation.",
                ),
            ],
        ),
        (
            ParameterId::Lst,
            vec![InsightRule::new(
                "heat_island",
                |s| s.max > 40.0,
                "Extreme surface temperatures detected. Urban heat island effect may be present.",
            )],
        ),
        (
            ParameterId::Aqi,
            vec![InsightRule::new(
                "unhealthy_air",
                |s| s.mean > 100.0,
                "Air quality is unhealthy for sensitive groups. Monitor pollution sources.",
            )],
        ),
        (
            ParameterId::SoilMoisture,
            vec![InsightRule::new(
                "drought_risk",
                |s| s.mean < 20.0,
                "Low soil moisture levels detected. Drought conditions may be developing.",
            )],
        ),
        (ParameterId::No2, vec![CORRELATE_COMBUSTION]),
        (ParameterId::So2, vec![CORRELATE_COMBUSTION]),
        (ParameterId::Co, vec![CORRELATE_COMBUSTION]),
    ]
}

/// Maps statistics and parameter identity to insight sentences
pub struct InsightEngine {
    rules: HashMap<ParameterId, Vec<InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rule table
    pub fn new() -> Self {
        let mut engine = Self {
            rules: HashMap::new(),
        };
        for (parameter, rules) in builtin_rules() {
            for rule in rules {
                engine.register(parameter, rule);
            }
        }
        engine
    }

    /// Create an engine with no parameter-specific rules
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Append a rule for a parameter (evaluated after existing rules)
    pub fn register(&mut self, parameter: ParameterId, rule: InsightRule) {
        self.rules.entry(parameter).or_default().push(rule);
    }

    /// Rules registered for a parameter, in evaluation order
    pub fn rules_for(&self, parameter: ParameterId) -> &[InsightRule] {
        self.rules
            .get(&parameter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Produce the ordered insight sentences for a result
    pub fn compute(&self, parameter: ParameterId, stats: &Stats) -> Vec<String> {
        let def = parameter.definition();
        let mut insights = Vec::with_capacity(3);

        insights.push(match stats.trend {
            Trend::Increasing => format!(
                "{} shows an upward trend of {}% over the analysis period.",
                def.name,
                stats.trend_percent.abs()
            ),
            Trend::Decreasing => format!(
                "{} shows a downward trend of {}% over the analysis period.",
                def.name,
                stats.trend_percent.abs()
            ),
            Trend::Stable => format!(
                "{} remains relatively stable throughout the analysis period.",
                def.name
            ),
        });

        let spread = (stats.max - stats.min) / def.range();
        if spread > HIGH_VARIABILITY {
            insights.push(format!(
                "High variability detected with values ranging from {} to {} {}.",
                stats.min, stats.max, def.unit
            ));
        } else if spread < LOW_VARIABILITY {
            insights
                .push("Low variability indicates consistent conditions across the analysis period.".to_string());
        }

        if let Some(rule) = self
            .rules_for(parameter)
            .iter()
            .find(|rule| (rule.applies)(stats))
        {
            tracing::debug!(parameter = %parameter, rule = rule.key, "Insight rule matched");
            insights.push(rule.message.to_string());
        }

        insights
    }
}

/// Compute insights with the built-in rule table
pub fn compute_insights(parameter: ParameterId, stats: &Stats) -> Vec<String> {
    InsightEngine::new().compute(parameter, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, min: f64, max: f64, trend_percent: f64) -> Stats {
        Stats {
            mean,
            min,
            max,
            std_dev: 0.0,
            trend: Trend::from_percent(trend_percent),
            trend_percent,
        }
    }

    #[test]
    fn test_ndvi_healthy_vegetation() {
        let insights = compute_insights(ParameterId::Ndvi, &stats(0.6, 0.45, 0.7, 0.5));
        assert!(insights.iter().any(|s| s.contains("Healthy vegetation")));
    }

    #[test]
    fn test_ndvi_sparse_vegetation() {
        let insights = compute_insights(ParameterId::Ndvi, &stats(0.1, 0.05, 0.15, 0.5));
        assert!(insights.iter().any(|s| s.contains("Sparse vegetation")));
        assert!(!insights.iter().any(|s| s.contains("Healthy")));
    }

    #[test]
    fn test_ndvi_moderate_has_no_specific_sentence() {
        let insights = compute_insights(ParameterId::Ndvi, &stats(0.35, 0.2, 0.5, 0.0));
        // trend + (spread 0.27: neither high nor low)
        assert_eq!(insights.len(), 1);
    }

    #[test]
    fn test_trend_sentence_first() {
        let up = compute_insights(ParameterId::Evi, &stats(0.5, 0.4, 0.6, 3.5));
        assert_eq!(
            up[0],
            "Enhanced Vegetation Index shows an upward trend of 3.5% over the analysis period."
        );

        let down = compute_insights(ParameterId::Evi, &stats(0.5, 0.4, 0.6, -4.0));
        assert_eq!(
            down[0],
            "Enhanced Vegetation Index shows a downward trend of 4% over the analysis period."
        );

        let flat = compute_insights(ParameterId::Evi, &stats(0.5, 0.4, 0.6, 1.0));
        assert_eq!(
            flat[0],
            "Enhanced Vegetation Index remains relatively stable throughout the analysis period."
        );
    }

    #[test]
    fn test_variability_sentences() {
        let high = compute_insights(ParameterId::Rainfall, &stats(50.0, 10.0, 80.0, 0.0));
        assert_eq!(
            high[1],
            "High variability detected with values ranging from 10 to 80 mm/day."
        );

        let low = compute_insights(ParameterId::Rainfall, &stats(50.0, 45.0, 55.0, 0.0));
        assert!(low[1].starts_with("Low variability"));

        let mid = compute_insights(ParameterId::Rainfall, &stats(50.0, 30.0, 60.0, 0.0));
        assert_eq!(mid.len(), 1);
    }

    #[test]
    fn test_parameter_thresholds() {
        let lst = compute_insights(ParameterId::Lst, &stats(30.0, 20.0, 42.0, 0.0));
        assert!(lst.last().unwrap().contains("heat island"));

        let aqi = compute_insights(ParameterId::Aqi, &stats(120.0, 100.0, 140.0, 0.0));
        assert!(aqi.last().unwrap().contains("unhealthy for sensitive groups"));

        let soil = compute_insights(ParameterId::SoilMoisture, &stats(15.0, 10.0, 20.0, 0.0));
        assert!(soil.last().unwrap().contains("Drought"));

        let cool = compute_insights(ParameterId::Lst, &stats(20.0, 10.0, 30.0, 0.0));
        assert!(!cool.iter().any(|s| s.contains("heat island")));
    }

    #[test]
    fn test_combustion_gases_always_suggest_correlation() {
        for id in [ParameterId::No2, ParameterId::So2, ParameterId::Co] {
            let def = id.definition();
            let s = stats(def.max / 2.0, def.max * 0.4, def.max * 0.6, 0.0);
            let insights = compute_insights(id, &s);
            assert_eq!(
                insights.last().unwrap(),
                "Consider correlating with industrial activity and traffic patterns."
            );
        }
    }

    #[test]
    fn test_at_most_one_specific_sentence() {
        let mut engine = InsightEngine::new();
        engine.register(
            ParameterId::Ndvi,
            InsightRule::new("always", |_| true, "Extra sentence."),
        );
        let insights = engine.compute(ParameterId::Ndvi, &stats(0.6, 0.45, 0.7, 0.0));
        assert!(insights.iter().any(|s| s.contains("Healthy")));
        assert!(!insights.iter().any(|s| s == "Extra sentence."));

        let moderate = engine.compute(ParameterId::Ndvi, &stats(0.35, 0.2, 0.5, 0.0));
        assert_eq!(moderate.last().unwrap(), "Extra sentence.");
    }

    #[test]
    fn test_parameters_without_rules() {
        let engine = InsightEngine::new();
        assert!(engine.rules_for(ParameterId::Et).is_empty());
        assert!(InsightEngine::empty().rules_for(ParameterId::Ndvi).is_empty());
    }
}

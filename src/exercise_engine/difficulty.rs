//! Session aggregation and the difficulty-adjustment policy.
//!
//! The engine keeps the answered samples of one session, derives
//! [`SessionMetrics`] on demand and turns them into a
//! [`DifficultyRecommendation`]. It never stores a current difficulty: the
//! caller passes one in and applies the returned change itself.
//!
//! ## Policy
//!
//! | Situation | Change |
//! |-----------|--------|
//! | fewer than `min_samples` answers | `Maintain`, confidence < 0.5 |
//! | accuracy above band and mean time under the ceiling | `Increase(1)` / `AdaptiveIncrease` |
//! | accuracy below band, or far too slow while leaning on hints | `Decrease(1)` / `AdaptiveDecrease` |
//! | anything else | `Maintain` |
//!
//! Confidence is `sqrt(min(1, n / saturation)) * (0.5 + 0.5 * clarity)`, where
//! clarity measures how far the metrics sit from the band edges.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::exercise_engine::{
    models::{
        clean_response_time, DifficultyChange, DifficultyLevel, DifficultyRecommendation,
        PerformanceSample, PerformanceTrend, SessionMetrics, SessionSummary,
    },
    policy::{ConfigError, PolicyConfig},
};

/// Clarity assigned to a `Maintain` that sits outside the accuracy band.
const OFF_BAND_MAINTAIN_CLARITY: f64 = 0.25;
/// Largest clarity bonus a long streak adds to an increase.
const STREAK_CLARITY_BONUS: f64 = 0.2;
/// Weight of the hint-usage rate in decrease severity.
const HINT_SEVERITY_WEIGHT: f64 = 0.25;

/// Running counts over the whole session, independent of the history window.
#[derive(Debug, Clone, Default)]
struct SessionTotals {
    problems: usize,
    correct: usize,
    time_sum: f64,
    help_used: usize,
}

#[derive(Debug, Clone)]
pub struct DifficultyEngine {
    config: PolicyConfig,
    history: VecDeque<PerformanceSample>,
    totals: SessionTotals,
}

impl Default for DifficultyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DifficultyEngine {
    pub fn new() -> Self {
        DifficultyEngine {
            config: PolicyConfig::default(),
            history: VecDeque::new(),
            totals: SessionTotals::default(),
        }
    }

    pub fn with_config(config: PolicyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(DifficultyEngine {
            config,
            history: VecDeque::new(),
            totals: SessionTotals::default(),
        })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Samples currently inside the history window, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.history.iter()
    }

    /// Samples built as literals or deserialised skip `PerformanceSample::new`,
    /// so the response time is cleaned again here.
    pub fn record_performance(&mut self, mut sample: PerformanceSample) {
        sample.response_time_secs = clean_response_time(sample.response_time_secs);
        trace!(
            target: "difficulty",
            "sample {} correct={} time={:.2}s hints={}",
            sample.problem_id,
            sample.correct,
            sample.response_time_secs,
            sample.hints_used
        );

        self.totals.problems += 1;
        self.totals.time_sum += sample.response_time_secs;
        if sample.correct {
            self.totals.correct += 1;
        }
        if sample.used_help() {
            self.totals.help_used += 1;
        }

        self.history.push_back(sample);
        while self.history.len() > self.config.history_window {
            self.history.pop_front();
        }
    }

    /// Drop everything recorded so far.
    pub fn start_new_session(&mut self) {
        debug!(target: "difficulty", "new session after {} problems", self.totals.problems);
        self.history.clear();
        self.totals = SessionTotals::default();
    }

    pub fn analyze_performance(&self) -> SessionMetrics {
        let n = self.history.len();
        if n == 0 {
            return SessionMetrics::empty();
        }

        let (accuracy, average_response_time) = accuracy_and_time(self.history.iter());
        let hinted = self.history.iter().filter(|s| s.used_help()).count();

        SessionMetrics {
            average_response_time,
            accuracy,
            current_streak: self.history.iter().rev().take_while(|s| s.correct).count(),
            trend: self.trend(),
            sample_count: n,
            hint_usage_rate: hinted as f64 / n as f64,
        }
    }

    pub fn recommend_difficulty_adjustment(&self, current: DifficultyLevel) -> DifficultyRecommendation {
        let metrics = self.analyze_performance();
        let c = &self.config;
        let sample_factor =
            (metrics.sample_count as f64 / c.confidence_saturation as f64).min(1.0).sqrt();

        if metrics.sample_count < c.min_samples {
            return DifficultyRecommendation::maintain(sample_factor * 0.5);
        }

        let confidence_for = |clarity: f64| {
            let clarity = clarity.clamp(0.0, 1.0);
            (sample_factor * (0.5 + 0.5 * clarity)).clamp(0.0, 1.0)
        };

        let recommendation = if let Some(strength) = self.increase_strength(&metrics) {
            let streak_bonus = (metrics.current_streak as f64 / c.adaptive_streak.max(1) as f64)
                .min(1.0)
                * STREAK_CLARITY_BONUS;
            let change = if strength >= c.adaptive_strength && metrics.current_streak >= c.adaptive_streak {
                DifficultyChange::AdaptiveIncrease
            } else {
                DifficultyChange::Increase(1)
            };
            let confidence = confidence_for(strength + streak_bonus);
            if current.is_max() {
                DifficultyRecommendation::maintain(confidence)
            } else {
                DifficultyRecommendation { change, confidence, help_suggestions: Vec::new() }
            }
        } else if let Some(severity) = self.decrease_severity(&metrics) {
            let change = if severity >= c.adaptive_strength {
                DifficultyChange::AdaptiveDecrease
            } else {
                DifficultyChange::Decrease(1)
            };
            let confidence = confidence_for(severity);
            if current.is_min() {
                DifficultyRecommendation::maintain(confidence)
            } else {
                DifficultyRecommendation {
                    change,
                    confidence,
                    help_suggestions: self.help_suggestions(&metrics),
                }
            }
        } else {
            DifficultyRecommendation::maintain(confidence_for(self.maintain_clarity(&metrics)))
        };

        debug!(
            target: "difficulty",
            "at {current}: {} (confidence {:.2}) from accuracy {:.2}, avg {:.2}s, streak {}, trend {}",
            recommendation.change,
            recommendation.confidence,
            metrics.accuracy,
            metrics.average_response_time,
            metrics.current_streak,
            metrics.trend
        );
        recommendation
    }

    pub fn generate_session_summary(&self) -> SessionSummary {
        let t = &self.totals;
        SessionSummary {
            total_problems: t.problems,
            correct_answers: t.correct,
            average_time: if t.problems == 0 { 0.0 } else { t.time_sum / t.problems as f64 },
            help_used: t.help_used,
        }
    }

    // -----------------------------------------------------------------------
    // Policy internals
    // -----------------------------------------------------------------------

    /// Earliest third vs most recent third. Accuracy decides; when it is flat,
    /// a large enough change in speed does.
    fn trend(&self) -> PerformanceTrend {
        let n = self.history.len();
        if n < self.config.trend_min_samples {
            return PerformanceTrend::Stable;
        }
        let third = (n / 3).max(1);
        let (early_acc, early_time) = accuracy_and_time(self.history.iter().take(third));
        let (recent_acc, recent_time) = accuracy_and_time(self.history.iter().skip(n - third));

        let accuracy_shift = recent_acc - early_acc;
        if accuracy_shift > self.config.trend_accuracy_margin {
            return PerformanceTrend::Improving;
        }
        if accuracy_shift < -self.config.trend_accuracy_margin {
            return PerformanceTrend::Declining;
        }

        if early_time > 0.0 {
            let speedup = (early_time - recent_time) / early_time;
            if speedup > self.config.trend_speed_margin {
                return PerformanceTrend::Improving;
            }
            if speedup < -self.config.trend_speed_margin {
                return PerformanceTrend::Declining;
            }
        }
        PerformanceTrend::Stable
    }

    /// `Some(0..=1)` when the player is comfortably above target.
    fn increase_strength(&self, m: &SessionMetrics) -> Option<f64> {
        let c = &self.config;
        if m.accuracy <= c.target_accuracy_high || m.average_response_time >= c.response_time_ceiling {
            return None;
        }
        let accuracy_margin = (m.accuracy - c.target_accuracy_high) / (1.0 - c.target_accuracy_high);
        let speed_margin = (c.response_time_ceiling - m.average_response_time) / c.response_time_ceiling;
        Some(((accuracy_margin + speed_margin) / 2.0).clamp(0.0, 1.0))
    }

    /// `Some(0..=1)` when the player is struggling.
    fn decrease_severity(&self, m: &SessionMetrics) -> Option<f64> {
        let c = &self.config;
        let too_inaccurate = m.accuracy < c.target_accuracy_low;
        let far_too_slow = m.average_response_time > c.response_time_ceiling * c.slow_factor
            && m.hint_usage_rate >= c.high_hint_rate;
        if !too_inaccurate && !far_too_slow {
            return None;
        }

        let accuracy_deficit = if c.target_accuracy_low > 0.0 {
            ((c.target_accuracy_low - m.accuracy) / c.target_accuracy_low).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let time_excess =
            ((m.average_response_time - c.response_time_ceiling) / c.response_time_ceiling).clamp(0.0, 1.0);
        let severity = accuracy_deficit.max(time_excess) + HINT_SEVERITY_WEIGHT * m.hint_usage_rate;
        Some(severity.clamp(0.0, 1.0))
    }

    /// 1.0 in the middle of the accuracy band, 0.0 at its edges.
    fn maintain_clarity(&self, m: &SessionMetrics) -> f64 {
        let (low, high) = (self.config.target_accuracy_low, self.config.target_accuracy_high);
        if m.accuracy < low || m.accuracy > high {
            return OFF_BAND_MAINTAIN_CLARITY;
        }
        let half_width = (high - low) / 2.0;
        ((m.accuracy - low).min(high - m.accuracy) / half_width).clamp(0.0, 1.0)
    }

    fn help_suggestions(&self, m: &SessionMetrics) -> Vec<String> {
        let c = &self.config;
        let mut tips = Vec::new();
        if m.accuracy < c.target_accuracy_low {
            tips.push("Slow down and re-read each problem before answering.");
        }
        if m.average_response_time > c.response_time_ceiling {
            tips.push("Break bigger numbers into tens and ones to work faster.");
        }
        if m.hint_usage_rate >= c.high_hint_rate && m.hint_usage_rate > 0.0 {
            tips.push("Try working it out on scratch paper before asking for a hint.");
        }
        if m.trend == PerformanceTrend::Declining {
            tips.push("Take a short break, then come back to a few easier problems.");
        }
        if tips.is_empty() {
            tips.push("Try using scratch work for each step.");
        }
        tips.into_iter().map(String::from).collect()
    }
}

/// `(accuracy, mean response time)` over `samples`; zeros when empty.
fn accuracy_and_time<'a>(samples: impl Iterator<Item = &'a PerformanceSample>) -> (f64, f64) {
    let (mut count, mut correct, mut time) = (0usize, 0usize, 0.0f64);
    for s in samples {
        count += 1;
        time += s.response_time_secs;
        if s.correct {
            correct += 1;
        }
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    (correct as f64 / count as f64, time / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(correct: bool, time: f64, hints: u32) -> PerformanceSample {
        PerformanceSample::new("p", correct, time, hints)
    }

    fn engine_with(samples: impl IntoIterator<Item = PerformanceSample>) -> DifficultyEngine {
        let mut engine = DifficultyEngine::new();
        for s in samples {
            engine.record_performance(s);
        }
        engine
    }

    fn mid() -> DifficultyLevel {
        DifficultyLevel::new(5)
    }

    #[test]
    fn empty_engine_is_zeroed() {
        let engine = DifficultyEngine::new();
        assert_eq!(engine.analyze_performance(), SessionMetrics::empty());
        let rec = engine.recommend_difficulty_adjustment(mid());
        assert_eq!(rec.change, DifficultyChange::Maintain);
        assert_eq!(rec.confidence, 0.0);
        assert!(rec.help_suggestions.is_empty());
    }

    #[test]
    fn strong_fast_player_gets_adaptive_increase() {
        let engine = engine_with((0..12).map(|_| sample(true, 1.5, 0)));
        let rec = engine.recommend_difficulty_adjustment(mid());
        assert_eq!(rec.change, DifficultyChange::AdaptiveIncrease);
        assert!(rec.confidence > 0.5 && rec.confidence <= 1.0);
        assert!(rec.help_suggestions.is_empty());
    }

    #[test]
    fn modest_margin_gets_plain_increase() {
        // 9/10 correct, just under the ceiling: above band but not by much.
        let mut samples: Vec<_> = (0..9).map(|_| sample(true, 4.5, 0)).collect();
        samples.insert(3, sample(false, 4.5, 0));
        let engine = engine_with(samples);
        let rec = engine.recommend_difficulty_adjustment(mid());
        assert_eq!(rec.change, DifficultyChange::Increase(1));
    }

    #[test]
    fn struggling_player_gets_decrease_with_help() {
        let samples = (0..10).map(|i| sample(i % 2 == 0, 6.0, 0));
        let engine = engine_with(samples);
        let rec = engine.recommend_difficulty_adjustment(mid());
        assert!(rec.change.is_decrease(), "got {:?}", rec.change);
        assert!(!rec.help_suggestions.is_empty());
    }

    #[test]
    fn severe_struggle_is_adaptive_decrease() {
        let samples = (0..10).map(|i| sample(i == 4, 12.0, 2));
        let rec = engine_with(samples).recommend_difficulty_adjustment(mid());
        assert_eq!(rec.change, DifficultyChange::AdaptiveDecrease);
        assert!(rec.help_suggestions.iter().any(|t| t.contains("scratch paper")));
    }

    #[test]
    fn slow_with_hints_decreases_even_when_accurate() {
        let samples = (0..10).map(|_| sample(true, 9.0, 1));
        let rec = engine_with(samples).recommend_difficulty_adjustment(mid());
        assert!(rec.change.is_decrease(), "got {:?}", rec.change);
    }

    #[test]
    fn slow_without_hints_is_maintained() {
        let samples = (0..10).map(|_| sample(true, 9.0, 0));
        let rec = engine_with(samples).recommend_difficulty_adjustment(mid());
        assert_eq!(rec.change, DifficultyChange::Maintain);
    }

    #[test]
    fn limits_turn_moves_into_maintain() {
        let fast = engine_with((0..12).map(|_| sample(true, 1.0, 0)));
        let rec = fast.recommend_difficulty_adjustment(DifficultyLevel::MAX);
        assert_eq!(rec.change, DifficultyChange::Maintain);

        let slow = engine_with((0..12).map(|_| sample(false, 10.0, 1)));
        let rec = slow.recommend_difficulty_adjustment(DifficultyLevel::MIN);
        assert_eq!(rec.change, DifficultyChange::Maintain);
        assert!(rec.help_suggestions.is_empty());
    }

    #[test]
    fn confidence_grows_with_sample_count() {
        let mut engine = DifficultyEngine::new();
        let mut last = -1.0;
        for _ in 0..30 {
            engine.record_performance(sample(true, 1.0, 0));
            let c = engine.recommend_difficulty_adjustment(mid()).confidence;
            assert!((0.0..=1.0).contains(&c));
            assert!(c >= last, "confidence dropped from {last} to {c}");
            last = c;
        }
    }

    #[test]
    fn band_centre_is_more_confident_than_edge() {
        // 0.775 sits mid-band; 0.71 hugs the lower edge. Both have 200 samples.
        let centre = engine_with((0..200).map(|i| sample(i % 40 < 31, 3.0, 0)));
        let edge = engine_with((0..200).map(|i| sample(i % 100 < 71, 3.0, 0)));
        let a = centre.recommend_difficulty_adjustment(mid());
        let b = edge.recommend_difficulty_adjustment(mid());
        assert_eq!(a.change, DifficultyChange::Maintain);
        assert_eq!(b.change, DifficultyChange::Maintain);
        assert!(a.confidence > b.confidence);
    }

    #[test]
    fn declining_trend_detected() {
        let samples = (0..4)
            .map(|_| sample(true, 2.0, 0))
            .chain((0..4).map(|_| sample(true, 2.0, 0)))
            .chain((0..4).map(|_| sample(false, 2.0, 0)));
        assert_eq!(engine_with(samples).analyze_performance().trend, PerformanceTrend::Declining);
    }

    #[test]
    fn speed_decides_when_accuracy_is_flat() {
        let samples = (0..6).map(|_| sample(true, 8.0, 0)).chain((0..6).map(|_| sample(true, 2.0, 0)));
        assert_eq!(engine_with(samples).analyze_performance().trend, PerformanceTrend::Improving);

        let steady = (0..12).map(|_| sample(true, 3.0, 0));
        assert_eq!(engine_with(steady).analyze_performance().trend, PerformanceTrend::Stable);
    }

    #[test]
    fn short_history_has_stable_trend() {
        let samples = (0..5).map(|i| sample(i > 2, 1.0, 0));
        assert_eq!(engine_with(samples).analyze_performance().trend, PerformanceTrend::Stable);
    }

    #[test]
    fn window_bounds_history_but_not_summary() {
        let config = PolicyConfig { history_window: 10, ..PolicyConfig::default() };
        let mut engine = DifficultyEngine::with_config(config).unwrap();
        for i in 0..25 {
            engine.record_performance(sample(i >= 15, 1.0, 0));
        }
        assert_eq!(engine.history().count(), 10);
        let metrics = engine.analyze_performance();
        assert_eq!(metrics.sample_count, 10);
        assert_eq!(metrics.accuracy, 1.0);
        let summary = engine.generate_session_summary();
        assert_eq!(summary.total_problems, 25);
        assert_eq!(summary.correct_answers, 10);
    }

    #[test]
    fn bad_times_from_literals_and_json_are_cleaned() {
        let mut nan_first = DifficultyEngine::new();
        nan_first.record_performance(PerformanceSample {
            problem_id: "p".to_string(),
            correct: true,
            response_time_secs: f64::NAN,
            hints_used: 0,
        });
        for _ in 0..9 {
            nan_first.record_performance(sample(true, 2.0, 0));
        }
        let m = nan_first.analyze_performance();
        assert!((m.average_response_time - 1.8).abs() < 1e-9, "avg {}", m.average_response_time);
        let rec = nan_first.recommend_difficulty_adjustment(mid());
        assert!((0.0..=1.0).contains(&rec.confidence), "confidence {}", rec.confidence);

        let json = r#"{"problem_id":"p","correct":true,"response_time_secs":-40.0,"hints_used":0}"#;
        let mut negative = DifficultyEngine::new();
        for _ in 0..10 {
            negative.record_performance(serde_json::from_str(json).unwrap());
        }
        assert_eq!(negative.analyze_performance().average_response_time, 0.0);
        assert_eq!(negative.generate_session_summary().average_time, 0.0);
        assert!(negative.history().all(|s| s.response_time_secs == 0.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PolicyConfig { response_time_ceiling: 0.0, ..PolicyConfig::default() };
        assert!(DifficultyEngine::with_config(config).is_err());
    }
}

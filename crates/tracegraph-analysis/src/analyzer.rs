use crate::metrics::{structural_stats_with_limits, TraversalLimits};
use crate::patterns::{PatternDetector, PatternSummary};
use crate::synthetic::build_synthetic_trace;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracegraph_core::{RecursiveTrace, Result, TraceConfig, Traceable};
use tracing::{debug, info};

/// Combined structural analysis of one trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub depth: usize,
    pub breadth: usize,
    pub node_count: usize,
    pub branching_factor: f64,
    pub recursion_depth_index: f64,
    pub patterns: PatternSummary,
}

/// Front door for trace extraction and analysis.
///
/// Extraction appends the produced trace to an in-memory history guarded by
/// a mutex, so one analyzer can be shared across threads. Analysis is
/// read-only and never touches the history; callers who do not want
/// accumulation can drain it with [`Self::take_history`] or skip the
/// analyzer entirely and use the free functions in [`crate::metrics`].
pub struct TraceAnalyzer {
    limits: TraversalLimits,
    detectors: Vec<Box<dyn PatternDetector>>,
    history: Mutex<Vec<RecursiveTrace>>,
}

impl Default for TraceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceAnalyzer {
    pub fn new() -> Self {
        Self {
            limits: TraversalLimits::default(),
            detectors: Vec::new(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Bound every traversal this analyzer performs.
    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Register a pattern detector. Detectors run in registration order
    /// during [`Self::analyze`].
    pub fn with_detector(mut self, detector: Box<dyn PatternDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Extract a trace from a [`Traceable`] system and record it in the
    /// history. The returned trace's `depth` is the depth computed during
    /// conversion, not whatever the system claimed.
    pub fn extract_trace<S: Traceable>(
        &self,
        system: &S,
        input: &Value,
        config: &TraceConfig,
    ) -> Result<RecursiveTrace> {
        let system_trace = system.process_with_trace(input, config)?;
        let trace = RecursiveTrace::from_system(system_trace)?;
        info!(depth = trace.depth, root = %trace.root.id, "extracted trace");
        self.history.lock().push(trace.clone());
        Ok(trace)
    }

    /// Build a synthetic placeholder trace and record it in the history.
    pub fn build_synthetic(&self, max_depth: usize, input: Value) -> Result<RecursiveTrace> {
        let trace = build_synthetic_trace(max_depth, input)?;
        self.history.lock().push(trace.clone());
        Ok(trace)
    }

    /// Compute structural metrics and run registered pattern detectors.
    ///
    /// Fails with no partial results if the trace is malformed or exceeds
    /// the analyzer's traversal limits.
    pub fn analyze(&self, trace: &RecursiveTrace) -> Result<AnalysisResult> {
        let stats = structural_stats_with_limits(&trace.root, &self.limits)?;

        let mut patterns = PatternSummary::default();
        for detector in &self.detectors {
            let records = detector.detect(trace)?;
            debug!(detector = detector.name(), records = records.len(), "ran detector");
            for record in records {
                patterns.push(record);
            }
        }

        debug!(
            depth = stats.depth,
            node_count = stats.node_count,
            branching_factor = stats.branching_factor(),
            "analyzed trace"
        );

        Ok(AnalysisResult {
            depth: stats.depth,
            breadth: stats.breadth,
            node_count: stats.node_count,
            branching_factor: stats.branching_factor(),
            recursion_depth_index: stats.recursion_depth_index(),
            patterns,
        })
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn history_snapshot(&self) -> Vec<RecursiveTrace> {
        self.history.lock().clone()
    }

    /// Drain the history, handing ownership of accumulated traces back to
    /// the caller. Keeps long-lived analyzers from growing without bound.
    pub fn take_history(&self) -> Vec<RecursiveTrace> {
        std::mem::take(&mut *self.history.lock())
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternKind, PatternRecord};
    use crate::synthetic::SyntheticSystem;
    use serde_json::json;

    #[test]
    fn ternary_round_trip_at_depth_three() {
        let analyzer = TraceAnalyzer::new();
        let trace = analyzer.build_synthetic(3, json!("input")).unwrap();
        let result = analyzer.analyze(&trace).unwrap();

        assert_eq!(result.depth, 3);
        assert_eq!(result.breadth, 3);
        assert_eq!(result.node_count, 40);
        assert_eq!(result.branching_factor, 3.0);
        // uniform fan-out of 3 gives bf > 1, so the index is positive
        let expected = (3.0 / 40.0) * 3.0f64.ln();
        assert!((result.recursion_depth_index - expected).abs() < 1e-12);
        assert!(result.patterns.is_empty());
    }

    #[test]
    fn single_node_trace_has_zero_factor_and_index() {
        let analyzer = TraceAnalyzer::new();
        let trace = analyzer.build_synthetic(0, json!("input")).unwrap();
        let result = analyzer.analyze(&trace).unwrap();

        assert_eq!(result.depth, 0);
        assert_eq!(result.breadth, 1);
        assert_eq!(result.node_count, 1);
        assert_eq!(result.branching_factor, 0.0);
        assert_eq!(result.recursion_depth_index, 0.0);
    }

    #[test]
    fn extraction_goes_through_the_capability_trait() {
        let analyzer = TraceAnalyzer::new();
        let config = TraceConfig {
            max_depth: 2,
            ..TraceConfig::default()
        };
        let trace = analyzer
            .extract_trace(&SyntheticSystem, &json!("query"), &config)
            .unwrap();
        assert_eq!(trace.depth, 2);
        assert_eq!(analyzer.history_len(), 1);
    }

    #[test]
    fn analyze_does_not_touch_history() {
        let analyzer = TraceAnalyzer::new();
        let trace = analyzer.build_synthetic(1, json!("x")).unwrap();
        assert_eq!(analyzer.history_len(), 1);
        analyzer.analyze(&trace).unwrap();
        analyzer.analyze(&trace).unwrap();
        assert_eq!(analyzer.history_len(), 1);
    }

    #[test]
    fn take_history_drains_accumulated_traces() {
        let analyzer = TraceAnalyzer::new();
        analyzer.build_synthetic(1, json!("a")).unwrap();
        analyzer.build_synthetic(2, json!("b")).unwrap();
        let taken = analyzer.take_history();
        assert_eq!(taken.len(), 2);
        assert_eq!(analyzer.history_len(), 0);
    }

    struct RootFanOut;

    impl PatternDetector for RootFanOut {
        fn name(&self) -> &str {
            "root-fan-out"
        }

        fn detect(&self, trace: &RecursiveTrace) -> Result<Vec<PatternRecord>> {
            Ok(vec![PatternRecord {
                kind: PatternKind::Branching,
                measurement: trace.root.children.len() as f64,
                location: trace.root.id.clone(),
            }])
        }
    }

    #[test]
    fn registered_detectors_fill_the_summary() {
        let analyzer = TraceAnalyzer::new().with_detector(Box::new(RootFanOut));
        let trace = analyzer.build_synthetic(2, json!("x")).unwrap();
        let result = analyzer.analyze(&trace).unwrap();

        assert_eq!(result.patterns.branching_patterns.len(), 1);
        let record = &result.patterns.branching_patterns[0];
        assert_eq!(record.measurement, 3.0);
        assert_eq!(record.location, "input_0");
        assert!(result.patterns.sequential_chains.is_empty());
        assert!(result.patterns.recursive_loops.is_empty());
    }
}

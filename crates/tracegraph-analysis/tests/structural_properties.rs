use anyhow::Result;
use serde_json::json;
use tracegraph_analysis::{
    build_synthetic_trace, structural_stats, structural_stats_with_limits, TraceAnalyzer,
    TraversalLimits,
};
use tracegraph_core::{RecursiveTrace, SystemStep, SystemTrace, TraceGraphError};

fn ternary_nodes(d: usize) -> usize {
    (3usize.pow(d as u32 + 1) - 1) / 2
}

#[test]
fn synthetic_traces_match_closed_form_node_counts() -> Result<()> {
    for d in 0..=5 {
        let trace = build_synthetic_trace(d, json!("payload"))?;
        let stats = structural_stats(&trace.root)?;
        assert_eq!(trace.depth, d);
        assert_eq!(stats.node_count, ternary_nodes(d));
        if d >= 1 {
            // every internal node of a complete ternary tree has 3 children
            assert_eq!(stats.branching_factor(), 3.0);
        }
    }
    Ok(())
}

#[test]
fn chain_traces_have_unit_breadth_and_zero_index() -> Result<()> {
    let mut steps = vec![SystemStep::root("s0", json!("start"))];
    for i in 1..6 {
        steps.push(SystemStep::child(
            format!("s{}", i),
            format!("s{}", i - 1),
            json!(i),
        ));
    }
    let trace = RecursiveTrace::from_system(SystemTrace { steps })?;

    let analyzer = TraceAnalyzer::new();
    let result = analyzer.analyze(&trace)?;
    assert_eq!(result.depth, 5);
    assert_eq!(result.breadth, 1);
    assert_eq!(result.node_count, 6);
    // every internal node of a chain has exactly one child
    assert_eq!(result.branching_factor, 1.0);
    assert_eq!(result.recursion_depth_index, 0.0);
    Ok(())
}

#[test]
fn budgeted_analyzer_rejects_oversized_traces_in_bounded_time() -> Result<()> {
    let analyzer =
        TraceAnalyzer::new().with_limits(TraversalLimits::default().with_max_nodes(10));
    let trace = build_synthetic_trace(4, json!("big"))?;
    let err = analyzer.analyze(&trace).unwrap_err();
    assert!(matches!(err, TraceGraphError::MalformedTrace(_)));
    Ok(())
}

#[test]
fn repeated_id_from_a_foreign_trace_is_rejected() -> Result<()> {
    // the shape an unrolled back-edge takes after crossing a serialization
    // boundary: a descendant carrying an ancestor's id
    let json_trace = json!({
        "root": {
            "id": "r",
            "kind": "Input",
            "content": null,
            "metadata": {},
            "children": [{
                "id": "a",
                "kind": "Transformation",
                "content": null,
                "metadata": {},
                "children": [{
                    "id": "r",
                    "kind": "Transformation",
                    "content": null,
                    "metadata": {},
                    "children": []
                }]
            }]
        },
        "depth": 2,
        "metadata": {}
    });
    let trace: RecursiveTrace = serde_json::from_value(json_trace)?;
    let limits = TraversalLimits::default()
        .with_max_nodes(1000)
        .with_repeated_id_check();
    let err = structural_stats_with_limits(&trace.root, &limits).unwrap_err();
    assert!(matches!(err, TraceGraphError::MalformedTrace(_)));
    Ok(())
}

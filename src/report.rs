//! Ranked textual report over evaluation results

use crate::scoring::EvaluationResult;
use std::cmp::Ordering;

/// Sort results for presentation: descending by novel graph score, with
/// failed experiments last regardless of any numbers they carry. Ties
/// break on directory name so output is stable.
pub fn rank(results: &mut [EvaluationResult]) {
    results.sort_by(|a, b| {
        ordering_score(b)
            .partial_cmp(&ordering_score(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.directory.cmp(&b.directory))
    });
}

/// Ordering key only; never stored on the result.
fn ordering_score(result: &EvaluationResult) -> f64 {
    if result.error.is_some() {
        -1.0
    } else {
        result.novel_graph_score
    }
}

/// Render the ranked results as a plain-text report.
pub fn render(results: &[EvaluationResult]) -> String {
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let mut out = String::new();

    out.push_str(&format!(
        "Knowledge-graph experiment ranking — generated {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!(
        "Experiments: {} ({} failed)\n",
        results.len(),
        failed
    ));

    for (position, result) in results.iter().enumerate() {
        out.push('\n');
        match &result.error {
            Some(error) => {
                out.push_str(&format!(
                    "#{}  {} [FAILED]\n    error: {}\n",
                    position + 1,
                    result.directory,
                    error
                ));
                out.push_str(&format!(
                    "    nodes: {}, edges: {}\n",
                    result.node_count, result.edge_count
                ));
            }
            None => {
                out.push_str(&format!("#{}  {}\n", position + 1, result.directory));
                out.push_str(&format!(
                    "    novel graph score: {:.4}\n",
                    result.novel_graph_score
                ));
                out.push_str(&format!(
                    "    focus:     {:.4}  (protagonist '{}' centrality {:.4})\n",
                    result.focus_score, result.protagonist_id, result.protagonist_centrality
                ));
                out.push_str(&format!(
                    "    structure: {:.4}  (connectivity {:.4}, scope {} -> {:.4})\n",
                    result.structure_score,
                    result.connectivity_score,
                    result.raw_scope,
                    result.normalized_scope
                ));
                out.push_str(&format!(
                    "    richness:  {:.4}  (desc len {:.2} -> {:.4}, diversity {:.4}, strength {:.2} -> {:.4})\n",
                    result.richness_score,
                    result.raw_avg_description_length,
                    result.normalized_avg_description_length,
                    result.relationship_diversity,
                    result.raw_avg_relation_strength,
                    result.normalized_avg_relation_strength
                ));
                out.push_str(&format!(
                    "    nodes: {}, edges: {}\n",
                    result.node_count, result.edge_count
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(directory: &str, score: f64, error: Option<&str>) -> EvaluationResult {
        let mut result = EvaluationResult::failed(
            directory.to_string(),
            "P".to_string(),
            String::new(),
        );
        result.error = error.map(str::to_string);
        result.novel_graph_score = score;
        result
    }

    #[test]
    fn ranks_descending_by_score() {
        let mut results = vec![
            result("low", 0.2, None),
            result("high", 0.9, None),
            result("mid", 0.5, None),
        ];
        rank(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.directory.as_str()).collect();
        assert_eq!(order, ["high", "mid", "low"]);
    }

    #[test]
    fn failures_sort_last_even_with_nonzero_score() {
        let mut results = vec![
            result("broken", 0.99, Some("source file not found")),
            result("ok", 0.0, None),
        ];
        rank(&mut results);
        assert_eq!(results[0].directory, "ok");
        assert_eq!(results[1].directory, "broken");
        // Ordering key is synthetic; the stored score is untouched.
        assert_eq!(results[1].novel_graph_score, 0.99);
    }

    #[test]
    fn ties_break_on_directory_name() {
        let mut results = vec![
            result("zeta", 0.5, None),
            result("alpha", 0.5, None),
        ];
        rank(&mut results);
        assert_eq!(results[0].directory, "alpha");
    }

    #[test]
    fn renders_error_block_for_failures() {
        let results = vec![result("broken", 0.0, Some("source file not found"))];
        let text = render(&results);
        assert!(text.contains("#1  broken [FAILED]"));
        assert!(text.contains("error: source file not found"));
        assert!(text.contains("1 failed"));
    }

    #[test]
    fn renders_score_breakdown_for_successes() {
        let mut success = result("good", 0.0, None);
        success.novel_graph_score = 0.75;
        success.focus_score = 0.9;
        let text = render(&[success]);
        assert!(text.contains("#1  good"));
        assert!(text.contains("novel graph score: 0.7500"));
        assert!(text.contains("focus:     0.9000"));
    }

    #[test]
    fn empty_input_renders_headers_only() {
        let text = render(&[]);
        assert!(text.contains("Experiments: 0 (0 failed)"));
        assert!(!text.contains('#'));
    }
}

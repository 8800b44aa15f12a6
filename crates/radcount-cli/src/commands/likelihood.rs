use super::DetectorSettings;

pub fn run(settings: &DetectorSettings, counts: &[u64], json: bool) {
    let counter = super::make_simulator(settings);
    let expected = counter.expected_counts();
    let per_run: Vec<f64> = counts.iter().map(|&c| counter.get_likelihood(c)).collect();
    let log_likelihood = counter.get_log_likelihood(counts);

    if json {
        super::print_json(&serde_json::json!({
            "expected_counts": expected,
            "counts": counts,
            "likelihood": per_run,
            // Non-finite values serialize as null.
            "log_likelihood": log_likelihood.is_finite().then_some(log_likelihood),
        }));
        return;
    }

    println!("Expected counts per run: {expected:.3}");
    println!();
    for (c, l) in counts.iter().zip(&per_run) {
        println!("  P(N = {c:>6}) = {l:.6e}");
    }
    if counts.len() > 1 {
        println!();
        println!("  log-likelihood of series: {log_likelihood:.4}");
    }
}

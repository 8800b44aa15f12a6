use radcount_core::summarize;

use super::DetectorSettings;

pub fn run(settings: &DetectorSettings, reps: usize, json: bool) {
    let counter = super::make_simulator(settings);
    let expected = counter.expected_counts();
    let data = counter.get_data(reps);
    let summary = summarize(&data);

    if json {
        super::print_json(&serde_json::json!({
            "expected_counts": expected,
            "counting_time": counter.counting_time(),
            "efficiency": counter.efficiency(),
            "background": counter.background(),
            "activity": counter.source().map(|s| s.activity()),
            "counts": data,
            "summary": summary,
        }));
        return;
    }

    println!(
        "Simulated {reps} run(s) of {} s, expected {expected:.3} counts per run",
        counter.counting_time()
    );
    println!();
    for (i, c) in data.iter().enumerate() {
        println!("  run {:>4}: {c}", i + 1);
    }

    let Some(s) = summary else {
        return;
    };
    println!();
    println!("  mean       {:.3} ± {:.3}", s.mean, s.std_error);
    println!("  variance   {:.3}", s.variance);
    match s.dispersion_p_value {
        Some(p) => println!(
            "  dispersion {:.3} (chi2, {} dof) p = {p:.4}",
            s.dispersion_index,
            s.n - 1
        ),
        None => println!("  dispersion n/a"),
    }
}

use radcount_server::ServerConfig;

pub fn run(host: &str, port: u16, config: ServerConfig) {
    let base = format!("http://{host}:{port}");

    println!("🔬 radcount counting service v{}", radcount_core::VERSION);
    println!("   {base}");
    println!(
        "   efficiency {}, background {} Hz, lab source {} Bq{}",
        config.efficiency,
        config.background,
        config.lab_source_activity,
        if config.realtime { ", realtime" } else { "" }
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /                                       API index");
    println!("     GET /get_counts/{{id}}/{{time_us}}/{{activity_us}}  Count decays");
    println!("     GET /health                                 Health check");
    println!();
    println!("   Examples:");
    println!("     curl {base}/get_counts/0/10000000/0");
    println!("     curl {base}/get_counts/0/10000000/-1");
    println!("     radcount measure --url {base} --lab-source");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(radcount_server::run_server(config, host, port)) {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

use indexmap::IndexMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unitopt::{GeneratorData, SolverFactory, UnitCommitment};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Solver comes from UNITOPT_SOLVER, falling back to the best backend in this build
    let solver = std::env::var("UNITOPT_SOLVER").unwrap_or_else(|_| "auto".to_string());
    println!("Available solvers: {:?}", SolverFactory::available_backends());

    let gen_data = IndexMap::from([
        ("G1".to_string(), GeneratorData::new(100.0, 20.0, 50.0)),
        ("G2".to_string(), GeneratorData::new(150.0, 10.0, 100.0)),
    ]);

    for demand in [80.0, 130.0] {
        println!("\n=== Unit commitment, demand {} MW ===\n", demand);
        let mut model = UnitCommitment::new(["G1", "G2"], gen_data.clone(), demand).into_model(&solver)?;
        model.solve(false)?;
        model.print_results();
    }

    Ok(())
}

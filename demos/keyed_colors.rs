use sigmoid_mlp::{Example, NetworkBuilder, Record, TrainConfig, Value};

fn sample(r: f64, g: f64, b: f64, label: &str) -> Example {
    Example::new(
        Record::from([("r", r), ("g", g), ("b", b)]),
        Record::from([(label, 1.0)]),
    )
}

fn main() -> sigmoid_mlp::Result<()> {
    env_logger::init();

    let data = vec![
        sample(1.0, 0.1, 0.1, "red"),
        sample(0.9, 0.0, 0.2, "red"),
        sample(0.1, 1.0, 0.1, "green"),
        sample(0.0, 0.9, 0.2, "green"),
        sample(0.1, 0.1, 1.0, "blue"),
        sample(0.2, 0.0, 0.9, "blue"),
    ];

    let mut net = NetworkBuilder::new().hidden_layers([6]).seed(1).build()?;
    let report = net.train(
        &data,
        &TrainConfig {
            log_period: Some(500),
            ..TrainConfig::default()
        },
    )?;
    println!("trained {} epochs, error={}", report.iterations, report.error);

    let eval = net.evaluate(&data)?;
    println!(
        "error={} misclassified={}",
        eval.error,
        eval.misclassifications.len()
    );

    // Unknown keys are ignored; missing keys read as zero.
    let query = Value::Keyed(Record::from([("r", 0.8), ("b", 0.3), ("uv", 2.0)]));
    if let Value::Keyed(out) = net.run(&query)? {
        for (label, score) in out.iter() {
            println!("{label}: {score:.4}");
        }
    }
    Ok(())
}

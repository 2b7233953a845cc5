use sigmoid_mlp::{Example, NetworkBuilder, TrainConfig};

fn main() -> sigmoid_mlp::Result<()> {
    env_logger::init();

    let data = vec![
        Example::new([0.0, 0.0], [0.0]),
        Example::new([0.0, 1.0], [0.0]),
        Example::new([1.0, 0.0], [0.0]),
        Example::new([1.0, 1.0], [1.0]),
    ];

    // 2 -> 3 -> 1, hidden width derived from the input width.
    let mut net = NetworkBuilder::new().seed(0).build()?;
    let report = net.train_with_callback(
        &data,
        &TrainConfig {
            log_period: Some(1_000),
            callback_period: 5_000,
            ..TrainConfig::default()
        },
        |status| println!("epoch={} error={}", status.iterations, status.error),
    )?;
    println!("trained {} epochs, error={}", report.iterations, report.error);

    let eval = net.evaluate(&data)?;
    if let Some(stats) = eval.binary {
        println!(
            "accuracy={} precision={} recall={}",
            stats.accuracy, stats.precision, stats.recall
        );
    }

    for ex in &data {
        let x = ex.input.as_vector().unwrap_or_default();
        let y = net.forward(x)[0];
        println!("x={x:?} y={y:.4}");
    }
    Ok(())
}

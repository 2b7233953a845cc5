use sigmoid_mlp::{Example, Network, NetworkBuilder, TrainConfig};

fn main() -> sigmoid_mlp::Result<()> {
    env_logger::init();

    let data = vec![
        Example::new([0.0, 0.0], [0.0]),
        Example::new([0.0, 1.0], [1.0]),
        Example::new([1.0, 0.0], [1.0]),
        Example::new([1.0, 1.0], [1.0]),
    ];

    let mut net = NetworkBuilder::new().seed(0).build()?;
    net.train(&data, &TrainConfig::default())?;

    let path = "target/tmp_sigmoid_mlp.json";
    net.save_json(path)?;

    let mut loaded = Network::load_json(path)?;
    for input in [[0.0, 0.0], [1.0, 1.0]] {
        assert_eq!(loaded.forward(&input), net.forward(&input));
    }
    println!("saved and loaded model: {path}");

    // Resume training from the restored parameters.
    let report = loaded.train(
        &data,
        &TrainConfig {
            iterations: 100,
            keep_parameters: true,
            ..TrainConfig::default()
        },
    )?;
    println!("resumed for {} epochs, error={}", report.iterations, report.error);
    Ok(())
}

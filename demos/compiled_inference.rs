use sigmoid_mlp::{CompiledNetwork, Example, NetworkBuilder, Record, TrainConfig, Value};

fn main() -> sigmoid_mlp::Result<()> {
    env_logger::init();

    let data = vec![
        Example::new(
            Record::from([("sunny", 1.0), ("windy", 0.0)]),
            Record::from([("beach", 1.0)]),
        ),
        Example::new(
            Record::from([("sunny", 0.0), ("windy", 1.0)]),
            Record::from([("museum", 1.0)]),
        ),
    ];

    let mut net = NetworkBuilder::new().seed(3).build()?;
    net.train(&data, &TrainConfig::default())?;

    // A compiled network is immutable and needs no scratch state.
    let json = net.to_json_string()?;
    let compiled = CompiledNetwork::from_json_str(&json)?;

    let query = Value::Keyed(Record::from([("sunny", 1.0)]));
    let fast = compiled.run(&query)?;
    assert_eq!(fast, net.run(&query)?);
    println!("compiled: {fast:?}");
    Ok(())
}

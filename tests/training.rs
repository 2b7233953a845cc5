use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sigmoid_mlp::{Example, Network, NetworkBuilder, Record, TrainConfig, Value};

fn and_gate() -> Vec<Example> {
    vec![
        Example::new([0.0, 0.0], [0.0]),
        Example::new([0.0, 1.0], [0.0]),
        Example::new([1.0, 0.0], [0.0]),
        Example::new([1.0, 1.0], [1.0]),
    ]
}

#[test]
fn and_gate_converges_and_evaluates_perfectly() {
    let mut net = NetworkBuilder::new().seed(42).build().unwrap();
    let cfg = TrainConfig {
        iterations: 20_000,
        error_threshold: 0.005,
        learning_rate: Some(0.3),
        ..TrainConfig::default()
    };

    let report = net.train(&and_gate(), &cfg).unwrap();
    assert!(report.error <= 0.005, "error {}", report.error);
    assert!(report.iterations < 20_000);

    let eval = net.evaluate(&and_gate()).unwrap();
    let stats = eval.binary.unwrap();
    assert_eq!(stats.accuracy, 1.0);
    assert_eq!(stats.total, 4);
    assert_eq!((stats.true_pos, stats.true_neg), (1, 3));
    assert!(eval.misclassifications.is_empty());
    assert!(eval.error < 0.01);
}

#[test]
fn forward_stays_in_sigmoid_range_for_random_topologies() {
    let mut rng = StdRng::seed_from_u64(2024);
    for seed in 0..20 {
        let depth = rng.random_range(2..5);
        let sizes: Vec<usize> = (0..depth).map(|_| rng.random_range(1..8)).collect();

        let mut net = NetworkBuilder::new().seed(seed).build().unwrap();
        net.initialize(&sizes, false).unwrap();

        let input: Vec<f64> = (0..sizes[0]).map(|_| rng.random_range(-5.0..5.0)).collect();
        net.forward(&input);
        for l in 1..sizes.len() {
            assert!(net.outputs(l).iter().all(|&y| y > 0.0 && y < 1.0));
        }
        assert_eq!(net.outputs(sizes.len() - 1).len(), sizes[sizes.len() - 1]);
    }
}

#[test]
fn momentum_carries_across_epochs() {
    let mut net = NetworkBuilder::new().seed(7).momentum(0.5).build().unwrap();
    let cfg = TrainConfig {
        iterations: 2,
        error_threshold: 0.0,
        ..TrainConfig::default()
    };
    net.train(&and_gate(), &cfg).unwrap();

    // The next step blends the change recorded by the last step of the run.
    let lr = 0.3;
    let prev = net.layer(2).unwrap().changes().to_vec();
    net.forward(&[1.0, 1.0]);
    net.backpropagate(&[1.0], lr);

    let hidden = net.outputs(1).to_vec();
    let delta = net.deltas(2)[0];
    let changes = net.layer(2).unwrap().changes();
    for (k, &h) in hidden.iter().enumerate() {
        assert_abs_diff_eq!(changes[k], lr * delta * h + 0.5 * prev[k], epsilon = 1e-15);
    }
    assert!(prev.iter().any(|&c| c != 0.0));
}

#[test]
fn keyed_multiclass_training_and_inference() {
    let sample = |r: f64, g: f64, b: f64, label: &str| {
        Example::new(
            Record::from([("r", r), ("g", g), ("b", b)]),
            Record::from([(label, 1.0)]),
        )
    };
    let data = vec![
        sample(1.0, 0.1, 0.1, "red"),
        sample(0.9, 0.0, 0.2, "red"),
        sample(0.1, 1.0, 0.1, "green"),
        sample(0.0, 0.9, 0.2, "green"),
        sample(0.1, 0.1, 1.0, "blue"),
        sample(0.2, 0.0, 0.9, "blue"),
    ];

    let mut net = NetworkBuilder::new().hidden_layers([6]).seed(1).build().unwrap();
    let report = net.train(&data, &TrainConfig::default()).unwrap();
    assert!(report.error <= 0.005);
    assert_eq!(net.output_lookup().unwrap().keys(), ["red", "green", "blue"]);

    let eval = net.evaluate(&data).unwrap();
    assert!(eval.binary.is_none());
    assert!(eval.misclassifications.is_empty());

    let out = net
        .run(&Value::Keyed(Record::from([("g", 1.0), ("infrared", 4.0)])))
        .unwrap();
    let record = out.as_record().unwrap();
    let green = record.get("green").copied().unwrap();
    assert!(green > record.get("red").copied().unwrap());
    assert!(green > record.get("blue").copied().unwrap());
}

#[test]
fn training_logs_through_the_log_facade() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut net = Network::new();
    let cfg = TrainConfig {
        iterations: 30,
        log_period: Some(10),
        ..TrainConfig::default()
    };
    let report = net.train(&and_gate(), &cfg).unwrap();
    assert!(report.iterations <= 30);
}

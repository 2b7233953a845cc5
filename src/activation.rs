//! Sigmoid activation.
//!
//! Every unit in the network computes `y = sigmoid(z)` over its weighted input
//! sum. We cache the post-activation output `y` in `Scratch` and express the
//! derivative in terms of it, so backprop never needs the pre-activation `z`.

/// Logistic sigmoid, `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid expressed via its cached output `y`.
#[inline]
pub fn sigmoid_grad_from_output(y: f64) -> f64 {
    y * (1.0 - y)
}

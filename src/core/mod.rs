use rand::distr::{Alphanumeric, SampleString};

pub mod channel;

/// Producer / consumer traits.
pub mod item;

/// The streaming encode stage and its pull-based stream.
pub mod stage;

pub mod step;

/// Generates a random name consisting of alphanumeric characters.
///
/// # Returns
///
/// A `String` containing the generated random name.
fn build_name() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 8)
}

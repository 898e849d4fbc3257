mod deterministic_provider;

pub use deterministic_provider::DeterministicProvider;

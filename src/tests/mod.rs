//! Test modules and shared helpers. The `util` fixtures are also exposed to
//! the benchmarks through the `benchmarking` feature.

pub mod util;

pub mod action_executor;
pub mod command;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod dashboard;
pub mod go_alias;
pub mod interpolate;
pub mod keybinds;
pub mod launcher;
pub mod local_store;
pub mod logging;
pub mod model;
pub mod pattern;
pub mod patterns;
pub mod runtime;
pub mod search;
pub mod tokenizer;
pub mod transport;
pub mod usage;

#[cfg(test)]
mod tests {
    mod query_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/query_latency_test.rs"
        ));
    }
}

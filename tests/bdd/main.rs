//! BDD runner for the fixture steps
//!
//! ```bash
//! cargo test --test bdd
//! ```

mod steps;

use cucumber::World;
use futures::FutureExt;
use std::path::Path;
use steps::world::FixtureWorld;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .init();

    let features_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("features");

    FixtureWorld::cucumber()
        .max_concurrent_scenarios(1)
        .after(|_feature, _rule, _scenario, _finished, world| {
            async move {
                if let Some(world) = world {
                    world.clean_up().await;
                }
            }
            .boxed_local()
        })
        .run_and_exit(features_dir)
        .await;
}

/*! Integration tests for Tabula.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for Path construction, slicing and its textual form
 * - json: Tests for value lookup, overlays and merge through the public API
 * - store: Tests for the DocumentStore implementations and batching
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tabula=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod json;
mod path;
mod store;

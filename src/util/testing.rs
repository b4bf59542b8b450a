//! Test support: logging setup and project fixtures

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Once;

use tempfile::TempDir;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Temporary project with a template and the given root entries.
///
/// `dirs` become directories and `files` plain files, both relative to
/// `root` inside the project. The template is written to `template`
/// relative to the project.
pub fn project_fixture(
    template: &str,
    content: &str,
    root: &str,
    dirs: &[&str],
    files: &[&str],
) -> std::io::Result<TempDir> {
    let temp = TempDir::new()?;
    let root_dir = temp.path().join(root);
    fs::create_dir_all(&root_dir)?;
    write_file(&temp.path().join(template), content)?;
    for dir in dirs {
        fs::create_dir_all(root_dir.join(dir))?;
    }
    for file in files {
        write_file(&root_dir.join(file), "")?;
    }
    Ok(temp)
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

pub mod generate;
pub mod sweep;
pub mod template;

use solvgen::engine::config::PackingSettings;
use solvgen::engine::packing::PackmolRunner;

fn packer(settings: &PackingSettings) -> PackmolRunner {
    PackmolRunner::new(settings.executable.clone()).with_timeout(settings.timeout)
}

pub mod assertions;
pub mod fixtures;
pub mod logging;

pub use assertions::{assert_contains, assert_exit_code, parse_stdout_json};
pub use fixtures::{TestEnv, fixture_path};
pub use logging::init_test_logging;

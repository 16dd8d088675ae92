//! Binds the feature files to the step registry.

use crate::fixtures::{SpecWorld, spec_world};
use rstest_bdd_macros::scenarios;

scenarios!(
    "tests/features/bindings.feature",
    fixtures = [spec_world: SpecWorld]
);
scenarios!(
    "tests/features/hooks.feature",
    fixtures = [spec_world: SpecWorld]
);
scenarios!(
    "tests/features/shared_examples.feature",
    fixtures = [spec_world: SpecWorld]
);
scenarios!(
    "tests/features/selection.feature",
    fixtures = [spec_world: SpecWorld]
);

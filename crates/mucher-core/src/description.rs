//! Description script for the `much` randomizer.

use crate::model::VariantSpec;

/// File name the description is written to inside the working area.
pub const DESCRIPTION_FILE: &str = "description";

/// Build the randomizer script for `spec`.
///
/// One `use` directive per category, in the order given by the spec.
pub fn build_description(spec: &VariantSpec) -> String {
    let mut script = String::new();
    script.push_str("directory \".\";\n");
    script.push_str(&format!("seed {};\n", spec.seed()));
    script.push_str(&format!("serial {};\n", spec.serial_start()));
    for category in spec.categories() {
        script.push_str(&format!(
            "use {} from \"{category}-*\";\n",
            spec.usage_per_category()
        ));
    }
    script.push_str(&format!("create {};\n", spec.variant_count()));
    script
}

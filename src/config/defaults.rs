//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

pub fn project() -> String {
    "project".into()
}

/// Output directory used when a section sets none (relative to the tool directory).
pub const OUTPUT_DIR: &str = "compiled";

// ============================================================================
// [js] Section Defaults
// ============================================================================

pub mod js {
    /// Google Closure Compiler, shipped as a jar in the tool directory.
    pub fn minifier() -> Vec<String> {
        [
            "java",
            "-jar",
            "{tools}/closure_compiler.jar",
            "--js={input}",
            "--js_output_file={output}",
            "--warning_level=QUIET",
        ]
        .map(String::from)
        .to_vec()
    }
}

// ============================================================================
// [css] Section Defaults
// ============================================================================

pub mod css {
    /// YUI Compressor, shipped as a jar in the tool directory.
    pub fn minifier() -> Vec<String> {
        [
            "java",
            "-jar",
            "{tools}/yuicompressor-2.4.2.jar",
            "-o",
            "{output}",
            "--type",
            "css",
            "{input}",
        ]
        .map(String::from)
        .to_vec()
    }
}

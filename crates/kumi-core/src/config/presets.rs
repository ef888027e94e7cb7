//! Built-in presets and defaults

/// Presets used when the modern syntax flag is on (the default)
pub const ESNEXT_PRESETS: &[&str] = &["kumi/esnext", "kumi/plugins"];

/// Presets used with `esnext: false`
pub const CLASSIC_PRESETS: &[&str] = &["kumi", "kumi/overrides", "kumi/plugins"];

/// Formatter compatibility config, always last in the extends chain
pub const PRETTIER_PRESET: &str = "prettier";

/// Ignore patterns prepended to every run
pub const DEFAULT_IGNORES: &[&str] = &[
    "**/node_modules/**",
    "**/bower_components/**",
    "flow-typed/**",
    "coverage/**",
    "{tmp,temp}/**",
    "**/*.min.js",
    "**/bundle.js",
    "fixture{-*,}.{js,jsx}",
    "fixture{s,}/**",
    "{test,tests,spec,__tests__}/fixture{s,}/**",
    "vendor/**",
    "dist/**",
];

/// File extensions linted by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx"];

/// Base presets for the given modern syntax flag
pub fn base_presets(esnext: bool) -> &'static [&'static str] {
    if esnext { ESNEXT_PRESETS } else { CLASSIC_PRESETS }
}

pub fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

//! Static naming tables for legacy configs.

use crate::PluginId;

/// Section name patterns, in match priority order.
///
/// Each pattern is anchored at the start of the section name only, so
/// `phantom2` and `bfg_extra` still resolve.
pub const SECTION_PATTERNS: &[(&str, &str)] = &[
    ("Aggregator", "aggregator"),
    ("Android", "android"),
    ("Appium", "appium"),
    ("Autostop", "autostop"),
    ("BatteryHistorian", "battery_historian"),
    ("Bfg", "bfg|ultimate_gun|http_gun|custom_gun|scenario_gun"),
    ("Phantom", "phantom(-.*)?"),
    ("DataUploader", "meta|overload"),
    ("Telegraf", "telegraf|monitoring"),
    ("JMeter", "jmeter"),
    ("ResourceCheck", "rcheck"),
    ("ShellExec", "shellexec"),
    ("Console", "console"),
    ("TipsAndTricks", "tips"),
    ("RCAssert", "rcassert"),
];

/// Plugins that were renamed after the legacy package layout was retired.
const LEGACY_PACKAGE_RENAMES: &[(&str, &str)] = &[("Overload", "DataUploader")];

/// Prefix of the oldest, path-style plugin references.
const LEGACY_PATH_PREFIX: &str = "Tank/Plugins/";

/// Reduce a legacy package reference to a plugin identifier.
///
/// Accepts both `Tank/Plugins/Phantom.py` and `yandextank.plugins.Phantom`
/// forms.
pub fn map_legacy_package_path(path: &str) -> PluginId {
    let package = if path.starts_with(LEGACY_PATH_PREFIX) {
        let file = path.rsplit('/').next().unwrap_or(path);
        file.split('.').next().unwrap_or(file)
    } else {
        path.rsplit('.').next().unwrap_or(path)
    };

    let renamed = LEGACY_PACKAGE_RENAMES
        .iter()
        .find(|(old, _)| *old == package)
        .map(|(_, new)| *new)
        .unwrap_or(package);

    PluginId::new(renamed)
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Default location of the retention rule documents.
pub const DEFAULT_CONFIG_GLOB: &str = "/etc/dellog.d/*";

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "dellog.toml";

/// Prefix for environment overrides, e.g. `DELLOG__DRY_RUN=true`.
pub const ENV_PREFIX: &str = "DELLOG__";

/// Settings for a single retention pass.
///
/// Built once at process start and handed to the enforcer; nothing reads
/// these values from global scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Glob selecting the rule documents, one rule per matched file.
    ///
    /// Env: DELLOG__CONFIG_GLOB
    pub config_glob: String,

    /// Report intended deletions without removing anything.
    ///
    /// Env: DELLOG__DRY_RUN
    #[serde(default)]
    pub dry_run: bool,

    /// IANA timezone whose calendar day is used as "today".
    ///
    /// Env: DELLOG__TIMEZONE
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            config_glob: DEFAULT_CONFIG_GLOB.to_string(),
            dry_run: false, // deletions are live unless asked otherwise
            timezone: default_timezone(),
        }
    }
}

impl RunSettings {
    /// Load settings from defaults, `dellog.toml` and `DELLOG__*` variables.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::extract_with(Toml::file(DEFAULT_SETTINGS_FILE))
    }

    /// Same as [`RunSettings::load`] but reads the TOML layer from `path`.
    ///
    /// Unlike the default file, an explicit path that does not exist is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        if !path.is_file() {
            return Err(Box::new(figment::Error::from(format!(
                "settings file {} does not exist",
                path.display()
            ))));
        }
        Self::extract_with(Toml::file(path))
    }

    fn extract_with(toml: figment::providers::Data<Toml>) -> Result<Self, Box<figment::Error>> {
        let settings = Figment::from(Serialized::defaults(RunSettings::default()))
            .merge(toml)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(settings)
    }
}

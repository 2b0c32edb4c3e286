// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Optional YAML configuration file with environment overrides.
//!
//! Lookups check the environment first (`ESCHECK_` plus the key
//! upper-cased, with `.` and `-` replaced by `_`), then the file.
//! Command line values are applied on top by the caller.

use crate::error::CheckError;

#[derive(Debug, Default)]
pub struct Config {
    config: serde_yaml::Value,
}

impl Config {
    /// A configuration backed only by the environment.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_file(filename: &str) -> Result<Self, CheckError> {
        let file = std::fs::File::open(filename).map_err(|err| {
            CheckError::InvalidInput(format!("failed to open configuration file {filename}: {err}"))
        })?;
        let config: serde_yaml::Value = serde_yaml::from_reader(file)?;
        Ok(Self { config })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, CheckError> {
        let config: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        Ok(Self { config })
    }

    pub fn env_key(&self, key: &str) -> String {
        let xform = key.replace(['.', '-'], "_");
        format!("ESCHECK_{}", xform.to_uppercase())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Ok(val) = std::env::var(self.env_key(key)) {
            return Some(val);
        }
        match self.find_value(key) {
            serde_yaml::Value::String(s) => Some(s.into()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Get a value as a bool, returning false if the key does not exist.
    pub fn get_bool(&self, key: &str) -> bool {
        if let Ok(val) = std::env::var(self.env_key(key)) {
            return matches!(val.to_lowercase().as_ref(), "true" | "yes" | "1");
        }
        if let serde_yaml::Value::Bool(v) = self.find_value(key) {
            return *v;
        }
        false
    }

    fn find_value(&self, key: &str) -> &serde_yaml::Value {
        let val = &self.config[key];
        match val {
            serde_yaml::Value::Null => {}
            _ => return val,
        }
        let mut value = &self.config;
        for part in key.split('.') {
            value = &value[part];
        }
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config() {
        let config = Config::from_yaml(include_str!("test/escheck.yaml")).unwrap();

        assert_eq!(
            config.get_string("elasticsearch.url").unwrap(),
            "http://10.16.1.10:9200"
        );
        assert_eq!(config.get_string("elasticsearch.username").unwrap(), "nagios");
        assert_eq!(config.get_string("elasticsearch.index-type"), None);
        assert_eq!(config.get_string("elasticsearch.port").unwrap(), "9200");
        assert!(config.get_bool("elasticsearch.no-check-certificate"));
        assert!(!config.get_bool("elasticsearch.missing"));

        // A flat dotted key also works.
        assert_eq!(config.get_string("elasticsearch.timeout").unwrap(), "10s");
    }

    #[test]
    fn test_env_key() {
        let config = Config::empty();
        assert_eq!(
            config.env_key("elasticsearch.no-check-certificate"),
            "ESCHECK_ELASTICSEARCH_NO_CHECK_CERTIFICATE"
        );
    }

    #[test]
    fn test_env_override() {
        let config = Config::from_yaml("elasticsearch:\n  password: fromfile\n").unwrap();
        std::env::set_var("ESCHECK_ELASTICSEARCH_PASSWORD", "fromenv");
        assert_eq!(
            config.get_string("elasticsearch.password").unwrap(),
            "fromenv"
        );
        std::env::remove_var("ESCHECK_ELASTICSEARCH_PASSWORD");
        assert_eq!(
            config.get_string("elasticsearch.password").unwrap(),
            "fromfile"
        );
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_file("/nonexistent/escheck.yaml").is_err());
    }
}

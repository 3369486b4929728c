//! Suite configuration types
//!
//! Defines the data structures for deserializing YAML suite files.

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::{Error, Result};

/// A suite of playbook scenarios loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
pub struct Suite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// Playbooks that must all succeed before any scenario runs
    #[serde(default)]
    pub prebuild: Vec<PathBuf>,
    /// Scenarios to run concurrently
    pub scenarios: Vec<ScenarioTest>,
    /// Directory the playbooks are run from (the suite file's directory)
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Suite {
    /// Load a suite from a YAML file
    ///
    /// Playbook paths stay relative; they are passed to the tool as written
    /// and resolved against the suite's directory, which becomes the
    /// working directory of every invocation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let mut suite: Suite = serde_yaml::from_str(&content)
            .map_err(|e| Error::suite_parse(&path.display().to_string(), e))?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        suite.dir = parent.canonicalize().map_err(|e| Error::FileRead {
            path: parent.display().to_string(),
            error: e.to_string(),
        })?;

        Ok(suite)
    }

    /// Scenarios whose name contains `filter`, or all of them
    pub fn select(&self, filter: Option<&str>) -> Vec<ScenarioTest> {
        self.scenarios
            .iter()
            .filter(|s| filter.map_or(true, |f| s.name.contains(f)))
            .cloned()
            .collect()
    }
}

/// A single playbook run and what it must produce
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScenarioTest {
    /// Name used in reports and for filtering
    pub name: String,
    /// Playbook path, relative to the suite directory
    pub path: PathBuf,
    /// Expected exit code
    #[serde(default)]
    pub exit_code: i32,
    /// Fragments that must all appear somewhere in the combined output
    #[serde(default)]
    pub output: Vec<String>,
    /// Overrides the configured default timeout
    #[serde(
        rename = "timeout_secs",
        default,
        deserialize_with = "deserialize_timeout_secs"
    )]
    pub timeout: Option<Duration>,
}

fn deserialize_timeout_secs<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u64>::deserialize(deserializer)? {
        Some(0) => Err(serde::de::Error::custom(
            "timeout_secs must be greater than 0",
        )),
        secs => Ok(secs.map(Duration::from_secs)),
    }
}

impl ScenarioTest {
    /// A scenario expecting success and no particular output
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            exit_code: 0,
            output: Vec::new(),
            timeout: None,
        }
    }

    /// Expect the given exit code
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Require a fragment in the output
    pub fn expect_output(mut self, fragment: impl Into<String>) -> Self {
        self.output.push(fragment.into());
        self
    }

    /// Set a timeout for this scenario
    ///
    /// A zero duration leaves the configured default in place.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"
name: yum_content
prebuild:
  - yum_content/build.yml
scenarios:
  - name: install-missing-required
    path: yum_content/test-install-missing-required.yml
    exit_code: 1
    output:
      - Cannot install all of the necessary packages
  - name: repo-disabled
    path: yum_content/test-yum-repo-disabled.yml
    output: ["nothing blocks a yum update"]
    timeout_secs: 60
"#;

    #[test]
    fn test_parse_suite() {
        let suite: Suite = serde_yaml::from_str(SUITE).unwrap();
        assert_eq!(suite.name, "yum_content");
        assert_eq!(suite.prebuild, vec![PathBuf::from("yum_content/build.yml")]);
        assert_eq!(suite.scenarios.len(), 2);
        assert_eq!(
            suite.scenarios[0],
            ScenarioTest::new(
                "install-missing-required",
                "yum_content/test-install-missing-required.yml"
            )
            .exit_code(1)
            .expect_output("Cannot install all of the necessary packages")
        );
    }

    #[test]
    fn test_defaults() {
        let suite: Suite = serde_yaml::from_str(SUITE).unwrap();
        let disabled = &suite.scenarios[1];
        assert_eq!(disabled.exit_code, 0);
        assert_eq!(disabled.timeout, Some(Duration::from_secs(60)));

        let bare: Suite =
            serde_yaml::from_str("name: bare\nscenarios:\n  - name: ping\n    path: ping.yml\n")
                .unwrap();
        assert!(bare.prebuild.is_empty());
        assert!(bare.scenarios[0].output.is_empty());
        assert_eq!(bare.scenarios[0].timeout, None);
    }

    #[test]
    fn test_select_by_substring() {
        let suite: Suite = serde_yaml::from_str(SUITE).unwrap();
        assert_eq!(suite.select(None).len(), 2);
        let picked = suite.select(Some("disabled"));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "repo-disabled");
        assert!(suite.select(Some("nope")).is_empty());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = serde_yaml::from_str::<Suite>(
            "name: zero\nscenarios:\n  - name: ping\n    path: ping.yml\n    timeout_secs: 0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("timeout_secs must be greater than 0"));
    }

    #[test]
    fn test_sub_second_timeout_kept() {
        let test = ScenarioTest::new("quick", "quick.yml").timeout(Duration::from_millis(900));
        assert_eq!(test.timeout, Some(Duration::from_millis(900)));

        let test = ScenarioTest::new("slow", "slow.yml").timeout(Duration::from_millis(1500));
        assert_eq!(test.timeout, Some(Duration::from_millis(1500)));

        let test = ScenarioTest::new("zero", "zero.yml").timeout(Duration::ZERO);
        assert_eq!(test.timeout, None);
    }

    #[test]
    fn test_missing_scenarios_is_parse_error() {
        let err = serde_yaml::from_str::<Suite>("name: broken\n").unwrap_err();
        assert!(err.to_string().contains("scenarios"));
    }
}

//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the ruta engine. A fixture is a
//! route file (the same format `RouteTable::from_config` reads) plus cases:
//!
//! ```yaml
//! name: typed parameter
//! description: numeric parameter is extracted by name
//! routes:
//!   routes:
//!     - { verb: get, pattern: "user/numeric:id", response: UserController.show }
//! cases:
//!   - name: digits match
//!     verb: GET
//!     path: user/42
//!     expect:
//!       response: UserController.show
//!       params: { id: "42" }
//!   - name: letters do not
//!     verb: get
//!     path: user/abc
//!     expect: ~
//! ```

use std::sync::Arc;

use ruta::prelude::*;
use ruta::{RoutesConfig, TraceOutcome};
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub routes: RoutesConfig,
    /// Number of per-route warnings the load must produce.
    #[serde(default)]
    pub expect_warnings: usize,
    /// The load itself must fail (bad parameter type).
    #[serde(default)]
    pub expect_error: bool,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub verb: String,
    pub path: String,
    /// Treat `path` as a raw request target and normalize it first.
    #[serde(default)]
    pub ambient: bool,
    /// Expected match. Absent or `~` means no match.
    #[serde(default)]
    pub expect: Option<Expected>,
    /// The miss must be `NoRulesForVerb` rather than `NotFound`.
    #[serde(default)]
    pub no_rules_for_verb: bool,
}

/// Expected match
#[derive(Debug, Deserialize)]
pub struct Expected {
    /// Pattern of the rule that must win. Unchecked if absent.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub response: Response,
    #[serde(default)]
    pub params: Params,
}

impl TestCase {
    fn accepts(&self, outcome: &TraceOutcome) -> bool {
        match (&self.expect, outcome) {
            (
                Some(expected),
                TraceOutcome::Matched {
                    pattern,
                    response,
                    params,
                },
            ) => {
                expected.pattern.as_ref().map_or(true, |p| p == pattern)
                    && &expected.response == response
                    && &expected.params == params
            }
            (None, TraceOutcome::NotFound) => !self.no_rules_for_verb,
            (None, TraceOutcome::NoRulesForVerb { .. }) => self.no_rules_for_verb,
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Problem with the fixture as a whole, before any case runs.
#[derive(Debug)]
pub enum FixtureError {
    /// The load failed but was expected to succeed, or the other way round.
    Load(Option<RouteError>),
    /// The load produced a different number of warnings.
    Warnings {
        expected: usize,
        actual: Vec<RouteError>,
    },
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Load the routes and run all test cases.
    ///
    /// Every case is dispatched twice, plainly and with a trace, and only
    /// passes if both agree.
    pub fn run(&self) -> Result<Vec<CaseResult>, FixtureError> {
        let loaded = match RouteTable::from_config(self.routes.clone()) {
            Ok(loaded) if !self.expect_error => loaded,
            Ok(_) => return Err(FixtureError::Load(None)),
            Err(_) if self.expect_error => return Ok(Vec::new()),
            Err(error) => return Err(FixtureError::Load(Some(error))),
        };
        if loaded.warnings.len() != self.expect_warnings {
            return Err(FixtureError::Warnings {
                expected: self.expect_warnings,
                actual: loaded.warnings,
            });
        }

        let dispatcher = Dispatcher::new(Arc::new(loaded.table)).with_options(loaded.options);
        let results = self
            .cases
            .iter()
            .map(|case| {
                let (lookup, traced) = if case.ambient {
                    let request = Request::builder()
                        .method(case.verb.as_str())
                        .path(case.path.as_str())
                        .build();
                    let path = dispatcher.options().normalize(&case.path);
                    (
                        dispatcher.dispatch_request(&request),
                        dispatcher.dispatch_with_trace(path, &case.verb),
                    )
                } else {
                    (
                        dispatcher.dispatch(&case.path, &case.verb),
                        dispatcher.dispatch_with_trace(&case.path, &case.verb),
                    )
                };
                let actual = TraceOutcome::from(&lookup);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: case.accepts(&actual) && traced.outcome == actual,
                    expected: format!("{:?}", case.expect),
                    actual: format!("{actual:?}"),
                }
            })
            .collect();
        Ok(results)
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = match self.run() {
            Ok(results) => results,
            Err(error) => panic!("Fixture '{}' failed to load: {error:?}", self.name),
        };
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: inline
routes:
  routes:
    - { verb: get, pattern: "user/numeric:id", response: [UserController, show] }
cases:
  - name: hit
    verb: GET
    path: user/7
    expect:
      pattern: user/numeric:id
      response: [UserController, show]
      params: { id: "7" }
  - name: miss
    verb: get
    path: user/x
  - name: other verb
    verb: post
    path: user/7
    no_rules_for_verb: true
"#;

    #[test]
    fn inline_fixture_passes() {
        let fixture = Fixture::from_yaml(YAML).unwrap();
        assert_eq!(fixture.cases.len(), 3);
        fixture.run_and_assert();
    }

    #[test]
    fn wrong_expectation_fails() {
        let mut fixture = Fixture::from_yaml(YAML).unwrap();
        fixture.cases[1].no_rules_for_verb = true;
        let results = fixture.run().unwrap();
        assert!(results[0].passed);
        assert!(!results[1].passed);
    }

    #[test]
    fn warning_count_is_checked() {
        let mut fixture = Fixture::from_yaml(YAML).unwrap();
        fixture.expect_warnings = 1;
        assert!(matches!(
            fixture.run(),
            Err(FixtureError::Warnings { expected: 1, .. })
        ));
    }
}

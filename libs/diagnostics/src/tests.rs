use crate::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIssue {
    severity: Severity,
}

impl Display for TestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity)
    }
}

impl Diagnostic for TestIssue {
    fn severity(&self) -> Severity {
        self.severity
    }
}

impl From<Severity> for TestIssue {
    fn from(severity: Severity) -> Self {
        Self { severity }
    }
}

#[test]
fn issue_set_counters() {
    let mut issues: IssueSet<TestIssue> = IssueSet::new();
    issues.add(Severity::Info.into());
    assert_eq!(issues.num_errors(), 0);
    assert_eq!(issues.num_warnings(), 0);
    assert_eq!(issues.num_infos(), 1);
    assert!(!issues.has_error());
    assert!(!issues.has_warning());
    issues.add(Severity::Warning.into());
    assert_eq!(issues.num_warnings(), 1);
    assert!(issues.has_warning());
    issues.add(Severity::Error.into());
    assert_eq!(issues.num_errors(), 1);
    assert!(issues.has_error());
    issues.add(Severity::Warning.into());
    assert_eq!(issues.num_errors(), 1);
    assert_eq!(issues.num_warnings(), 2);
    assert_eq!(issues.num_infos(), 1);
    assert_eq!(issues.len(), 4);
}

#[test]
fn merge_keeps_order_and_counts() {
    let mut a: IssueSet<TestIssue> = [Severity::Info, Severity::Warning]
        .into_iter()
        .map(TestIssue::from)
        .collect();
    let b: IssueSet<TestIssue> = [Severity::Error].into_iter().map(TestIssue::from).collect();
    a.merge(b);
    assert_eq!(
        a.iter().map(|i| i.severity).collect::<Vec<_>>(),
        vec![Severity::Info, Severity::Warning, Severity::Error]
    );
    assert_eq!(a.num_errors(), 1);
    assert_eq!(a.num_warnings(), 1);
    assert_eq!(a.max_severity(), Some(Severity::Error));
}

#[test]
fn filter_by_minimum_severity() {
    let issues: IssueSet<TestIssue> = [
        Severity::Info,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
    ]
    .into_iter()
    .map(TestIssue::from)
    .collect();
    assert_eq!(issues.at_least(Severity::Warning).count(), 2);
    assert_eq!(issues.at_least(Severity::Error).count(), 1);
    assert_eq!(issues.at_least(Severity::Info).count(), 4);
}

#[test]
fn severities_are_ordered() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
    assert_eq!(IssueSet::<TestIssue>::new().max_severity(), None);
}

#[test]
fn default_severity_is_warning() {
    assert_eq!(Severity::default(), Severity::Warning);
}

#[test]
fn severity_as_tracing_level() {
    assert_eq!(Severity::Info.as_tracing_level(), tracing::Level::INFO);
    assert_eq!(Severity::Warning.as_tracing_level(), tracing::Level::WARN);
    assert_eq!(Severity::Error.as_tracing_level(), tracing::Level::ERROR);
}

#[test]
fn display_lists_one_issue_per_line() {
    let issues: IssueSet<TestIssue> = [Severity::Warning, Severity::Error]
        .into_iter()
        .map(TestIssue::from)
        .collect();
    assert_eq!(issues.to_string(), "warning\nerror\n");
}

#[test]
fn default_help_is_none() {
    assert!(TestIssue {
        severity: Severity::Warning,
    }
    .help()
    .is_none());
}

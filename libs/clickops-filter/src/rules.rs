use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;


#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The whole value must equal the pattern.
    Exact,
    /// The pattern is a regular expression searched anywhere in the value,
    /// so it has to carry its own `^` if it should only match a prefix.
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: MatchKind,
    pub pattern: String,
}

impl Rule {
    pub fn exact(pattern: &str) -> Self {
        Rule { kind: MatchKind::Exact, pattern: pattern.to_string() }
    }

    pub fn pattern(pattern: &str) -> Self {
        Rule { kind: MatchKind::Pattern, pattern: pattern.to_string() }
    }
}

const CONSOLE_USER_AGENTS: &[&str] = &[
    "console.amazonaws.com",
    "Coral/Jakarta",
    "Coral/Netty4",
];

const CONSOLE_USER_AGENT_PATTERNS: &[&str] = &[
    r"signin.amazonaws.com(.*)",
    r"^S3Console",
    r"^\[S3Console",
    r"^Mozilla/",
    r"^console(.*)amazonaws.com(.*)",
    r"^aws-internal(.*)AWSLambdaConsole(.*)",
];

const READONLY_ACTION_PATTERNS: &[&str] = &[
    "^Get",
    "^Describe",
    "^List",
    "^Head",
];

const IGNORED_EVENTS: &[&str] = &[
    "DownloadDBLogFilePortion",
    "TestScheduleExpression",
    "TestEventPattern",
    "LookupEvents",
    "listDnssec",
    "Decrypt",
    "REST.GET.OBJECT_LOCK_CONFIGURATION",
    "ConsoleLogin",
];

// Action names that are only noise for a particular service, keyed as `eventSource:eventName`.
const IGNORED_SCOPED_EVENTS: &[&str] = &[
    "cognito-idp.amazonaws.com:InitiateAuth",
    "cognito-idp.amazonaws.com:RespondToAuthChallenge",

    "sso.amazonaws.com:Federate",
    "sso.amazonaws.com:Authenticate",
    "sso.amazonaws.com:Logout",
    "sso.amazonaws.com:SearchUsers",
    "sso.amazonaws.com:SearchGroups",

    "signin.amazonaws.com:UserAuthentication",
    "signin.amazonaws.com:SwitchRole",
    "signin.amazonaws.com:RenewRole",
    "signin.amazonaws.com:ExternalIdPDirectoryLogin",

    "logs.amazonaws.com:StartQuery",

    "iam.amazonaws.com:SimulatePrincipalPolicy",
    "iam.amazonaws.com:GenerateServiceLastAccessedDetails",

    "glue.amazonaws.com:BatchGetJobs",
    "glue.amazonaws.com:BatchGetCrawlers",
    "glue.amazonaws.com:StartJobRun",
    "glue.amazonaws.com:StartCrawler",

    "servicecatalog.amazonaws.com:SearchProductsAsAdmin",
    "servicecatalog.amazonaws.com:SearchProducts",
    "servicecatalog.amazonaws.com:SearchProvisionedProducts",
    "servicecatalog.amazonaws.com:TerminateProvisionedProduct",

    "cloudshell.amazonaws.com:CreateSession",
    "cloudshell.amazonaws.com:PutCredentials",
    "cloudshell.amazonaws.com:SendHeartBeat",
    "cloudshell.amazonaws.com:CreateEnvironment",
];

/// Uncompiled rule data. Build your own for tests, or start from
/// [`RuleTables::default`] which carries the console detection rules.
#[derive(Debug, Clone)]
pub struct RuleTables {
    pub user_agents: Vec<Rule>,
    pub readonly_actions: Vec<Rule>,
    pub ignored_events: Vec<String>,
    pub ignored_scoped_events: Vec<String>,
}

impl Default for RuleTables {
    fn default() -> Self {
        let user_agents = CONSOLE_USER_AGENTS.iter().map(|agent| Rule::exact(agent))
            .chain(CONSOLE_USER_AGENT_PATTERNS.iter().map(|pattern| Rule::pattern(pattern)))
            .collect();

        RuleTables {
            user_agents,
            readonly_actions: READONLY_ACTION_PATTERNS.iter().map(|pattern| Rule::pattern(pattern)).collect(),
            ignored_events: IGNORED_EVENTS.iter().map(|name| name.to_string()).collect(),
            ignored_scoped_events: IGNORED_SCOPED_EVENTS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl RuleTables {
    pub fn compile(&self) -> Result<RuleSet, RuleError> {
        Ok(RuleSet {
            user_agents: Matcher::compile(&self.user_agents)?,
            readonly_actions: Matcher::compile(&self.readonly_actions)?,
            ignored_events: self.ignored_events.iter().cloned().collect(),
            ignored_scoped_events: self.ignored_scoped_events.iter().cloned().collect(),
        })
    }
}

#[derive(Debug, Clone)]
struct Matcher {
    exact: HashSet<String>,
    patterns: Vec<Regex>,
}

impl Matcher {
    fn compile(rules: &[Rule]) -> Result<Self, RuleError> {
        let mut exact = HashSet::new();
        let mut patterns = Vec::new();

        for rule in rules {
            match rule.kind {
                MatchKind::Exact => {
                    exact.insert(rule.pattern.clone());
                }
                MatchKind::Pattern => {
                    let regex = Regex::new(&rule.pattern).map_err(|source| RuleError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })?;
                    patterns.push(regex);
                }
            }
        }

        Ok(Matcher { exact, patterns })
    }

    fn is_match(&self, value: &str) -> bool {
        self.exact.contains(value) || self.patterns.iter().any(|regex| regex.is_match(value))
    }
}

/// Compiled, immutable rule tables shared by every classification.
#[derive(Debug, Clone)]
pub struct RuleSet {
    user_agents: Matcher,
    readonly_actions: Matcher,
    ignored_events: HashSet<String>,
    ignored_scoped_events: HashSet<String>,
}

impl RuleSet {
    pub fn is_console_user_agent(&self, user_agent: &str) -> bool {
        self.user_agents.is_match(user_agent)
    }

    pub fn is_readonly_action(&self, event_name: &str) -> bool {
        self.readonly_actions.is_match(event_name)
    }

    pub fn is_ignored_event(&self, event_name: &str) -> bool {
        self.ignored_events.contains(event_name)
    }

    pub fn is_ignored_scoped_event(&self, event_source: &str, event_name: &str) -> bool {
        self.ignored_scoped_events.contains(&format!("{}:{}", event_source, event_name))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn default_rules() -> RuleSet {
        RuleTables::default().compile().expect("default tables compile")
    }

    #[test]
    fn literal_console_agents_match() {
        let rules = default_rules();
        for agent in ["console.amazonaws.com", "Coral/Jakarta", "Coral/Netty4"] {
            assert!(rules.is_console_user_agent(agent), "{agent} should match");
        }
    }

    #[test]
    fn console_agent_patterns_match() {
        let rules = default_rules();
        let agents = [
            "signin.amazonaws.com",
            "AWS Internal via signin.amazonaws.com",
            "S3Console/0.4",
            "[S3Console/0.4, aws-internal/3]",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
            "console.ec2.amazonaws.com",
            "aws-internal/3 AWSLambdaConsole/1.0",
        ];
        for agent in agents {
            assert!(rules.is_console_user_agent(agent), "{agent} should match");
        }
    }

    #[test]
    fn automation_agents_do_not_match() {
        let rules = default_rules();
        let agents = [
            "aws-cli/2.15.0 Python/3.11.6",
            "Boto3/1.34.0 Python/3.12",
            "terraform-provider-aws/5.0 (+https://registry.terraform.io)",
            "cloudformation.amazonaws.com",
            "",
            // patterns are anchored where the rule says so
            "my-S3Console",
            "xconsole.amazonaws.com",
        ];
        for agent in agents {
            assert!(!rules.is_console_user_agent(agent), "{agent} should not match");
        }
    }

    #[test]
    fn readonly_prefixes() {
        let rules = default_rules();
        assert!(rules.is_readonly_action("GetObject"));
        assert!(rules.is_readonly_action("DescribeInstances"));
        assert!(rules.is_readonly_action("ListBuckets"));
        assert!(rules.is_readonly_action("HeadBucket"));
        assert!(!rules.is_readonly_action("PutBucketPolicy"));
        assert!(!rules.is_readonly_action("BatchGetItem"));
    }

    #[test]
    fn scoped_ignore_requires_matching_source() {
        let rules = default_rules();
        assert!(rules.is_ignored_scoped_event("cognito-idp.amazonaws.com", "InitiateAuth"));
        assert!(!rules.is_ignored_scoped_event("cognito-idp.amazonaws.com", "DescribeUserPool"));
        assert!(!rules.is_ignored_scoped_event("iam.amazonaws.com", "InitiateAuth"));
        assert!(!rules.is_ignored_event("InitiateAuth"));
    }

    #[test]
    fn custom_tables_are_independent_of_defaults() {
        let tables = RuleTables {
            user_agents: vec![Rule::exact("my-agent"), Rule::pattern("^bot/")],
            readonly_actions: vec![],
            ignored_events: vec!["Noise".to_string()],
            ignored_scoped_events: vec![],
        };
        let rules = tables.compile().unwrap();

        assert!(rules.is_console_user_agent("my-agent"));
        assert!(rules.is_console_user_agent("bot/1.0"));
        assert!(!rules.is_console_user_agent("Mozilla/5.0"));
        assert!(!rules.is_readonly_action("GetObject"));
        assert!(rules.is_ignored_event("Noise"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let tables = RuleTables {
            user_agents: vec![Rule::pattern("(unclosed")],
            ..RuleTables::default()
        };

        let err = tables.compile().unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }
}

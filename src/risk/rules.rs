use super::classifier::{DataSensitivity, OwaspCategory};
use serde::{Deserialize, Serialize};

/// One keyword group of the risk score.
///
/// A rule fires when any keyword occurs in the lower-cased task name or path.
/// A firing rule adds its increment once, however many of its keywords match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRule {
    pub name: String,
    pub keywords: Vec<String>,
    pub increment: u32,
    #[serde(default)]
    pub owasp: Vec<OwaspCategory>,
    #[serde(default)]
    pub requires_auth: bool,
}

impl RiskRule {
    /// `name` and `path` are expected lower-cased. Keywords from a config file may not be.
    pub fn fires(&self, name: &str, path: &str) -> bool {
        self.keywords.iter().any(|kw| {
            let kw = kw.to_lowercase();
            name.contains(&kw) || path.contains(&kw)
        })
    }
}

macro_rules! risk_rules {
    ( $( $name:literal => [$($kw:literal),+ $(,)?], score $inc:literal, owasp [$($cat:ident),*], auth $auth:literal );+ $(;)? ) => {
        vec![
            $(
                RiskRule {
                    name: $name.to_string(),
                    keywords: vec![$($kw.to_string()),+],
                    increment: $inc,
                    owasp: vec![$(OwaspCategory::$cat),*],
                    requires_auth: $auth,
                },
            )+
        ]
    };
}

/// The built-in scoring table.
pub fn default_rules() -> Vec<RiskRule> {
    risk_rules!(
        "financial" => ["payment", "transfer", "account", "card", "balance"],
            score 3, owasp [A01, A02], auth false;
        "authentication" => ["auth", "login", "token", "credential"],
            score 2, owasp [A07], auth true;
        "personal_data" => ["personal", "customer", "client", "user", "profile"],
            score 2, owasp [A01, A03], auth false;
    )
}

/// Path keywords per sensitivity tier, checked from the highest tier down.
pub const SENSITIVITY_KEYWORDS: &[(DataSensitivity, &[&str])] = &[
    (
        DataSensitivity::High,
        &["account", "card", "payment", "balance", "personal"],
    ),
    (DataSensitivity::Medium, &["transaction", "customer", "profile"]),
];

/// Path keywords and the compliance tags they pull in. Every matching row applies.
pub const COMPLIANCE_KEYWORDS: &[(&[&str], &[&str])] = &[
    (&["account", "payment"], &["PCI-DSS", "GDPR Art. 32"]),
    (&["personal", "customer"], &["GDPR Art. 6", "GDPR Art. 7"]),
    (&["auth", "token"], &["OWASP ASVS V2", "NIST SP 800-63B"]),
];

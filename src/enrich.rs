//! Post-deduplication enrichment hook.
//!
//! Enrichers annotate surviving findings with advisory context (CWE ids,
//! remediation text, reference links). They run after deduplication so
//! discarded duplicates are never annotated, and they may only fill the
//! advisory fields; identity and severity are already settled.

use std::collections::HashMap;

use crate::rules::Finding;

/// Annotates findings in place after deduplication.
pub trait Enrich: Send + Sync {
    fn enrich(&self, findings: &mut [Finding]);
}

/// Built-in enricher: static CWE and remediation text per rule family.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: HashMap<&'static str, (&'static str, &'static str)>,
}

impl KnowledgeBase {
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for (rule_id, cwe, remediation) in [
            (
                "SECRET_AWS_ACCESS_KEY",
                "CWE-798",
                "Rotate the key and move credentials to the environment or a secrets manager.",
            ),
            (
                "SECRET_AWS_SECRET_KEY",
                "CWE-798",
                "Rotate the key and move credentials to the environment or a secrets manager.",
            ),
            (
                "SECRET_GCP_SERVICE_ACCOUNT",
                "CWE-798",
                "Revoke the service account key and load it from outside the repository.",
            ),
            (
                "SECRET_AZURE_CLIENT_SECRET",
                "CWE-798",
                "Rotate the client secret and source it from a vault.",
            ),
            (
                "SECRET_STRIPE_API_KEY",
                "CWE-798",
                "Roll the key in the Stripe dashboard and read it from the environment.",
            ),
            (
                "SECRET_SLACK_TOKEN",
                "CWE-798",
                "Revoke the token and use an app-level secret store.",
            ),
            (
                "SECRET_GITHUB_TOKEN",
                "CWE-798",
                "Revoke the token and use repository or organization secrets.",
            ),
            (
                "SECRET_FACEBOOK_TOKEN",
                "CWE-798",
                "Invalidate the token in the app dashboard and obtain tokens at runtime.",
            ),
            (
                "SECRET_GCP_OAUTH_TOKEN",
                "CWE-798",
                "Revoke the token and use application default credentials.",
            ),
            (
                "SECRET_PRIVATE_KEY",
                "CWE-321",
                "Remove the key from history and reissue the key pair.",
            ),
            (
                "SECRET_JWT",
                "CWE-798",
                "Invalidate the token and stop embedding session material in source.",
            ),
            (
                "SECRET_OAUTH_TOKEN",
                "CWE-798",
                "Revoke the token and obtain tokens at runtime.",
            ),
            (
                "SECRET_HARDCODED_PASSWORD",
                "CWE-259",
                "Move the password to configuration injected at deploy time.",
            ),
            (
                "SECRET_GENERIC_API_KEY",
                "CWE-798",
                "Move the key to the environment or a secrets manager.",
            ),
            (
                "SECRET_HIGH_ENTROPY",
                "CWE-798",
                "Confirm whether this value is a credential; if so, rotate and externalize it.",
            ),
            (
                "CONFIG_DEBUG_ENABLED",
                "CWE-489",
                "Disable debug mode outside development environments.",
            ),
            (
                "CONFIG_INSECURE_BIND",
                "CWE-1327",
                "Bind to a specific interface or front the service with a proxy.",
            ),
            (
                "CONFIG_WEAK_CRYPTO",
                "CWE-327",
                "Use SHA-256 or stronger for any security-relevant hashing.",
            ),
            (
                "CONFIG_INSECURE_TLS",
                "CWE-295",
                "Restore certificate verification and trust a proper CA bundle.",
            ),
            (
                "CONFIG_DATABASE_URL",
                "CWE-798",
                "Inject database credentials through the environment.",
            ),
            (
                "DOC001",
                "CWE-250",
                "Add a USER instruction that drops to an unprivileged account.",
            ),
            (
                "DOC002",
                "CWE-798",
                "Pass secrets at runtime instead of baking them into image layers.",
            ),
            (
                "GHA001",
                "CWE-250",
                "Declare least-privilege permissions per job.",
            ),
            (
                "GHA002",
                "CWE-77",
                "Write outputs to $GITHUB_OUTPUT instead of ::set-output.",
            ),
            (
                "TFC001",
                "CWE-732",
                "Set acl = \"private\" or attach an explicit public-access block.",
            ),
            (
                "TFC002",
                "CWE-311",
                "Set encrypt = true on the S3 state backend.",
            ),
            (
                "JSC001",
                "CWE-829",
                "Remove network fetch-and-execute steps from lifecycle hooks.",
            ),
            (
                "JSC002",
                "CWE-1357",
                "Pin the dependency to a specific version range.",
            ),
        ] {
            entries.insert(rule_id, (cwe, remediation));
        }
        Self { entries }
    }
}

impl Enrich for KnowledgeBase {
    fn enrich(&self, findings: &mut [Finding]) {
        for finding in findings {
            if let Some((cwe, remediation)) = self.entries.get(finding.rule_id.as_str()) {
                finding.cwe_id = Some((*cwe).to_string());
                finding.remediation = Some((*remediation).to_string());
            }
        }
    }
}

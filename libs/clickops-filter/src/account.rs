/// Allow/deny lists of account tokens matched against CloudTrail object keys.
///
/// Tokens are matched as plain substrings of the whole key, not as path
/// segments, so a short token can also hit an unrelated part of the key.
#[derive(Debug, Clone, Default)]
pub struct AccountKeyFilter {
    excluded: Vec<String>,
    included: Vec<String>,
}

impl AccountKeyFilter {
    pub fn new(excluded: Vec<String>, included: Vec<String>) -> Self {
        AccountKeyFilter { excluded, included }
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        if self.excluded.is_empty() && self.included.is_empty() {
            return true;
        }

        if self.excluded.iter().any(|account| key.contains(account.as_str())) {
            tracing::info!("{} in excluded accounts {:?}", key, self.excluded);
            return false;
        }

        if self.included.is_empty() {
            return true;
        }

        if self.included.iter().any(|account| key.contains(account.as_str())) {
            return true;
        }

        tracing::info!("{} not in included accounts {:?}", key, self.included);
        false
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "AWSLogs/o-abc/111111111111/CloudTrail/eu-west-1/2024/01/01/file.json.gz";

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_lists_allows_everything() {
        let filter = AccountKeyFilter::default();
        assert!(filter.is_allowed(KEY));
        assert!(filter.is_allowed(""));
    }

    #[test]
    fn excluded_token_anywhere_denies() {
        let filter = AccountKeyFilter::new(tokens(&["111"]), vec![]);
        assert!(!filter.is_allowed(KEY));
        assert!(filter.is_allowed("AWSLogs/222222222222/CloudTrail/x.json.gz"));
    }

    #[test]
    fn included_list_requires_a_hit() {
        let filter = AccountKeyFilter::new(vec![], tokens(&["222"]));
        assert!(filter.is_allowed("AWSLogs/222222222222/CloudTrail/x.json.gz"));
        assert!(!filter.is_allowed(KEY));
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        let filter = AccountKeyFilter::new(tokens(&["111111111111"]), tokens(&["111111111111"]));
        assert!(!filter.is_allowed(KEY));
    }

    #[test]
    fn substring_match_hits_unrelated_segments() {
        let filter = AccountKeyFilter::new(vec![], tokens(&["123"]));
        assert!(filter.is_allowed("AWSLogs/999999999999/CloudTrail/xyz123abc.json.gz"));
    }
}

use crate::credential_audit::domain::{ApplicationView, CredentialDescriptor, ThresholdSet};

/// ThresholdFilter - selects the credentials worth reporting.
///
/// A credential matches when it has expired or its remaining day count is
/// exactly one of the thresholds. Applications with no matching credential
/// are dropped; retained applications carry only their matching credentials.
pub struct ThresholdFilter;

impl ThresholdFilter {
    pub fn matches(credential: &CredentialDescriptor, thresholds: &ThresholdSet) -> bool {
        credential.is_expired() || thresholds.contains(credential.days_until_expiration())
    }

    pub fn filter(views: &[ApplicationView], thresholds: &ThresholdSet) -> Vec<ApplicationView> {
        views
            .iter()
            .map(|view| view.retain_credentials(|c| Self::matches(c, thresholds)))
            .filter(ApplicationView::has_credentials)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential_audit::domain::CredentialSource;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
    }

    fn secret(key_id: &str, days: i64) -> CredentialDescriptor {
        CredentialDescriptor::secret(
            key_id.to_string(),
            None,
            now() + Duration::days(days),
            CredentialSource::Application,
            now(),
        )
    }

    fn certificate(key_id: &str, days: i64) -> CredentialDescriptor {
        CredentialDescriptor::certificate(
            key_id.to_string(),
            None,
            now() + Duration::days(days),
            CredentialSource::ServicePrincipal,
            None,
            None,
            now(),
        )
    }

    fn view(
        app_id: &str,
        secrets: Vec<CredentialDescriptor>,
        certs: Vec<CredentialDescriptor>,
    ) -> ApplicationView {
        let mut view = ApplicationView::new(
            format!("obj-{}", app_id),
            app_id.to_string(),
            app_id.to_string(),
        );
        secrets.into_iter().for_each(|s| view.add_secret(s));
        certs.into_iter().for_each(|c| view.add_certificate(c));
        view
    }

    #[test]
    fn test_zero_threshold_includes_zero_day_credential() {
        let views = vec![view("A", vec![secret("s", 0)], vec![])];
        let filtered = ThresholdFilter::filter(&views, &ThresholdSet::new([0]));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_expired_credentials_always_match() {
        let views = vec![view("A", vec![secret("old", -3)], vec![])];
        let filtered = ThresholdFilter::filter(&views, &ThresholdSet::new([0]));
        assert_eq!(filtered[0].secrets()[0].key_id(), "old");
    }

    #[test]
    fn test_empty_thresholds_match_only_expired() {
        let views = vec![
            view("A", vec![secret("fresh", 5)], vec![]),
            view("B", vec![secret("gone", -1)], vec![certificate("soon", 1)]),
        ];
        let filtered = ThresholdFilter::filter(&views, &ThresholdSet::empty());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].app_id(), "B");
        assert_eq!(filtered[0].secrets().len(), 1);
        assert!(filtered[0].certificates().is_empty());
    }

    #[test]
    fn test_only_matching_credentials_are_kept() {
        let views = vec![view(
            "X",
            vec![secret("five", 5)],
            vec![certificate("four-hundred", 400)],
        )];
        let filtered = ThresholdFilter::filter(&views, &ThresholdSet::new([5]));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].secrets().len(), 1);
        assert_eq!(filtered[0].secrets()[0].key_id(), "five");
        assert!(filtered[0].certificates().is_empty());
        // the input view is untouched
        assert_eq!(views[0].certificates().len(), 1);
    }

    #[test]
    fn test_non_threshold_days_are_not_flagged() {
        let views = vec![view("A", vec![secret("s", 7)], vec![certificate("c", 16)])];
        assert!(ThresholdFilter::filter(&views, &ThresholdSet::default()).is_empty());
    }

    #[test]
    fn test_default_thresholds_flag_each_listed_day() {
        for days in [15, 10, 5, 4, 3, 2, 1] {
            let views = vec![view("A", vec![secret("s", days)], vec![])];
            assert_eq!(
                ThresholdFilter::filter(&views, &ThresholdSet::default()).len(),
                1,
                "{} days",
                days
            );
        }
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(ThresholdFilter::filter(&[], &ThresholdSet::default()).is_empty());
    }
}

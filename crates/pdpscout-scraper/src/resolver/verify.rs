use pdpscout_core::VerificationPolicy;

use crate::transport::{fetch_text, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Accept,
    /// Unverified, but usable if nothing better turns up.
    Fallback,
    Reject,
}

/// Apply `policy` to a validated candidate, fetching it when the policy asks
/// for the identifier to appear in the page body.
pub(crate) async fn check(
    transport: &dyn Transport,
    policy: VerificationPolicy,
    url: &str,
    identifier: &str,
) -> Verdict {
    let mentions = match policy {
        VerificationPolicy::Skip => return Verdict::Accept,
        VerificationPolicy::Prefer | VerificationPolicy::Require => fetch_text(transport, url)
            .await
            .is_some_and(|body| body.contains(identifier)),
    };

    match (mentions, policy) {
        (true, _) => Verdict::Accept,
        (false, VerificationPolicy::Prefer) => Verdict::Fallback,
        (false, _) => {
            tracing::debug!(url, identifier, "candidate page does not mention identifier");
            Verdict::Reject
        }
    }
}

/// First candidate the policy accepts; under `prefer`, the first unverified
/// one when none verifies.
pub(crate) async fn pick(
    transport: &dyn Transport,
    policy: VerificationPolicy,
    candidates: Vec<String>,
    identifier: &str,
) -> Option<String> {
    let mut fallback = None;
    for url in candidates {
        match check(transport, policy, &url, identifier).await {
            Verdict::Accept => return Some(url),
            Verdict::Fallback => {
                fallback.get_or_insert(url);
            }
            Verdict::Reject => {}
        }
    }
    fallback
}
